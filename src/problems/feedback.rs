use serde::{Deserialize, Serialize};

/// The model's verdict on one submitted answer.
/// `is_correct` is whatever the model asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub is_correct: bool,
    pub message: String,
    /// English image-generation prompt illustrating the concept
    pub visual_prompt: String,
    pub concept_tip: String,
}
