use std::fmt;

use crate::pipelines::gemini::GeminiError;

/// Unified error type for the tutor.
/// Every adapter and controller operation reports failures as a `TutorError`.
#[derive(Debug, Clone)]
pub struct TutorError {
    pub message: String,
    pub stage: String,
    pub model: Option<String>,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl TutorError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        TutorError {
            message: message.into(),
            stage: stage.to_string(),
            model: None,
            context: None,
            source: None,
        }
    }

    /// Add model context to the error
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for TutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref model) = self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for TutorError {}

impl From<GeminiError> for TutorError {
    fn from(err: GeminiError) -> Self {
        let stage = match &err {
            GeminiError::Transport(_) => "transport",
            GeminiError::Status { .. } => "http_status",
            GeminiError::Empty => "empty_response",
            GeminiError::Malformed(_) => "json_parse",
        };
        TutorError::new(err.to_string(), stage).with_source("gemini")
    }
}
