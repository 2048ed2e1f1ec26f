use async_trait::async_trait;

use crate::config::models::TutorConfig;
use crate::error::TutorError;
use crate::pipelines::gemini::GeminiClient;
use crate::pipelines::prompts::{
    build_check_prompt, build_problem_prompt, build_visual_prompt, feedback_schema,
    problem_schema, VISUAL_ASPECT_RATIO,
};
use crate::problems::feedback::Feedback;
use crate::problems::problem::{Difficulty, Problem};

/// The three model round trips the controller depends on.
///
/// Each call is a single best-effort attempt: no retries, no caching.
/// Results are shape-checked but never second-guessed; whether the
/// equation, steps or verdict are mathematically right is the model's call.
#[async_trait]
pub trait TutorService: Send + Sync {
    async fn generate_problem(&self, difficulty: Difficulty) -> Result<Problem, TutorError>;

    async fn check_answer(&self, problem: &Problem, user_answer: &str) -> Result<Feedback, TutorError>;

    /// `Ok(None)` means no illustration is available, not a failure.
    async fn generate_visual_aid(&self, prompt: &str) -> Result<Option<String>, TutorError>;
}

/// `TutorService` backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiTutor {
    client: GeminiClient,
    text_model: String,
    image_model: String,
}

impl GeminiTutor {
    pub fn new(config: &TutorConfig) -> Result<Self, TutorError> {
        Ok(GeminiTutor {
            client: GeminiClient::new(config)?,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }
}

#[async_trait]
impl TutorService for GeminiTutor {
    async fn generate_problem(&self, difficulty: Difficulty) -> Result<Problem, TutorError> {
        let prompt = build_problem_prompt(difficulty);
        let problem: Problem = self
            .client
            .generate_json(&self.text_model, "generate_problem", &prompt, problem_schema())
            .await
            .map_err(|e| {
                TutorError::from(e)
                    .with_model(self.text_model.clone())
                    .with_context("Problem generation failed")
            })?;

        tracing::info!(
            problem_id = %problem.id,
            equation = %problem.equation,
            requested = %difficulty,
            returned = %problem.difficulty,
            "Generated problem"
        );
        Ok(problem)
    }

    async fn check_answer(&self, problem: &Problem, user_answer: &str) -> Result<Feedback, TutorError> {
        let prompt = build_check_prompt(problem, user_answer);
        let feedback: Feedback = self
            .client
            .generate_json(&self.text_model, "check_answer", &prompt, feedback_schema())
            .await
            .map_err(|e| {
                TutorError::from(e)
                    .with_model(self.text_model.clone())
                    .with_context("Answer check failed")
            })?;

        tracing::info!(
            problem_id = %problem.id,
            is_correct = feedback.is_correct,
            "Checked answer"
        );
        Ok(feedback)
    }

    async fn generate_visual_aid(&self, prompt: &str) -> Result<Option<String>, TutorError> {
        let full_prompt = build_visual_prompt(prompt);
        self.client
            .generate_image(&self.image_model, &full_prompt, VISUAL_ASPECT_RATIO)
            .await
            .map_err(|e| {
                TutorError::from(e)
                    .with_model(self.image_model.clone())
                    .with_context("Visual aid generation failed")
            })
    }
}
