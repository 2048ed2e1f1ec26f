pub mod gemini;
pub mod json_utils;
pub mod prompts;
pub mod tutor;
