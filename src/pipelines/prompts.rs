use serde_json::{json, Value};

use crate::problems::problem::{Difficulty, Problem};

/// Aspect ratio requested for every illustration
pub const VISUAL_ASPECT_RATIO: &str = "1:1";

pub fn build_problem_prompt(difficulty: Difficulty) -> String {
    format!(
        r#"You are a first-year middle school math teacher. Write one linear equation problem for your student.

Difficulty: '{difficulty}'.
- easy: {easy}
- medium: {medium}
- hard: {hard}

Design the equation so that the final answer is an integer whenever possible.
List the solution as short ordered steps, and explain the key point the student should learn from this problem."#,
        difficulty = difficulty.as_str(),
        easy = Difficulty::Easy.shape_hint(),
        medium = Difficulty::Medium.shape_hint(),
        hard = Difficulty::Hard.shape_hint(),
    )
}

pub fn build_check_prompt(problem: &Problem, user_answer: &str) -> String {
    format!(
        r#"[Situation] A first-year middle school math class.
Problem: {equation}
Correct solution steps: {steps}
Correct answer: {answer}
Student's answer: {user_answer}

As the math teacher, respond with:
1. isCorrect: whether the student's answer is correct.
2. message: analyse the student's answer. If it is wrong, warmly point out where they probably got stuck (a sign slip when moving a term, an arithmetic slip, and so on). If it is right, praise them.
3. visualPrompt: an English image-generation prompt that visually explains the concept behind this problem (moving terms, adding or dividing the same amount on both sides). Describe an educational illustration using a two-pan balance, boxes of apples, a number line or similar.
4. conceptTip: one sentence stating the mathematical principle to remember."#,
        equation = problem.equation,
        steps = problem.steps.join(" -> "),
        answer = problem.final_answer_display(),
        user_answer = user_answer,
    )
}

pub fn build_visual_prompt(theme: &str) -> String {
    format!(
        "Educational 2D vector illustration for a math classroom. Theme: {}. \
         Clean, bright, simple, pastel colors, white background. Professional school book style.",
        theme
    )
}

/// Response schema for problem generation; every field is required.
pub fn problem_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "equation": { "type": "STRING", "description": "e.g. 2x + 5 = 11" },
            "steps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Each step of the solution, in order"
            },
            "finalAnswer": { "type": "NUMBER" },
            "difficulty": { "type": "STRING", "enum": ["easy", "medium", "hard"] },
            "explanation": { "type": "STRING", "description": "The key point to learn from this problem" }
        },
        "required": ["id", "equation", "steps", "finalAnswer", "difficulty", "explanation"]
    })
}

pub fn feedback_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isCorrect": { "type": "BOOLEAN" },
            "message": { "type": "STRING" },
            "visualPrompt": { "type": "STRING" },
            "conceptTip": { "type": "STRING" }
        },
        "required": ["isCorrect", "message", "visualPrompt", "conceptTip"]
    })
}
