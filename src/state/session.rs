use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::problems::feedback::Feedback;
use crate::problems::problem::{Difficulty, Problem};

/// Which screen the student is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    Home,
    Solving,
    Feedback,
}

/// All mutable state of one tutoring session.
///
/// `Solving` and `Feedback` always have a `problem`; `Feedback` also has a
/// `feedback`. Transitions go through the methods below so the pairing holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub screen: Screen,
    pub problem: Option<Problem>,
    pub feedback: Option<Feedback>,
    pub answer: String,
    /// Data URI of the illustration for the current feedback, if any
    pub visual_url: Option<String>,
    pub loading: bool,
    pub difficulty: Difficulty,
    /// One-shot message for the student, shown once then cleared
    pub notice: Option<String>,
    pub last_transition: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            screen: Screen::Home,
            problem: None,
            feedback: None,
            answer: String::new(),
            visual_url: None,
            loading: false,
            difficulty: Difficulty::default(),
            notice: None,
            last_transition: Utc::now(),
        }
    }

    fn transition(&mut self, screen: Screen) {
        tracing::debug!(from = ?self.screen, to = ?screen, "Screen transition");
        self.screen = screen;
        self.last_transition = Utc::now();
    }

    /// Install a freshly generated problem and move to `Solving`.
    pub fn start_problem(&mut self, problem: Problem) {
        self.problem = Some(problem);
        self.answer.clear();
        self.feedback = None;
        self.visual_url = None;
        self.transition(Screen::Solving);
    }

    /// Record the verdict for problem `problem_id` and move to `Feedback`.
    /// Ignored unless that problem is still the current one.
    pub fn show_feedback(
        &mut self,
        problem_id: &str,
        feedback: Feedback,
        visual_url: Option<String>,
    ) -> bool {
        match &self.problem {
            Some(current) if current.id == problem_id => {}
            Some(current) => {
                tracing::warn!(
                    problem_id,
                    current_id = %current.id,
                    "Dropping feedback: problem was replaced"
                );
                return false;
            }
            None => {
                tracing::warn!(problem_id, "Dropping feedback: no current problem");
                return false;
            }
        }
        self.feedback = Some(feedback);
        self.visual_url = visual_url.filter(|url| !url.is_empty());
        self.transition(Screen::Feedback);
        true
    }

    pub fn go_home(&mut self) {
        self.transition(Screen::Home);
    }

    /// Trimmed answer, or `None` when there is nothing to submit
    pub fn submittable_answer(&self) -> Option<&str> {
        let trimmed = self.answer.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Pending notice, cleared so it is shown once
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Screen/data pairing invariant
    pub fn is_consistent(&self) -> bool {
        match self.screen {
            Screen::Home => true,
            Screen::Solving => self.problem.is_some(),
            Screen::Feedback => self.problem.is_some() && self.feedback.is_some(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
