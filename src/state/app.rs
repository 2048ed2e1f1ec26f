use std::sync::Arc;
use parking_lot::RwLock;

use crate::error::TutorError;
use crate::pipelines::tutor::TutorService;
use crate::problems::problem::Difficulty;
use crate::state::session::Session;

pub const PROBLEM_FETCH_NOTICE: &str = "Couldn't fetch a problem. Shall we try again?";

/// Holds `loading = true` for as long as it lives.
/// Dropping it clears the flag on every exit path, including errors.
struct LoadingGuard {
    session: Arc<RwLock<Session>>,
}

impl LoadingGuard {
    /// `None` if another workflow is already in flight
    fn acquire(session: &Arc<RwLock<Session>>) -> Option<Self> {
        let mut guard = session.write();
        if guard.loading {
            return None;
        }
        guard.loading = true;
        Some(LoadingGuard {
            session: Arc::clone(session),
        })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.session.write().loading = false;
    }
}

/// Application controller.
/// Owns the session container and sequences the user workflows against a
/// `TutorService`. The session lock is never held across a model call.
#[derive(Clone)]
pub struct TutorController {
    session: Arc<RwLock<Session>>,
    service: Arc<dyn TutorService>,
}

impl TutorController {
    pub fn new(service: Arc<dyn TutorService>) -> Self {
        TutorController {
            session: Arc::new(RwLock::new(Session::new())),
            service,
        }
    }

    /// Shared handle to the session container
    pub fn session_handle(&self) -> Arc<RwLock<Session>> {
        Arc::clone(&self.session)
    }

    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    /// Snapshot for rendering; consumes the pending notice.
    pub fn render_snapshot(&self) -> Session {
        let mut session = self.session.write();
        let snapshot = session.clone();
        session.take_notice();
        snapshot
    }

    /// Fetch a new problem at `level` and move to the solving screen.
    /// On failure the screen is unchanged and a notice is queued.
    /// Returns whether a problem was installed.
    pub async fn request_new_problem(&self, level: Difficulty) -> bool {
        let Some(_loading) = LoadingGuard::acquire(&self.session) else {
            tracing::warn!(difficulty = %level, "Request ignored: another request is in flight");
            return false;
        };
        self.session.write().difficulty = level;

        match self.service.generate_problem(level).await {
            Ok(problem) => {
                self.session.write().start_problem(problem);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, difficulty = %level, "Failed to fetch problem");
                self.session.write().notice = Some(PROBLEM_FETCH_NOTICE.to_string());
                false
            }
        }
    }

    /// Request another problem at the last selected difficulty
    pub async fn restart(&self) -> bool {
        let level = self.session.read().difficulty;
        self.request_new_problem(level).await
    }

    pub fn set_answer(&self, answer: impl Into<String>) {
        self.session.write().answer = answer.into();
    }

    /// Check the current answer, then illustrate the concept.
    ///
    /// A no-op without a current problem or with a blank answer. Failures are
    /// logged and leave the session on the solving screen, as does a verdict
    /// for a problem that was replaced while the check ran.
    pub async fn submit_answer(&self) -> bool {
        let (problem, answer) = {
            let session = self.session.read();
            match (&session.problem, session.submittable_answer()) {
                (Some(problem), Some(answer)) => (problem.clone(), answer.to_string()),
                _ => {
                    tracing::debug!("Nothing to submit");
                    return false;
                }
            }
        };

        let Some(_loading) = LoadingGuard::acquire(&self.session) else {
            tracing::warn!("Submit ignored: another request is in flight");
            return false;
        };

        let outcome = async {
            let feedback = self.service.check_answer(&problem, &answer).await?;
            let visual = self.service.generate_visual_aid(&feedback.visual_prompt).await?;
            Ok::<_, TutorError>((feedback, visual))
        }
        .await;

        match outcome {
            Ok((feedback, visual)) => {
                tracing::info!(
                    problem_id = %problem.id,
                    is_correct = feedback.is_correct,
                    has_visual = visual.is_some(),
                    "Feedback ready"
                );
                self.session.write().show_feedback(&problem.id, feedback, visual)
            }
            Err(e) => {
                tracing::error!(error = %e, problem_id = %problem.id, "Feedback error");
                false
            }
        }
    }

    pub fn go_home(&self) {
        self.session.write().go_home();
    }
}
