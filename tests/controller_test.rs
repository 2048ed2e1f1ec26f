use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use eqtutor_lib::error::TutorError;
use eqtutor_lib::pipelines::tutor::TutorService;
use eqtutor_lib::problems::feedback::Feedback;
use eqtutor_lib::problems::problem::{Difficulty, Problem};
use eqtutor_lib::state::app::{TutorController, PROBLEM_FETCH_NOTICE};
use eqtutor_lib::state::session::{Screen, Session};

/// Scripted service that records every call and the loading flag seen during it.
#[derive(Default)]
struct ScriptedTutor {
    problems: Mutex<VecDeque<Result<Problem, TutorError>>>,
    feedbacks: Mutex<VecDeque<Result<Feedback, TutorError>>>,
    visuals: Mutex<VecDeque<Result<Option<String>, TutorError>>>,
    calls: Mutex<Vec<String>>,
    loading_seen: Mutex<Vec<bool>>,
    session: Mutex<Option<Arc<RwLock<Session>>>>,
    /// Installed as the current problem while `check_answer` runs
    replace_during_check: Mutex<Option<Problem>>,
}

impl ScriptedTutor {
    fn observe(&self, call: String) {
        self.calls.lock().push(call);
        if let Some(session) = self.session.lock().as_ref() {
            self.loading_seen.lock().push(session.read().loading);
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TutorService for ScriptedTutor {
    async fn generate_problem(&self, difficulty: Difficulty) -> Result<Problem, TutorError> {
        self.observe(format!("generate_problem:{}", difficulty));
        self.problems
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TutorError::new("no scripted problem", "test")))
    }

    async fn check_answer(&self, problem: &Problem, user_answer: &str) -> Result<Feedback, TutorError> {
        self.observe(format!("check_answer:{}:{}", problem.equation, user_answer));
        if let Some(replacement) = self.replace_during_check.lock().take() {
            if let Some(session) = self.session.lock().as_ref() {
                session.write().start_problem(replacement);
            }
        }
        self.feedbacks
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TutorError::new("no scripted feedback", "test")))
    }

    async fn generate_visual_aid(&self, prompt: &str) -> Result<Option<String>, TutorError> {
        self.observe(format!("generate_visual_aid:{}", prompt));
        self.visuals
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TutorError::new("no scripted visual", "test")))
    }
}

fn problem(difficulty: Difficulty) -> Problem {
    Problem {
        id: "p-3x".to_string(),
        equation: "3x - 4 = 11".to_string(),
        steps: vec!["3x = 11 + 4".to_string(), "3x = 15".to_string(), "x = 5".to_string()],
        final_answer: 5.0,
        difficulty,
        explanation: "Move -4 to the right, then divide by 3".to_string(),
    }
}

fn feedback(is_correct: bool) -> Feedback {
    Feedback {
        is_correct,
        message: if is_correct { "Well done!" } else { "Check the sign of 4." }.to_string(),
        visual_prompt: "a balance scale with three boxes".to_string(),
        concept_tip: "Do the same thing to both sides.".to_string(),
    }
}

fn setup(tutor: ScriptedTutor) -> (Arc<ScriptedTutor>, TutorController) {
    let tutor = Arc::new(tutor);
    let controller = TutorController::new(tutor.clone());
    *tutor.session.lock() = Some(controller.session_handle());
    (tutor, controller)
}

async fn solving(difficulty: Difficulty) -> (Arc<ScriptedTutor>, TutorController) {
    let tutor = ScriptedTutor::default();
    tutor.problems.lock().push_back(Ok(problem(difficulty)));
    let (tutor, controller) = setup(tutor);
    assert!(controller.request_new_problem(difficulty).await);
    (tutor, controller)
}

#[tokio::test]
async fn test_new_problem_moves_to_solving_for_every_tier() {
    for level in Difficulty::ALL {
        let tutor = ScriptedTutor::default();
        tutor.problems.lock().push_back(Ok(problem(level)));
        let (tutor, controller) = setup(tutor);

        assert!(controller.request_new_problem(level).await);

        let session = controller.snapshot();
        assert_eq!(session.screen, Screen::Solving);
        assert_eq!(session.difficulty, level);
        assert_eq!(session.problem.unwrap().difficulty, level);
        assert!(!session.loading);
        assert_eq!(tutor.calls(), vec![format!("generate_problem:{}", level)]);
    }
}

#[tokio::test]
async fn test_new_problem_failure_leaves_screen_and_sets_notice() {
    for level in Difficulty::ALL {
        let tutor = ScriptedTutor::default();
        tutor
            .problems
            .lock()
            .push_back(Err(TutorError::new("boom", "transport")));
        let (_tutor, controller) = setup(tutor);

        assert!(!controller.request_new_problem(level).await);

        let session = controller.snapshot();
        assert_eq!(session.screen, Screen::Home);
        assert!(session.problem.is_none());
        assert!(!session.loading);
        assert_eq!(session.notice.as_deref(), Some(PROBLEM_FETCH_NOTICE));
    }
}

#[tokio::test]
async fn test_failed_refetch_keeps_current_problem() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    tutor
        .problems
        .lock()
        .push_back(Err(TutorError::new("boom", "transport")));

    assert!(!controller.request_new_problem(Difficulty::Hard).await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert_eq!(session.problem.unwrap().difficulty, Difficulty::Easy);
}

#[tokio::test]
async fn test_submit_without_problem_is_noop() {
    let (tutor, controller) = setup(ScriptedTutor::default());
    controller.set_answer("5");

    assert!(!controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Home);
    assert!(session.feedback.is_none());
    assert!(!session.loading);
    assert!(tutor.calls().is_empty());
}

#[tokio::test]
async fn test_submit_blank_answer_is_noop() {
    let (tutor, controller) = solving(Difficulty::Easy).await;

    for blank in ["", "   ", "\t\n"] {
        controller.set_answer(blank);
        assert!(!controller.submit_answer().await);
    }

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert!(session.feedback.is_none());
    assert!(!session.loading);
    assert_eq!(tutor.calls().len(), 1);
}

#[tokio::test]
async fn test_correct_answer_scenario() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    tutor.feedbacks.lock().push_back(Ok(feedback(true)));
    tutor
        .visuals
        .lock()
        .push_back(Ok(Some("data:image/png;base64,AAAA".to_string())));

    controller.set_answer("5");
    assert!(controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Feedback);
    assert!(session.feedback.as_ref().unwrap().is_correct);
    assert_eq!(session.visual_url.as_deref(), Some("data:image/png;base64,AAAA"));
    assert!(session.is_consistent());
    assert_eq!(
        tutor.calls()[1..],
        [
            "check_answer:3x - 4 = 11:5".to_string(),
            "generate_visual_aid:a balance scale with three boxes".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_wrong_answer_scenario_then_restart_reuses_tier() {
    let (tutor, controller) = solving(Difficulty::Medium).await;
    tutor.feedbacks.lock().push_back(Ok(feedback(false)));
    tutor.visuals.lock().push_back(Ok(None));

    controller.set_answer("2");
    assert!(controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Feedback);
    assert!(!session.feedback.as_ref().unwrap().is_correct);
    assert!(session.visual_url.is_none());
    assert_eq!(session.problem.unwrap(), problem(Difficulty::Medium));

    tutor.problems.lock().push_back(Ok(problem(Difficulty::Medium)));
    assert!(controller.restart().await);
    assert_eq!(tutor.calls().last().unwrap(), "generate_problem:medium");

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert!(session.feedback.is_none());
    assert!(session.answer.is_empty());
}

#[tokio::test]
async fn test_check_failure_stays_solving() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    tutor
        .feedbacks
        .lock()
        .push_back(Err(TutorError::new("bad json", "json_parse")));

    controller.set_answer("5");
    assert!(!controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert!(session.feedback.is_none());
    assert!(!session.loading);
    // Visual aid is never requested after a failed check
    assert!(!tutor.calls().iter().any(|c| c.starts_with("generate_visual_aid")));
}

#[tokio::test]
async fn test_visual_failure_stays_solving() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    tutor.feedbacks.lock().push_back(Ok(feedback(true)));
    tutor
        .visuals
        .lock()
        .push_back(Err(TutorError::new("HTTP 500", "http_status")));

    controller.set_answer("5");
    assert!(!controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert!(session.feedback.is_none());
    assert!(!session.loading);
    assert!(session.is_consistent());
}

#[tokio::test]
async fn test_loading_true_only_during_calls() {
    let (tutor, controller) = solving(Difficulty::Hard).await;
    assert!(!controller.snapshot().loading);

    tutor.feedbacks.lock().push_back(Ok(feedback(true)));
    tutor.visuals.lock().push_back(Ok(None));
    controller.set_answer("5");
    controller.submit_answer().await;
    assert!(!controller.snapshot().loading);

    tutor
        .problems
        .lock()
        .push_back(Err(TutorError::new("down", "transport")));
    controller.restart().await;
    assert!(!controller.snapshot().loading);

    let seen = tutor.loading_seen.lock().clone();
    assert_eq!(seen.len(), tutor.calls().len());
    assert!(seen.iter().all(|loading| *loading));
}

#[tokio::test]
async fn test_go_home_keeps_difficulty() {
    let (_tutor, controller) = solving(Difficulty::Hard).await;

    controller.go_home();

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Home);
    assert_eq!(session.difficulty, Difficulty::Hard);
}

#[tokio::test]
async fn test_request_rejected_while_loading() {
    let (tutor, controller) = setup(ScriptedTutor::default());
    controller.session_handle().write().loading = true;

    assert!(!controller.request_new_problem(Difficulty::Easy).await);

    assert!(tutor.calls().is_empty());
    // The in-flight workflow still owns the flag
    assert!(controller.snapshot().loading);
}

#[tokio::test]
async fn test_submit_rejected_while_loading() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    tutor.feedbacks.lock().push_back(Ok(feedback(true)));
    tutor.visuals.lock().push_back(Ok(None));
    controller.set_answer("5");
    controller.session_handle().write().loading = true;

    assert!(!controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(tutor.calls(), vec!["generate_problem:easy".to_string()]);
    assert!(session.loading);
    assert!(session.feedback.is_none());
    assert_eq!(session.screen, Screen::Solving);
}

#[tokio::test]
async fn test_verdict_for_replaced_problem_is_dropped() {
    let (tutor, controller) = solving(Difficulty::Easy).await;
    let mut newer = problem(Difficulty::Hard);
    newer.id = "p-newer".to_string();
    *tutor.replace_during_check.lock() = Some(newer);
    tutor.feedbacks.lock().push_back(Ok(feedback(true)));
    tutor.visuals.lock().push_back(Ok(None));

    controller.set_answer("5");
    assert!(!controller.submit_answer().await);

    let session = controller.snapshot();
    assert_eq!(session.screen, Screen::Solving);
    assert!(session.feedback.is_none());
    assert!(!session.loading);
    assert_eq!(session.problem.as_ref().unwrap().id, "p-newer");
    assert!(session.is_consistent());
}

#[tokio::test]
async fn test_render_snapshot_consumes_notice() {
    let (tutor, controller) = setup(ScriptedTutor::default());
    tutor
        .problems
        .lock()
        .push_back(Err(TutorError::new("down", "transport")));
    controller.request_new_problem(Difficulty::Easy).await;

    assert!(controller.render_snapshot().notice.is_some());
    assert!(controller.render_snapshot().notice.is_none());
}
