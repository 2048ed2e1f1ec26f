use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::problems::problem::{Difficulty, UnknownDifficulty};
use crate::state::app::TutorController;
use crate::state::session::Session;
use crate::views::screens::render_page;

#[derive(Debug, Deserialize)]
pub struct LevelForm {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug)]
enum RouteError {
    BadLevel(UnknownDifficulty),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::BadLevel(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }
}

/// Build the browser-facing router.
///
/// Every action is a form post that runs one controller operation and then
/// redirects back to `/`, which renders whichever screen is now current.
pub fn create_router(controller: TutorController) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/problem", post(new_problem))
        .route("/answer", post(submit_answer))
        .route("/restart", post(restart))
        .route("/home", post(go_home))
        .route("/api/session", get(session_status))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

async fn index(State(controller): State<TutorController>) -> Html<String> {
    Html(render_page(&controller.render_snapshot()))
}

async fn new_problem(
    State(controller): State<TutorController>,
    Form(form): Form<LevelForm>,
) -> Result<Redirect, RouteError> {
    let level = form.level.parse::<Difficulty>().map_err(|e| {
        tracing::warn!(level = %form.level, "Rejected unknown difficulty");
        RouteError::BadLevel(e)
    })?;
    controller.request_new_problem(level).await;
    Ok(Redirect::to("/"))
}

async fn submit_answer(
    State(controller): State<TutorController>,
    Form(form): Form<AnswerForm>,
) -> Redirect {
    controller.set_answer(form.answer);
    controller.submit_answer().await;
    Redirect::to("/")
}

async fn restart(State(controller): State<TutorController>) -> Redirect {
    controller.restart().await;
    Redirect::to("/")
}

async fn go_home(State(controller): State<TutorController>) -> Redirect {
    controller.go_home();
    Redirect::to("/")
}

async fn session_status(State(controller): State<TutorController>) -> Json<Session> {
    Json(controller.snapshot())
}
