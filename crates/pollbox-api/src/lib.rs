pub mod choices;
pub mod error;
pub mod questions;
pub mod state;
pub mod votes;

use axum::Router;
use axum::routing::{get, post};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions::list_questions).post(questions::create_question))
        .route(
            "/questions/{question_id}",
            get(questions::get_question).delete(questions::delete_question),
        )
        .route("/questions/{question_id}/choices", post(choices::add_choice))
        .route("/questions/{question_id}/vote", post(votes::vote))
        .with_state(state)
}
