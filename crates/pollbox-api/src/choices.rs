use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use pollbox_types::api::{AddChoiceRequest, ChoiceResponse};

use crate::error::ApiError;
use crate::questions::validate_text;
use crate::state::AppState;

pub async fn add_choice(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<AddChoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_text("choice_text", &req.choice_text)?;

    let choice_id = Uuid::new_v4();

    let db = state.clone();
    let qid = question_id.to_string();
    let cid = choice_id.to_string();
    let choice_text = req.choice_text.clone();
    let found = tokio::task::spawn_blocking(move || {
        if db.db.get_question(&qid)?.is_none() {
            return Ok(false);
        }
        db.db.insert_choice(&cid, &qid, &choice_text)?;
        Ok::<_, anyhow::Error>(true)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    if !found {
        return Err(ApiError::NotFound);
    }

    Ok((
        StatusCode::CREATED,
        Json(ChoiceResponse {
            id: choice_id,
            question_id,
            choice_text: req.choice_text,
            votes: 0,
        }),
    ))
}
