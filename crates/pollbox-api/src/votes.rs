use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use pollbox_db::time::decode_ts;
use pollbox_types::api::{ChoiceResponse, VoteRequest};

use crate::error::ApiError;
use crate::questions::{choice_from_row, choice_response};
use crate::state::AppState;

/// Records one vote for a choice of a published question. The tally bump is
/// a single UPDATE in the store, so concurrent voters all count.
pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<ChoiceResponse>, ApiError> {
    let now = state.clock.now();

    let db = state.clone();
    let qid = question_id.to_string();
    let cid = req.choice_id.to_string();
    let updated = tokio::task::spawn_blocking(move || {
        let question = match db.db.get_question(&qid)? {
            Some(q) => q,
            None => return Ok(None),
        };
        // Voting on an unpublished question 404s, same as its detail view
        if decode_ts(&question.pub_date)? > now {
            return Ok(None);
        }

        let choice = match db.db.get_choice(&cid)? {
            Some(c) if c.question_id == qid => c,
            _ => return Ok(None),
        };

        db.db.record_vote(&choice.id)?;
        db.db.get_choice(&choice.id)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let row = updated.ok_or(ApiError::NotFound)?;
    let choice = choice_from_row(row)?;

    Ok(Json(choice_response(choice)))
}
