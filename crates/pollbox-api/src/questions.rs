use anyhow::{Context, Result, anyhow};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use pollbox_db::models::{ChoiceRow, QuestionRow};
use pollbox_db::time::decode_ts;
use pollbox_types::api::{
    ChoiceResponse, CreateQuestionRequest, QuestionDetailResponse, QuestionListResponse,
    QuestionResponse,
};
use pollbox_types::{Choice, MAX_TEXT_LEN, Question};

use crate::error::ApiError;
use crate::state::AppState;

/// Literal shown by clients when the index has nothing to display.
pub const NO_POLLS_MESSAGE: &str = "No polls are available.";

pub async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<QuestionListResponse>, ApiError> {
    let now = state.clock.now();

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_published(now))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let questions = rows
        .into_iter()
        .map(|row| question_from_row(row).map(|q| question_response(&q, now)))
        .collect::<Result<Vec<_>>>()?;

    let message = questions.is_empty().then(|| NO_POLLS_MESSAGE.to_string());

    Ok(Json(QuestionListResponse { questions, message }))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    let now = state.clock.now();

    let db = state.clone();
    let qid = question_id.to_string();
    let (row, choice_rows) = tokio::task::spawn_blocking(move || {
        let row = db.db.get_question(&qid)?;
        let choices = db.db.choices_for_question(&qid)?;
        Ok::<_, anyhow::Error>((row, choices))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let question = question_from_row(row.ok_or(ApiError::NotFound)?)?;

    // An unpublished question is indistinguishable from a missing one
    if question.pub_date > now {
        return Err(ApiError::NotFound);
    }

    let choices = choice_rows
        .into_iter()
        .map(|row| choice_from_row(row).map(choice_response))
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(detail_response(&question, now, choices)))
}

pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_text("question_text", &req.question_text)?;
    for text in &req.choices {
        validate_text("choice_text", text)?;
    }

    let now = state.clock.now();
    let pub_date = req.pub_date.unwrap_or(now);
    let question_id = Uuid::new_v4();
    let choice_ids: Vec<Uuid> = req.choices.iter().map(|_| Uuid::new_v4()).collect();

    let db = state.clone();
    let qid = question_id.to_string();
    let question_text = req.question_text.clone();
    let choice_inserts: Vec<(String, String)> = choice_ids
        .iter()
        .zip(&req.choices)
        .map(|(id, text)| (id.to_string(), text.clone()))
        .collect();

    tokio::task::spawn_blocking(move || {
        db.db.insert_question(&qid, &question_text, pub_date)?;
        for (cid, text) in &choice_inserts {
            db.db.insert_choice(cid, &qid, text)?;
        }
        Ok::<_, anyhow::Error>(())
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let question = Question {
        id: question_id,
        question_text: req.question_text,
        pub_date,
    };
    let choices = choice_ids
        .into_iter()
        .zip(req.choices)
        .map(|(id, choice_text)| ChoiceResponse {
            id,
            question_id,
            choice_text,
            votes: 0,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(detail_response(&question, now, choices))))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let db = state.clone();
    let qid = question_id.to_string();
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_question(&qid))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn validate_text(field: &str, text: &str) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    let len = text.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

pub(crate) fn question_from_row(row: QuestionRow) -> Result<Question> {
    Ok(Question {
        id: row.id.parse().with_context(|| format!("bad question id '{}'", row.id))?,
        question_text: row.question_text,
        pub_date: decode_ts(&row.pub_date)?,
    })
}

pub(crate) fn choice_from_row(row: ChoiceRow) -> Result<Choice> {
    Ok(Choice {
        id: row.id.parse().with_context(|| format!("bad choice id '{}'", row.id))?,
        question_id: row
            .question_id
            .parse()
            .with_context(|| format!("bad question id '{}' on choice '{}'", row.question_id, row.id))?,
        choice_text: row.choice_text,
        votes: row.votes,
    })
}

pub(crate) fn question_response(question: &Question, now: chrono::DateTime<chrono::Utc>) -> QuestionResponse {
    QuestionResponse {
        id: question.id,
        question_text: question.display_text().to_string(),
        pub_date: question.pub_date,
        was_published_recently: question.was_published_recently(now),
    }
}

pub(crate) fn choice_response(choice: Choice) -> ChoiceResponse {
    ChoiceResponse {
        id: choice.id,
        question_id: choice.question_id,
        choice_text: choice.choice_text,
        votes: choice.votes,
    }
}

fn detail_response(
    question: &Question,
    now: chrono::DateTime<chrono::Utc>,
    choices: Vec<ChoiceResponse>,
) -> QuestionDetailResponse {
    QuestionDetailResponse {
        id: question.id,
        question_text: question.display_text().to_string(),
        pub_date: question.pub_date,
        was_published_recently: question.was_published_recently(now),
        choices,
    }
}
