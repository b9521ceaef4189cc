use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Questions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    /// Defaults to the server's current time when omitted.
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub was_published_recently: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionResponse>,
    /// Set to "No polls are available." when `questions` is empty.
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionDetailResponse {
    pub id: Uuid,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub was_published_recently: bool,
    pub choices: Vec<ChoiceResponse>,
}

// -- Choices --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddChoiceRequest {
    pub choice_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceResponse {
    pub id: Uuid,
    pub question_id: Uuid,
    pub choice_text: String,
    pub votes: i64,
}

// -- Voting --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    pub choice_id: Uuid,
}
