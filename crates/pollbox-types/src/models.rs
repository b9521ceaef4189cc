use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display strings (question and choice text) are capped at 200 characters.
/// Enforced at the API boundary, not by these structs.
pub const MAX_TEXT_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// Whether this question was published within the last day, inclusive on
    /// both ends: `now - 1 day <= pub_date <= now`. Future-dated questions
    /// are not "recent".
    ///
    /// `now` is passed in rather than read from the system clock so callers
    /// and tests control the reference instant.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }

    /// The question text, verbatim.
    pub fn display_text(&self) -> &str {
        &self.question_text
    }
}

/// A selectable option belonging to exactly one question. Deleting the
/// question deletes its choices. `votes` only ever goes up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: Uuid,
    pub question_id: Uuid,
    pub choice_text: String,
    pub votes: i64,
}
