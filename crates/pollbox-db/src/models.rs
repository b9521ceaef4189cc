/// Database row types — these map directly to SQLite rows.
/// Distinct from pollbox-types API models to keep the DB layer independent.
/// Timestamps are the RFC 3339 strings produced by [`crate::time::encode_ts`].

pub struct QuestionRow {
    pub id: String,
    pub question_text: String,
    pub pub_date: String,
}

pub struct ChoiceRow {
    pub id: String,
    pub question_id: String,
    pub choice_text: String,
    pub votes: i64,
}
