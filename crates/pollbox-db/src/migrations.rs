use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS questions (
            id              TEXT PRIMARY KEY,
            question_text   TEXT NOT NULL,
            pub_date        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_questions_pub_date
            ON questions(pub_date);

        CREATE TABLE IF NOT EXISTS choices (
            id              TEXT PRIMARY KEY,
            question_id     TEXT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            choice_text     TEXT NOT NULL,
            votes           INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_choices_question
            ON choices(question_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
