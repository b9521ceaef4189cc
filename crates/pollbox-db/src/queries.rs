use crate::Database;
use crate::models::{ChoiceRow, QuestionRow};
use crate::time::encode_ts;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

impl Database {
    // -- Questions --

    pub fn insert_question(&self, id: &str, question_text: &str, pub_date: DateTime<Utc>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO questions (id, question_text, pub_date) VALUES (?1, ?2, ?3)",
                (id, question_text, encode_ts(pub_date)),
            )?;
            Ok(())
        })
    }

    pub fn get_question(&self, id: &str) -> Result<Option<QuestionRow>> {
        self.with_conn(|conn| query_question_by_id(conn, id))
    }

    /// Questions with `pub_date <= now`, most recent first.
    pub fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<QuestionRow>> {
        self.with_conn(|conn| query_published_questions(conn, now))
    }

    /// Removes the question and, via `ON DELETE CASCADE`, all of its choices.
    /// Returns false if no such question existed.
    pub fn delete_question(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM questions WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Choices --

    pub fn insert_choice(&self, id: &str, question_id: &str, choice_text: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO choices (id, question_id, choice_text) VALUES (?1, ?2, ?3)",
                (id, question_id, choice_text),
            )?;
            Ok(())
        })
    }

    pub fn get_choice(&self, id: &str) -> Result<Option<ChoiceRow>> {
        self.with_conn(|conn| query_choice_by_id(conn, id))
    }

    pub fn choices_for_question(&self, question_id: &str) -> Result<Vec<ChoiceRow>> {
        self.with_conn(|conn| query_choices_for_question(conn, question_id))
    }

    /// Single-statement increment so concurrent voters cannot lose updates.
    /// Returns false if the choice does not exist.
    pub fn record_vote(&self, choice_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE choices SET votes = votes + 1 WHERE id = ?1",
                [choice_id],
            )?;
            Ok(updated > 0)
        })
    }
}

fn query_question_by_id(conn: &Connection, id: &str) -> Result<Option<QuestionRow>> {
    let mut stmt =
        conn.prepare("SELECT id, question_text, pub_date FROM questions WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(QuestionRow {
                id: row.get(0)?,
                question_text: row.get(1)?,
                pub_date: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_published_questions(conn: &Connection, now: DateTime<Utc>) -> Result<Vec<QuestionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, question_text, pub_date
         FROM questions
         WHERE pub_date <= ?1
         ORDER BY pub_date DESC",
    )?;

    let rows = stmt
        .query_map([encode_ts(now)], |row| {
            Ok(QuestionRow {
                id: row.get(0)?,
                question_text: row.get(1)?,
                pub_date: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_choice_by_id(conn: &Connection, id: &str) -> Result<Option<ChoiceRow>> {
    let mut stmt =
        conn.prepare("SELECT id, question_id, choice_text, votes FROM choices WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(ChoiceRow {
                id: row.get(0)?,
                question_id: row.get(1)?,
                choice_text: row.get(2)?,
                votes: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_choices_for_question(conn: &Connection, question_id: &str) -> Result<Vec<ChoiceRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, question_id, choice_text, votes
         FROM choices
         WHERE question_id = ?1
         ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([question_id], |row| {
            Ok(ChoiceRow {
                id: row.get(0)?,
                question_id: row.get(1)?,
                choice_text: row.get(2)?,
                votes: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
