//! The append-only review history. Rows are only ever inserted; deriving a
//! detection's current status from them lives in [`crate::review`].

use rusqlite::params;

use super::{Store, now_ts, ts_from_sql};
use crate::error::CoreError;
use crate::model::{Review, ReviewAction};

impl Store {
    /// Append one review row. Callers are responsible for having validated
    /// the detection's existence; the action is already strongly typed.
    pub(crate) fn append_review(
        &self,
        detection_id: i64,
        action: ReviewAction,
        reviewer: &str,
        new_class: Option<&str>,
        note: Option<&str>,
    ) -> Result<Review, CoreError> {
        let created_at = now_ts();
        self.conn.execute(
            r#"
            INSERT INTO reviews (detection_id, action, reviewer, new_class, note, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![detection_id, action.name(), reviewer, new_class, note, created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Review {
            id,
            detection_id,
            action,
            reviewer: reviewer.to_string(),
            new_class: new_class.map(str::to_string),
            note: note.map(str::to_string),
            created_at: ts_from_sql(0, created_at)?,
        })
    }

    /// Full history for one detection, oldest first. Ties on created_at fall
    /// back to insertion order so "most recent" is always well defined.
    pub fn review_history(&self, detection_id: i64) -> Result<Vec<Review>, CoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, detection_id, action, reviewer, new_class, note, created_at
            FROM reviews
            WHERE detection_id = ?
            ORDER BY created_at, id
            "#,
        )?;
        let reviews = stmt
            .query_map([detection_id], |row| {
                let action_raw: String = row.get(2)?;
                // Stored actions were validated on the way in; a foreign row
                // edited out-of-band is a storage-level inconsistency.
                let action = ReviewAction::parse(&action_raw).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        format!("unknown review action `{action_raw}`").into(),
                    )
                })?;
                Ok(Review {
                    id: row.get(0)?,
                    detection_id: row.get(1)?,
                    action,
                    reviewer: row.get(3)?,
                    new_class: row.get(4)?,
                    note: row.get(5)?,
                    created_at: ts_from_sql(6, row.get(6)?)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }
}
