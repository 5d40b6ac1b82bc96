//! Duty generation: expand timeslot templates into dated duty rows.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::db::{DbPool, Timeslot};

use super::error::RosterError;

/// Counters for one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    /// Duties created by this run.
    pub created: u64,
    /// (timeslot, date) pairs that already had a duty and were left alone.
    pub existing: u64,
}

/// Expands templates into duties over a date range, idempotently.
pub struct DutyGenerator {
    db: DbPool,
}

impl DutyGenerator {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Ensure exactly one duty exists per (timeslot, date) for every date
    /// in `[start, end]` whose weekday matches the template's.
    ///
    /// New duties copy the template's default user as initial owner with
    /// `free = false` and no pending transfer. Existing rows are never
    /// touched, so re-running over an overlapping range cannot duplicate
    /// or overwrite anything. The whole run commits in one transaction.
    pub async fn generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<GenerationStats, RosterError> {
        if end < start {
            return Err(RosterError::Validation(
                "End date cannot be before start date".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        // One template fetch up front; generation walks days repeatedly.
        let templates: Vec<Timeslot> = sqlx::query_as("SELECT * FROM timeslots")
            .fetch_all(&mut *tx)
            .await?;
        let mut by_day: HashMap<&str, Vec<&Timeslot>> = HashMap::new();
        for slot in &templates {
            by_day.entry(slot.day.as_str()).or_default().push(slot);
        }

        let mut stats = GenerationStats::default();
        let mut date = start;
        while date <= end {
            let day = date.format("%A").to_string();
            for slot in by_day.get(day.as_str()).map(Vec::as_slice).unwrap_or(&[]) {
                let existing: Option<(String,)> =
                    sqlx::query_as("SELECT id FROM duties WHERE timeslot_id = ? AND date = ?")
                        .bind(&slot.id)
                        .bind(date)
                        .fetch_optional(&mut *tx)
                        .await?;
                if existing.is_some() {
                    stats.existing += 1;
                    continue;
                }

                sqlx::query(
                    "INSERT INTO duties (id, timeslot_id, date, user_id, free) \
                     VALUES (?, ?, ?, ?, 0)",
                )
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(&slot.id)
                .bind(date)
                .bind(&slot.default_user_id)
                .execute(&mut *tx)
                .await?;
                stats.created += 1;
            }
            date += Duration::days(1);
        }

        tx.commit().await?;

        tracing::debug!(
            created = stats.created,
            existing = stats.existing,
            %start,
            %end,
            "Duty generation run finished"
        );

        Ok(stats)
    }
}
