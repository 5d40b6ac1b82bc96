//! The duty lifecycle manager: grab, drop, and the grabable projection.
//!
//! Duties move between owned, free, and pending-transfer. Every mutation
//! here runs as an all-or-nothing batch inside a single transaction, and
//! each row write re-checks the state it read (compare-and-set) so racing
//! requests cannot both win the same duty.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;

use crate::db::{DbPool, Duty, DutyDetail, User, DUTY_DETAIL_COLUMNS};

use super::access::{self, Action};
use super::error::RosterError;

/// Who a dropped duty is offered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Anyone may grab it: the duty becomes free and the owner is cleared.
    Anyone,
    /// A transfer is proposed to this user; the owner is retained until
    /// the target grabs it.
    User(String),
}

/// Result of a successful drop, handed to the notification dispatcher.
#[derive(Debug)]
pub struct DropOutcome {
    /// The affected duties, ordered by date and start time.
    pub duties: Vec<DutyDetail>,
    /// User ids to inform: everyone for a drop to anyone, otherwise just
    /// the transfer target.
    pub recipients: Vec<String>,
}

const GRAB_ERROR: &str = "Invalid duties to grab";
const DROP_ERROR: &str = "Invalid duties to drop";

/// Guard clause shared by the grab validation pass and the guarded UPDATE.
const GRABABLE_SQL: &str = "(free = 1 \
     OR (user_id IS NULL AND request_user_id IS NULL) \
     OR request_user_id = ?2 \
     OR (request_user_id IS NOT NULL AND user_id = ?2))";

/// Take ownership of every duty in the batch.
///
/// Allowed per duty when it is free (or never had an owner), when a
/// pending transfer names the actor, or when the actor is the owner
/// reclaiming a duty they are currently offloading. Restricted templates
/// additionally require the actor's mc flag. The batch is atomic: one
/// ineligible duty rejects the whole set with no mutation.
pub async fn grab_duties(
    pool: &DbPool,
    actor: &User,
    duty_ids: &BTreeSet<String>,
) -> Result<Vec<Duty>, RosterError> {
    if duty_ids.is_empty() {
        return Err(RosterError::Validation(GRAB_ERROR.to_string()));
    }

    let mut tx = pool.begin().await?;

    for id in duty_ids {
        let duty: Duty = sqlx::query_as("SELECT * FROM duties WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RosterError::NotFound("Duty".to_string()))?;

        if !duty.grabable_by(&actor.id) {
            return Err(RosterError::Authorization(GRAB_ERROR.to_string()));
        }

        let (mc_only,): (bool,) = sqlx::query_as("SELECT mc_only FROM timeslots WHERE id = ?")
            .bind(&duty.timeslot_id)
            .fetch_one(&mut *tx)
            .await?;
        if !access::can(actor, Action::GrabDuty { mc_only }) {
            return Err(RosterError::Authorization(GRAB_ERROR.to_string()));
        }
    }

    // Writes re-assert the state the validation pass saw; a concurrent
    // winner makes the guarded update match zero rows and the batch rolls
    // back.
    for id in duty_ids {
        let result = sqlx::query(&format!(
            "UPDATE duties SET user_id = ?2, free = 0, request_user_id = NULL, \
             updated_at = datetime('now') WHERE id = ?1 AND {GRABABLE_SQL}"
        ))
        .bind(id)
        .bind(&actor.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() != 1 {
            return Err(RosterError::Authorization(GRAB_ERROR.to_string()));
        }
    }

    let mut grabbed = Vec::with_capacity(duty_ids.len());
    for id in duty_ids {
        let duty: Duty = sqlx::query_as("SELECT * FROM duties WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        grabbed.push(duty);
    }

    tx.commit().await?;

    tracing::info!(user = %actor.username, count = grabbed.len(), "Duties grabbed");
    Ok(grabbed)
}

/// Give up ownership of every duty in the batch.
///
/// The actor must be the committed owner of each duty, and no duty may
/// start within `lead_hours` of `now`. Dropping to [`DropTarget::Anyone`]
/// frees the duty and clears the owner; dropping to a specific user
/// records a pending transfer and keeps the owner until the target grabs.
pub async fn drop_duties(
    pool: &DbPool,
    actor: &User,
    duty_ids: &BTreeSet<String>,
    target: DropTarget,
    now: NaiveDateTime,
    lead_hours: i64,
) -> Result<DropOutcome, RosterError> {
    if duty_ids.is_empty() {
        return Err(RosterError::Validation(DROP_ERROR.to_string()));
    }

    if let DropTarget::User(target_id) = &target {
        if *target_id == actor.id {
            return Err(RosterError::Validation(DROP_ERROR.to_string()));
        }
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(target_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(RosterError::NotFound("User".to_string()));
        }
    }

    let mut tx = pool.begin().await?;

    for id in duty_ids {
        let detail = fetch_detail(&mut tx, id)
            .await?
            .ok_or_else(|| RosterError::NotFound("Duty".to_string()))?;

        if detail.free || detail.user_id.as_deref() != Some(actor.id.as_str()) {
            return Err(RosterError::Authorization(DROP_ERROR.to_string()));
        }

        // Wall-clock guard against last-minute abandonment; `now` is a
        // parameter so the check is deterministic under test.
        if detail.starts_at() - now < Duration::hours(lead_hours) {
            return Err(RosterError::TooLate { lead_hours });
        }
    }

    for id in duty_ids {
        let result = match &target {
            DropTarget::Anyone => {
                sqlx::query(
                    "UPDATE duties SET free = 1, user_id = NULL, request_user_id = NULL, \
                     updated_at = datetime('now') \
                     WHERE id = ? AND user_id = ? AND free = 0",
                )
                .bind(id)
                .bind(&actor.id)
                .execute(&mut *tx)
                .await?
            }
            DropTarget::User(target_id) => {
                sqlx::query(
                    "UPDATE duties SET request_user_id = ?, updated_at = datetime('now') \
                     WHERE id = ? AND user_id = ? AND free = 0",
                )
                .bind(target_id)
                .bind(id)
                .bind(&actor.id)
                .execute(&mut *tx)
                .await?
            }
        };
        if result.rows_affected() != 1 {
            return Err(RosterError::Authorization(DROP_ERROR.to_string()));
        }
    }

    let duties = fetch_details_ordered(&mut tx, duty_ids).await?;

    tx.commit().await?;

    let recipients = match target {
        DropTarget::Anyone => sqlx::query_as::<_, (String,)>("SELECT id FROM users")
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|(id,)| id)
            .collect(),
        DropTarget::User(target_id) => vec![target_id],
    };

    tracing::info!(user = %actor.username, count = duties.len(), "Duties dropped");
    Ok(DropOutcome { duties, recipients })
}

/// Read-only projection of the duties the actor could grab right now:
/// free duties, transfers addressed to them, and duties they are trying
/// to offload and can reclaim. Duties that have already started are
/// excluded.
pub async fn grabable_duties(
    pool: &DbPool,
    actor: &User,
    now: NaiveDateTime,
) -> Result<Vec<DutyDetail>, RosterError> {
    let rows: Vec<DutyDetail> = sqlx::query_as(&format!(
        "SELECT {DUTY_DETAIL_COLUMNS} FROM duties d \
         JOIN timeslots t ON t.id = d.timeslot_id \
         JOIN time_ranges tr ON tr.id = t.time_range_id \
         JOIN places p ON p.id = t.place_id \
         LEFT JOIN users u ON u.id = d.user_id \
         WHERE (d.free = 1 \
            OR (d.user_id IS NULL AND d.request_user_id IS NULL) \
            OR d.request_user_id = ?1 \
            OR (d.request_user_id IS NOT NULL AND d.user_id = ?1)) \
         ORDER BY d.date, tr.start_time"
    ))
    .bind(&actor.id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter(|d| d.starts_at() > now).collect())
}

async fn fetch_detail(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: &str,
) -> Result<Option<DutyDetail>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {DUTY_DETAIL_COLUMNS} FROM duties d \
         JOIN timeslots t ON t.id = d.timeslot_id \
         JOIN time_ranges tr ON tr.id = t.time_range_id \
         JOIN places p ON p.id = t.place_id \
         LEFT JOIN users u ON u.id = d.user_id \
         WHERE d.id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

async fn fetch_details_ordered(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    ids: &BTreeSet<String>,
) -> Result<Vec<DutyDetail>, sqlx::Error> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {DUTY_DETAIL_COLUMNS} FROM duties d \
         JOIN timeslots t ON t.id = d.timeslot_id \
         JOIN time_ranges tr ON tr.id = t.time_range_id \
         JOIN places p ON p.id = t.place_id \
         LEFT JOIN users u ON u.id = d.user_id \
         WHERE d.id IN ({placeholders}) \
         ORDER BY d.date, tr.start_time"
    );
    let mut query = sqlx::query_as(&sql);
    for id in ids {
        query = query.bind(id);
    }
    query.fetch_all(&mut **tx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// A `now` far before any fixture duty starts.
    fn early() -> NaiveDateTime {
        date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_grab_free_duty() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;

        let grabbed = grab_duties(&pool, &actor, &ids(&[&duty])).await.unwrap();
        assert_eq!(grabbed.len(), 1);
        assert_eq!(grabbed[0].user_id.as_deref(), Some(actor.id.as_str()));
        assert!(!grabbed[0].free);
        assert!(grabbed[0].request_user_id.is_none());
    }

    #[tokio::test]
    async fn test_grab_pending_transfer_addressed_to_actor() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(
            &pool,
            &slot,
            date(2024, 1, 2),
            Some(&owner.id),
            false,
            Some(&actor.id),
        )
        .await;

        let grabbed = grab_duties(&pool, &actor, &ids(&[&duty])).await.unwrap();
        assert_eq!(grabbed[0].user_id.as_deref(), Some(actor.id.as_str()));
        assert!(grabbed[0].request_user_id.is_none());
    }

    #[tokio::test]
    async fn test_owner_reclaims_pending_transfer() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let target = insert_user(&pool, "target", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(
            &pool,
            &slot,
            date(2024, 1, 2),
            Some(&owner.id),
            false,
            Some(&target.id),
        )
        .await;

        let grabbed = grab_duties(&pool, &owner, &ids(&[&duty])).await.unwrap();
        assert_eq!(grabbed[0].user_id.as_deref(), Some(owner.id.as_str()));
        assert!(grabbed[0].request_user_id.is_none());
    }

    #[tokio::test]
    async fn test_grab_owned_duty_rejected() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&owner.id), false, None).await;

        let err = grab_duties(&pool, &actor, &ids(&[&duty])).await.unwrap_err();
        assert!(matches!(err, RosterError::Authorization(_)));
        assert_eq!(err.to_string(), "Invalid duties to grab");
    }

    #[tokio::test]
    async fn test_grab_batch_atomicity() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let free = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;
        let owned =
            insert_duty(&pool, &slot, date(2024, 1, 9), Some(&owner.id), false, None).await;

        let err = grab_duties(&pool, &actor, &ids(&[&free, &owned]))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Authorization(_)));

        // The eligible duty must be untouched too
        let untouched = fetch_duty(&pool, &free).await;
        assert!(untouched.free);
        assert!(untouched.user_id.is_none());
    }

    #[tokio::test]
    async fn test_grab_mc_only_gate() {
        let pool = memory_pool().await;
        let plain = insert_user(&pool, "plain", false).await;
        let privileged = insert_user(&pool, "privileged", true).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, true).await;
        let duty = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;

        let err = grab_duties(&pool, &plain, &ids(&[&duty])).await.unwrap_err();
        assert!(matches!(err, RosterError::Authorization(_)));
        assert!(fetch_duty(&pool, &duty).await.free);

        let grabbed = grab_duties(&pool, &privileged, &ids(&[&duty]))
            .await
            .unwrap();
        assert_eq!(grabbed[0].user_id.as_deref(), Some(privileged.id.as_str()));
    }

    #[tokio::test]
    async fn test_grab_empty_batch() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let err = grab_duties(&pool, &actor, &BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_grab_unknown_duty() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let err = grab_duties(&pool, &actor, &ids(&["no-such-duty"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_racing_grabs_have_one_winner() {
        let pool = memory_pool().await;
        let alice = insert_user(&pool, "alice", false).await;
        let bob = insert_user(&pool, "bob", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;

        let batch = ids(&[&duty]);
        let (a, b) = tokio::join!(
            grab_duties(&pool, &alice, &batch),
            grab_duties(&pool, &bob, &batch)
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

        let after = fetch_duty(&pool, &duty).await;
        assert!(!after.free);
        let winner = after.user_id.unwrap();
        assert!(winner == alice.id || winner == bob.id);
    }

    #[tokio::test]
    async fn test_drop_to_anyone() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let other = insert_user(&pool, "other", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&owner.id), false, None).await;

        let outcome = drop_duties(&pool, &owner, &ids(&[&duty]), DropTarget::Anyone, early(), 2)
            .await
            .unwrap();

        let after = fetch_duty(&pool, &duty).await;
        assert!(after.free);
        assert!(after.user_id.is_none());
        assert!(after.request_user_id.is_none());

        // Everyone is notified on a drop to anyone
        let mut recipients = outcome.recipients.clone();
        recipients.sort();
        let mut everyone = vec![owner.id.clone(), other.id.clone()];
        everyone.sort();
        assert_eq!(recipients, everyone);
    }

    #[tokio::test]
    async fn test_drop_to_target_keeps_owner() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let target = insert_user(&pool, "target", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&owner.id), false, None).await;

        let outcome = drop_duties(
            &pool,
            &owner,
            &ids(&[&duty]),
            DropTarget::User(target.id.clone()),
            early(),
            2,
        )
        .await
        .unwrap();

        let after = fetch_duty(&pool, &duty).await;
        assert_eq!(after.user_id.as_deref(), Some(owner.id.as_str()));
        assert_eq!(after.request_user_id.as_deref(), Some(target.id.as_str()));
        assert!(!after.free);
        assert_eq!(outcome.recipients, vec![target.id.clone()]);
    }

    #[tokio::test]
    async fn test_transfer_round_trip() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let target = insert_user(&pool, "target", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&owner.id), false, None).await;

        drop_duties(
            &pool,
            &owner,
            &ids(&[&duty]),
            DropTarget::User(target.id.clone()),
            early(),
            2,
        )
        .await
        .unwrap();

        let grabbed = grab_duties(&pool, &target, &ids(&[&duty])).await.unwrap();
        assert_eq!(grabbed[0].user_id.as_deref(), Some(target.id.as_str()));
        assert!(!grabbed[0].free);
        assert!(grabbed[0].request_user_id.is_none());
    }

    #[tokio::test]
    async fn test_drop_timing_guard() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (10, 0), (11, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&owner.id), false, None).await;

        // Starts in one hour: inside the 2-hour lead window
        let one_hour_before = date(2024, 1, 2).and_hms_opt(9, 0, 0).unwrap();
        let err = drop_duties(
            &pool,
            &owner,
            &ids(&[&duty]),
            DropTarget::Anyone,
            one_hour_before,
            2,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RosterError::TooLate { lead_hours: 2 }));
        assert!(!fetch_duty(&pool, &duty).await.free);

        // Starts in three hours: fine
        let three_hours_before = date(2024, 1, 2).and_hms_opt(7, 0, 0).unwrap();
        drop_duties(
            &pool,
            &owner,
            &ids(&[&duty]),
            DropTarget::Anyone,
            three_hours_before,
            2,
        )
        .await
        .unwrap();
        assert!(fetch_duty(&pool, &duty).await.free);
    }

    #[tokio::test]
    async fn test_drop_requires_ownership_of_whole_batch() {
        let pool = memory_pool().await;
        let owner = insert_user(&pool, "owner", false).await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let mine =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&actor.id), false, None).await;
        let theirs =
            insert_duty(&pool, &slot, date(2024, 1, 9), Some(&owner.id), false, None).await;

        let err = drop_duties(
            &pool,
            &actor,
            &ids(&[&mine, &theirs]),
            DropTarget::Anyone,
            early(),
            2,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RosterError::Authorization(_)));
        assert_eq!(err.to_string(), "Invalid duties to drop");

        // Neither duty changed
        assert!(!fetch_duty(&pool, &mine).await.free);
        assert!(!fetch_duty(&pool, &theirs).await.free);
    }

    #[tokio::test]
    async fn test_drop_free_duty_rejected() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;

        let err = drop_duties(&pool, &actor, &ids(&[&duty]), DropTarget::Anyone, early(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_drop_to_self_rejected() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&actor.id), false, None).await;

        let err = drop_duties(
            &pool,
            &actor,
            &ids(&[&duty]),
            DropTarget::User(actor.id.clone()),
            early(),
            2,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RosterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_drop_to_unknown_target() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty =
            insert_duty(&pool, &slot, date(2024, 1, 2), Some(&actor.id), false, None).await;

        let err = drop_duties(
            &pool,
            &actor,
            &ids(&[&duty]),
            DropTarget::User("nobody".to_string()),
            early(),
            2,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_grabable_projection() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let owner = insert_user(&pool, "owner", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;

        let free = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;
        let to_me = insert_duty(
            &pool,
            &slot,
            date(2024, 1, 9),
            Some(&owner.id),
            false,
            Some(&actor.id),
        )
        .await;
        let offloading = insert_duty(
            &pool,
            &slot,
            date(2024, 1, 16),
            Some(&actor.id),
            false,
            Some(&owner.id),
        )
        .await;
        // Owned by someone else with no transfer: not grabable
        insert_duty(&pool, &slot, date(2024, 1, 23), Some(&owner.id), false, None).await;

        let listed = grabable_duties(&pool, &actor, early()).await.unwrap();
        let listed_ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(listed_ids, vec![&free, &to_me, &offloading]);
    }

    #[tokio::test]
    async fn test_grabable_excludes_started_duties() {
        let pool = memory_pool().await;
        let actor = insert_user(&pool, "actor", false).await;
        let slot = simple_timeslot(&pool, "Tuesday", (9, 0), (10, 0), None, false).await;
        let duty = insert_duty(&pool, &slot, date(2024, 1, 2), None, true, None).await;

        // Two hours after the duty started
        let after_start = date(2024, 1, 2).and_hms_opt(11, 0, 0).unwrap();
        let listed = grabable_duties(&pool, &actor, after_start).await.unwrap();
        assert!(listed.is_empty());

        // An hour before it starts it is listed
        let before_start = date(2024, 1, 2).and_hms_opt(8, 0, 0).unwrap();
        let listed = grabable_duties(&pool, &actor, before_start).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, duty);
    }
}
