//! Duty instances and their lifecycle state.
//!
//! A duty is a concrete dated obligation derived from a timeslot template.
//! It cycles between owned, free, and pending-transfer until its date
//! passes; duties are never deleted by normal operation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Duty {
    pub id: String,
    pub timeslot_id: String,
    pub date: NaiveDate,
    /// Current owner. Stays set while a transfer is pending.
    pub user_id: Option<String>,
    /// Open for any eligible user to grab; overrides `user_id`.
    pub free: bool,
    /// Proposed new owner of a pending transfer.
    pub request_user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Lifecycle state derived from (user_id, free, request_user_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyState {
    Owned,
    Free,
    PendingTransfer,
}

impl Duty {
    pub fn state(&self) -> DutyState {
        if self.free {
            DutyState::Free
        } else if self.request_user_id.is_some() {
            DutyState::PendingTransfer
        } else {
            DutyState::Owned
        }
    }

    /// Whether `user_id` names the committed owner of this duty. A free
    /// duty has no owner even if the column was never cleared.
    pub fn owned_by(&self, user_id: &str) -> bool {
        !self.free && self.user_id.as_deref() == Some(user_id)
    }

    /// Grab eligibility for a given actor, ignoring the mc_only gate:
    /// free duties, transfers addressed to the actor, and reclaims of a
    /// duty the actor is currently offloading. A duty that never had an
    /// owner (template without a default user) counts as free.
    pub fn grabable_by(&self, user_id: &str) -> bool {
        self.free
            || (self.user_id.is_none() && self.request_user_id.is_none())
            || self.request_user_id.as_deref() == Some(user_id)
            || (self.request_user_id.is_some() && self.user_id.as_deref() == Some(user_id))
    }
}

/// A duty joined with its template, catalog entries, and owner, as served
/// by the roster views and handed to the notifier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DutyDetail {
    pub id: String,
    pub timeslot_id: String,
    pub date: NaiveDate,
    pub user_id: Option<String>,
    pub free: bool,
    pub request_user_id: Option<String>,
    pub place_name: String,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mc_only: bool,
    pub owner_username: Option<String>,
}

impl DutyDetail {
    /// Wall-clock moment this duty starts.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

/// Column list for `DutyDetail` queries; every caller joins duties with
/// timeslots, time_ranges, places, and optionally the owning user.
pub const DUTY_DETAIL_COLUMNS: &str = "d.id, d.timeslot_id, d.date, d.user_id, d.free, \
     d.request_user_id, p.name AS place_name, t.day, tr.start_time, tr.end_time, \
     t.mc_only, u.username AS owner_username";
