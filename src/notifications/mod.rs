//! Notification dispatch for duty ownership changes.
//!
//! The roster core only knows the [`DutyNotifier`] port: a list of
//! affected duties and the user ids to inform. Delivery (currently SMTP)
//! lives behind it.

pub mod email;

pub use email::EmailNotifier;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::DutyDetail;

/// Port through which the lifecycle manager announces dropped duties.
#[async_trait]
pub trait DutyNotifier: Send + Sync {
    /// Inform `recipients` (user ids) that `duties` are up for grabs or
    /// offered to them. Called fire-and-forget after the drop committed;
    /// failures must not affect roster state.
    async fn duties_dropped(&self, duties: &[DutyDetail], recipients: &[String]) -> Result<()>;
}
