//! Error taxonomy for roster operations.
//!
//! Every batch operation is atomic: any of these errors aborts the whole
//! batch with zero mutations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    /// Malformed or empty batch input.
    #[error("{0}")]
    Validation(String),

    /// The actor lacks ownership or eligibility for at least one duty in
    /// the batch.
    #[error("{0}")]
    Authorization(String),

    /// Drop attempted inside the no-drop lead window.
    #[error("You can only drop your duty at most {lead_hours} hours before it starts")]
    TooLate { lead_hours: i64 },

    /// A referenced duty or user does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
