//! Capability checks for roster operations.
//!
//! A single explicit function decides what an actor may do, instead of
//! scattering role string comparisons through the handlers.

use crate::db::User;

/// Actions an actor can attempt against the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Materialize duties from templates over a date range.
    GenerateDuties,
    /// Edit default assignees on timeslot templates.
    ManageAssignments,
    /// Take ownership of a duty whose template may be restricted.
    GrabDuty { mc_only: bool },
    /// Browse the user directory (to pick a transfer target).
    ListUsers,
}

/// Capability check: allow or deny `action` for `user`.
pub fn can(user: &User, action: Action) -> bool {
    if user.is_admin() {
        return true;
    }
    match action {
        Action::GenerateDuties | Action::ManageAssignments => false,
        Action::GrabDuty { mc_only } => !mc_only || user.mc,
        Action::ListUsers => true,
    }
}
