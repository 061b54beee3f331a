//! Job status and payment state machine.
//!
//! ```text
//!            escrow (implicit, not role-gated)
//!          ┌──────────────────────────────┐
//!          │                              ▼
//!        OPEN ──────────────────────► IN_PROGRESS ─────► COMPLETED
//!          │                              │     release ──────▲
//!          └──────► CANCELLED ◄───────────┘
//!
//! payment:  PENDING_ESCROW ──escrow──► ESCROWED ──release──► RELEASED
//! ```
//!
//! COMPLETED and CANCELLED are terminal. `escrow` advances OPEN to
//! IN_PROGRESS as a side channel that bypasses [`TRANSITIONS`]; `release`
//! is the only way to reach RELEASED and always lands the job in COMPLETED.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    PendingEscrow,
    Escrowed,
    Released,
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentState::PendingEscrow => "PENDING_ESCROW",
            PaymentState::Escrowed => "ESCROWED",
            PaymentState::Released => "RELEASED",
        })
    }
}

/// One row of the transition table.
pub struct Transition {
    pub from: JobStatus,
    pub to: JobStatus,
    pub roles: &'static [Role],
}

const CLIENT_OR_ADMIN: &[Role] = &[Role::Client, Role::Admin];

/// Allowed status transitions and the roles permitted to request them.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: JobStatus::Open,
        to: JobStatus::InProgress,
        roles: CLIENT_OR_ADMIN,
    },
    Transition {
        from: JobStatus::Open,
        to: JobStatus::Cancelled,
        roles: CLIENT_OR_ADMIN,
    },
    Transition {
        from: JobStatus::InProgress,
        to: JobStatus::Completed,
        roles: CLIENT_OR_ADMIN,
    },
    Transition {
        from: JobStatus::InProgress,
        to: JobStatus::Cancelled,
        roles: CLIENT_OR_ADMIN,
    },
];

/// Look up the transition row for `from -> to`, if the table allows it.
pub fn find_transition(from: JobStatus, to: JobStatus) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Check a requested status change against the transition table.
///
/// Returns `InvalidTransition` when the pair is not in the table (this
/// includes every transition out of a terminal status) and `Forbidden` when
/// the caller's role is not in the row's role set.
pub fn check_transition(from: JobStatus, to: JobStatus, role: Role) -> Result<(), CoreError> {
    let transition =
        find_transition(from, to).ok_or(CoreError::InvalidTransition { from, to })?;
    if !transition.roles.contains(&role) {
        return Err(CoreError::Forbidden(format!(
            "Role '{role}' may not move a job to {to}"
        )));
    }
    Ok(())
}
