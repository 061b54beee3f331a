//! Role names and the caller identity used by every authorization check.
//!
//! Role strings must match the `role` claim carried by access tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Id;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_FREELANCER: &str = "freelancer";

/// A marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
    Freelancer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Client => ROLE_CLIENT,
            Role::Freelancer => ROLE_FREELANCER,
        }
    }

    /// True when this role satisfies a required-role set.
    ///
    /// Admin satisfies every set, mirroring the role guard used by the
    /// HTTP extractors.
    pub fn satisfies(self, required: &[Role]) -> bool {
        self == Role::Admin || required.contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_FREELANCER => Ok(Role::Freelancer),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Id,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: Id, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_any_required_set() {
        assert!(Role::Admin.satisfies(&[Role::Client]));
        assert!(Role::Admin.satisfies(&[]));
    }

    #[test]
    fn freelancer_does_not_satisfy_client_set() {
        assert!(!Role::Freelancer.satisfies(&[Role::Client]));
        assert!(Role::Freelancer.satisfies(&[Role::Freelancer]));
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Client, Role::Freelancer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }
}
