//! The closed role enumeration and its hierarchy.
//!
//! Every capability check in the system goes through [`Role::allows`];
//! there are no free-form role strings anywhere else.

use serde::{Deserialize, Serialize};

/// Account role with an implied hierarchy.
///
/// `SuperAdmin > Admin > Moderator > User`. A role satisfies a capability
/// floor when its rank is at least the floor's rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user and role management.
    SuperAdmin,
    /// Full access to store management (orders, refunds, products).
    Admin,
    /// Read-only access to back-office data.
    Moderator,
    /// Regular shopper account.
    #[default]
    User,
}

impl Role {
    /// Numeric rank; higher means more privileged.
    const fn rank(self) -> u8 {
        match self {
            Self::SuperAdmin => 3,
            Self::Admin => 2,
            Self::Moderator => 1,
            Self::User => 0,
        }
    }

    /// Whether this role satisfies the given capability floor.
    #[must_use]
    pub const fn allows(self, floor: Self) -> bool {
        self.rank() >= floor.rank()
    }

    /// Whether this role may use the back-office at all.
    #[must_use]
    pub const fn is_back_office(self) -> bool {
        self.allows(Self::Moderator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy() {
        assert!(Role::SuperAdmin.allows(Role::Admin));
        assert!(Role::SuperAdmin.allows(Role::User));
        assert!(Role::Admin.allows(Role::Moderator));
        assert!(!Role::Moderator.allows(Role::Admin));
        assert!(!Role::User.allows(Role::Moderator));
        assert!(Role::User.allows(Role::User));
    }

    #[test]
    fn test_back_office() {
        assert!(Role::Moderator.is_back_office());
        assert!(Role::SuperAdmin.is_back_office());
        assert!(!Role::User.is_back_office());
    }

    #[test]
    fn test_parse_roundtrip() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Moderator, Role::User] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }
}
