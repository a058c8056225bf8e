//! Account roles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The value is not one of the known roles.
    #[error("invalid role: {0:?} (expected ROLE_USER or ROLE_ADMIN)")]
    Unknown(String),
}

/// Account role with different permission levels.
///
/// The backend spells roles `ROLE_USER` and `ROLE_ADMIN`. Values are
/// normalized once, when they cross into the client, so the rest of the code
/// matches on the enum instead of comparing strings. Unrecognized wire values
/// read as [`Role::User`]; only an exact admin spelling grants admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "&'static str")]
pub enum Role {
    /// Owns and manages only their own tasks.
    #[default]
    User,
    /// Full access to all users and tasks plus aggregate statistics.
    Admin,
}

impl Role {
    /// Parse a role, accepting the canonical `ROLE_*` spelling and the bare
    /// `USER`/`ADMIN` form, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::Unknown`] for any other value.
    pub fn parse(s: &str) -> Result<Self, RoleError> {
        let normalized = s.trim().to_ascii_uppercase();
        let bare = normalized.strip_prefix("ROLE_").unwrap_or(&normalized);
        match bare {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(RoleError::Unknown(s.to_owned())),
        }
    }

    /// Read a role sent by the backend, falling back to [`Role::User`] for
    /// anything [`Role::parse`] does not recognize.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// The canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Whether this role grants the administrator screens.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from_wire(&s)
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.as_str()
    }
}
