//! Club roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role attached to every club account.
///
/// Roles are flat: an admin is not "a leader plus more" as far as the
/// predicates in [`crate::domain::permissions`] are concerned; each predicate
/// names the roles it accepts explicitly.
///
/// # Examples
/// ```
/// use skiclub::domain::Role;
///
/// let role: Role = "leader".parse().expect("known role");
/// assert_eq!(role, Role::Leader);
/// assert_eq!(role.to_string(), "leader");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted management rights over users and tours.
    Admin,
    /// May create tours and manage the ones they lead.
    Leader,
    /// Browses tours and signs up for them.
    #[default]
    Member,
}

impl Role {
    /// Every role, in descending order of privilege.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Leader, Role::Member];

    /// Returns the storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Leader => "leader",
            Self::Member => "member",
        }
    }

    /// Whether the role is [`Role::Admin`].
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "leader" => Ok(Self::Leader),
            "member" => Ok(Self::Member),
            _ => Err(ParseRoleError {
                input: s.to_owned(),
            }),
        }
    }
}
