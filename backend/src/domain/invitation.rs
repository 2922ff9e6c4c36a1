//! Invitations: the only way new members join the club.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Role, UserId};

/// Number of days an invitation stays valid.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Validation errors for invitation inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationValidationError {
    InvalidEmail,
    InvalidToken,
}

impl fmt::Display for InvitationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
            Self::InvalidToken => write!(f, "invitation token must be a valid UUID"),
        }
    }
}

impl std::error::Error for InvitationValidationError {}

/// Invitee email address, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Accept addresses with exactly one `@`, non-empty on both sides, and no
    /// whitespace.
    ///
    /// # Examples
    /// ```
    /// use skiclub::domain::Email;
    ///
    /// assert_eq!(Email::new(" Anna@Club.CH ").expect("valid").as_ref(), "anna@club.ch");
    /// assert!(Email::new("anna@").is_err());
    /// assert!(Email::new("a@b@c").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvitationValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let mut parts = normalised.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(InvitationValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || normalised.chars().any(char::is_whitespace) {
            return Err(InvitationValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = InvitationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque token sent to the invitee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvitationToken(Uuid);

impl InvitationToken {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvitationValidationError> {
        Uuid::parse_str(raw.as_ref())
            .map(Self)
            .map_err(|_| InvitationValidationError::InvalidToken)
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<InvitationToken> for String {
    fn from(value: InvitationToken) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for InvitationToken {
    type Error = InvitationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Where an invitation stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

/// Reasons an invitation cannot be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceError {
    AlreadyAccepted,
    Expired,
}

impl fmt::Display for AcceptanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAccepted => write!(f, "invitation has already been accepted"),
            Self::Expired => write!(f, "invitation has expired"),
        }
    }
}

impl std::error::Error for AcceptanceError {}

/// An admin's invitation for someone to join with a given role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub token: InvitationToken,
    pub email: Email,
    pub role: Role,
    pub invited_by: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_user_id: Option<UserId>,
}

impl Invitation {
    /// Issue a fresh invitation expiring [`INVITATION_TTL_DAYS`] after `now`.
    pub fn issue(email: Email, role: Role, invited_by: UserId, now: DateTime<Utc>) -> Self {
        Self {
            token: InvitationToken::random(),
            email,
            role,
            invited_by,
            created_at: now,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
            accepted_user_id: None,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.accepted_at.is_some() {
            InvitationStatus::Accepted
        } else if now >= self.expires_at {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }

    /// Record acceptance by the newly created `user_id`.
    pub fn accept(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<(), AcceptanceError> {
        match self.status(now) {
            InvitationStatus::Accepted => Err(AcceptanceError::AlreadyAccepted),
            InvitationStatus::Expired => Err(AcceptanceError::Expired),
            InvitationStatus::Pending => {
                self.accepted_at = Some(now);
                self.accepted_user_id = Some(user_id);
                Ok(())
            }
        }
    }
}
