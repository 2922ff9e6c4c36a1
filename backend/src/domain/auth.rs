//! Login credentials and the bootstrap administrator account.
//!
//! Member authentication lives outside this service; the only password this
//! backend ever checks is the one configured for the bootstrap admin.

use std::fmt;

use zeroize::Zeroizing;

use super::{DisplayName, UserId};

/// Reasons a login payload is rejected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyUsername,
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Username and password submitted to `/login`.
///
/// The username is trimmed; the password is kept verbatim and wiped on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Configured first administrator of a fresh installation.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub id: UserId,
    pub display_name: DisplayName,
    pub username: String,
    pub password: Zeroizing<String>,
}

impl BootstrapAdmin {
    /// Whether `credentials` match the configured username and password.
    pub fn matches(&self, credentials: &LoginCredentials) -> bool {
        credentials.username() == self.username && credentials.password() == self.password.as_str()
    }
}
