//! Driving port for login.
//!
//! Inbound adapters call this to turn credentials into a session user id
//! without knowing how the check is performed.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
