//! Driving port for user-facing account queries.

use async_trait::async_trait;

use crate::domain::{Actor, Error, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Load the session user, rejecting unknown or deactivated accounts with
    /// `unauthorized`.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<User, Error>;

    /// The club roster.
    async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, Error>;
}
