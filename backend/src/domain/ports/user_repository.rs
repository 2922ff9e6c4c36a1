//! Port abstraction for club account persistence.

use async_trait::async_trait;

use crate::domain::{AccountChange, DisplayName, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// No account exists with the given id.
        NotFound { id: UserId } => "user {id} not found",
        /// The change would leave the club without an active admin.
        LastAdmin => "at least one administrator must remain",
    }
}

/// Storage for club accounts.
///
/// Accounts are never deleted. Role and activation changes go through
/// [`UserRepository::update_account`], which must count the remaining active
/// admins and write the change as one atomic step so two concurrent demotions
/// cannot both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// All accounts ordered by display name.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Ids of every active account.
    async fn active_user_ids(&self) -> Result<Vec<UserId>, UserRepositoryError>;

    /// Insert a user, or overwrite the display name of an existing one.
    ///
    /// Role and activation of an existing account are left untouched.
    async fn upsert(&self, user: &User) -> Result<User, UserRepositoryError>;

    /// Replace a user's display name.
    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: &DisplayName,
    ) -> Result<User, UserRepositoryError>;

    /// Apply a role or activation change under the last-admin safeguard.
    async fn update_account(
        &self,
        id: &UserId,
        change: AccountChange,
    ) -> Result<User, UserRepositoryError>;
}
