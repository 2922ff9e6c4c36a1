//! Driving port for account administration and self-service profile edits.

use async_trait::async_trait;

use crate::domain::{Actor, DisplayName, Error, Role, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Give `target` a new role. Admin only.
    async fn change_role(&self, actor: &Actor, target: &UserId, role: Role) -> Result<User, Error>;

    /// Activate or deactivate `target`. Admin only.
    async fn set_active(&self, actor: &Actor, target: &UserId, active: bool)
    -> Result<User, Error>;

    /// Rename the acting user.
    async fn update_profile(&self, actor: &Actor, display_name: DisplayName)
    -> Result<User, Error>;
}
