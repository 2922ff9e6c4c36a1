//! Bootstrap login: the one password-checked account of an installation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::user_account_service::map_user_error;
use crate::domain::{BootstrapAdmin, Error, LoginCredentials, Role, User, UserId};

/// [`LoginService`] that accepts only the configured bootstrap admin.
///
/// On every successful login the admin account is upserted so a fresh
/// database always has at least one administrator.
#[derive(Clone)]
pub struct BootstrapLoginService<U> {
    users: Arc<U>,
    admin: Arc<BootstrapAdmin>,
}

impl<U> BootstrapLoginService<U> {
    pub fn new(users: Arc<U>, admin: BootstrapAdmin) -> Self {
        Self {
            users,
            admin: Arc::new(admin),
        }
    }
}

impl<U> BootstrapLoginService<U>
where
    U: UserRepository,
{
    /// Create the bootstrap admin if it does not exist yet.
    pub async fn ensure_admin_exists(&self) -> Result<User, Error> {
        let admin = User::new(self.admin.id, self.admin.display_name.clone(), Role::Admin);
        self.users.upsert(&admin).await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U> LoginService for BootstrapLoginService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if !self.admin.matches(credentials) {
            warn!(username = credentials.username(), "rejected login");
            return Err(Error::unauthorized("invalid credentials"));
        }
        let user = self.ensure_admin_exists().await?;
        if !user.is_active() {
            return Err(Error::unauthorized("account is deactivated"));
        }
        info!(user = %user.id(), "bootstrap admin logged in");
        Ok(*user.id())
    }
}
