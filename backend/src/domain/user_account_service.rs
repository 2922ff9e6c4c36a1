//! Account administration service.
//!
//! Implements [`UsersQuery`] and [`UserAccountCommand`]. Role and activation
//! changes are delegated to [`UserRepository::update_account`], which applies
//! the last-admin safeguard atomically.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{UserAccountCommand, UserRepository, UserRepositoryError, UsersQuery};
use crate::domain::{AccountChange, Actor, DisplayName, Error, Role, User, UserId, permissions};

/// User account service implementing the account driving ports.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
}

impl<U> UserAccountService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::NotFound { id } => Error::not_found(format!("user {id} not found")),
        UserRepositoryError::LastAdmin => Error::last_admin_violation(),
    }
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    async fn update_account(
        &self,
        actor: &Actor,
        target: &UserId,
        change: AccountChange,
    ) -> Result<User, Error> {
        actor.ensure(permissions::can_manage_users(actor.role), "manage users")?;
        let user = self
            .users
            .update_account(target, change)
            .await
            .map_err(map_user_error)?;
        info!(actor = %actor.id, target = %target, ?change, "account updated");
        Ok(user)
    }
}

#[async_trait]
impl<U> UsersQuery for UserAccountService<U>
where
    U: UserRepository,
{
    async fn resolve_actor(&self, user_id: &UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?;
        match user {
            Some(user) if user.is_active() => Ok(user),
            Some(_) => Err(Error::unauthorized("account is deactivated")),
            None => Err(Error::unauthorized("unknown account")),
        }
    }

    async fn list_users(&self, _actor: &Actor) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U> UserAccountCommand for UserAccountService<U>
where
    U: UserRepository,
{
    async fn change_role(&self, actor: &Actor, target: &UserId, role: Role) -> Result<User, Error> {
        self.update_account(actor, target, AccountChange::Role(role))
            .await
    }

    async fn set_active(
        &self,
        actor: &Actor,
        target: &UserId,
        active: bool,
    ) -> Result<User, Error> {
        self.update_account(actor, target, AccountChange::Active(active))
            .await
    }

    async fn update_profile(
        &self,
        actor: &Actor,
        display_name: DisplayName,
    ) -> Result<User, Error> {
        let user = self
            .users
            .update_display_name(&actor.id, &display_name)
            .await
            .map_err(map_user_error)?;
        info!(user = %actor.id, "profile updated");
        Ok(user)
    }
}
