//! Invitation service implementing [`InvitationCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::domain::ports::{InvitationCommand, InvitationRepository, InvitationRepositoryError};
use crate::domain::{
    AcceptanceError, Actor, DisplayName, Email, Error, Invitation, InvitationToken, Role, User,
    UserId, permissions,
};

/// Issues and redeems club invitations.
///
/// Issuing and listing need `can_manage_users`; accepting needs only the
/// token, since the invitee has no account yet.
#[derive(Clone)]
pub struct InvitationService<I> {
    invitations: Arc<I>,
}

impl<I> InvitationService<I> {
    /// Build the service over an invitation store.
    pub fn new(invitations: Arc<I>) -> Self {
        Self { invitations }
    }
}

fn map_invitation_error(error: InvitationRepositoryError) -> Error {
    match error {
        InvitationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("invitation repository unavailable: {message}"))
        }
        InvitationRepositoryError::Query { message } => {
            Error::internal(format!("invitation repository error: {message}"))
        }
        InvitationRepositoryError::NotFound { .. } => Error::not_found("invitation not found"),
        InvitationRepositoryError::Rejected {
            reason: AcceptanceError::AlreadyAccepted,
        } => Error::conflict(AcceptanceError::AlreadyAccepted.to_string()),
        InvitationRepositoryError::Rejected {
            reason: AcceptanceError::Expired,
        } => Error::invalid_request(AcceptanceError::Expired.to_string()),
    }
}

#[async_trait]
impl<I> InvitationCommand for InvitationService<I>
where
    I: InvitationRepository,
{
    async fn create_invitation(
        &self,
        actor: &Actor,
        email: Email,
        role: Role,
    ) -> Result<Invitation, Error> {
        actor.ensure(permissions::can_manage_users(actor.role), "invite members")?;
        let invitation = Invitation::issue(email, role, actor.id, Utc::now());
        self.invitations
            .insert(&invitation)
            .await
            .map_err(map_invitation_error)?;
        info!(actor = %actor.id, %role, expires_at = %invitation.expires_at, "invitation issued");
        Ok(invitation)
    }

    async fn list_invitations(&self, actor: &Actor) -> Result<Vec<Invitation>, Error> {
        actor.ensure(permissions::can_manage_users(actor.role), "view invitations")?;
        self.invitations.list().await.map_err(map_invitation_error)
    }

    async fn accept_invitation(
        &self,
        token: &InvitationToken,
        display_name: DisplayName,
    ) -> Result<User, Error> {
        let candidate = User::new(UserId::random(), display_name, Role::default());
        let (invitation, user) = self
            .invitations
            .accept(token, &candidate, Utc::now())
            .await
            .map_err(map_invitation_error)?;
        info!(user = %user.id(), role = %invitation.role, "invitation accepted");
        Ok(user)
    }
}
