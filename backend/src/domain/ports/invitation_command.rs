//! Driving port for invitations.

use async_trait::async_trait;

use crate::domain::{Actor, DisplayName, Email, Error, Invitation, InvitationToken, Role, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationCommand: Send + Sync {
    /// Issue an invitation. Admin only.
    async fn create_invitation(
        &self,
        actor: &Actor,
        email: Email,
        role: Role,
    ) -> Result<Invitation, Error>;

    /// Every invitation, newest first. Admin only.
    async fn list_invitations(&self, actor: &Actor) -> Result<Vec<Invitation>, Error>;

    /// Redeem an invitation, creating the invitee's account.
    async fn accept_invitation(
        &self,
        token: &InvitationToken,
        display_name: DisplayName,
    ) -> Result<User, Error>;
}
