//! Port abstraction for invitation persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AcceptanceError, Invitation, InvitationToken, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by invitation repository adapters.
    pub enum InvitationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "invitation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invitation repository query failed: {message}",
        /// No invitation carries the given token.
        NotFound { token: InvitationToken } => "invitation {token} not found",
        /// The invitation can no longer be accepted.
        Rejected { reason: AcceptanceError } => "{reason}",
    }
}

/// Storage for invitations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persist a newly issued invitation.
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError>;

    /// Every invitation, newest first.
    async fn list(&self) -> Result<Vec<Invitation>, InvitationRepositoryError>;

    /// Mark the invitation accepted and create `user` in one atomic step.
    ///
    /// The role of `user` is replaced by the invitation's role.
    async fn accept(
        &self,
        token: &InvitationToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(Invitation, User), InvitationRepositoryError>;
}
