//! PostgreSQL-backed `InvitationRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{InvitationRepository, InvitationRepositoryError};
use crate::domain::{Email, Invitation, InvitationToken, Role, User, UserId};

use super::diesel_helpers::{TxError, map_diesel_error, map_pool_error};
use super::diesel_user_repository::new_user_row;
use super::models::{InvitationRow, NewInvitationRow};
use super::pool::DbPool;
use super::schema::{invitations, users};

/// Diesel-backed implementation of the `InvitationRepository` port.
#[derive(Clone)]
pub struct DieselInvitationRepository {
    pool: DbPool,
}

impl DieselInvitationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> InvitationRepositoryError {
    map_diesel_error(
        error,
        InvitationRepositoryError::query,
        InvitationRepositoryError::connection,
    )
}

fn row_to_invitation(row: InvitationRow) -> Result<Invitation, InvitationRepositoryError> {
    let corrupt =
        |detail: String| InvitationRepositoryError::query(format!("stored invitation: {detail}"));
    let email = Email::new(&row.email).map_err(|err| corrupt(err.to_string()))?;
    let role: Role = row.role.parse().map_err(|err| corrupt(format!("{err}")))?;
    Ok(Invitation {
        token: InvitationToken::from_uuid(row.token),
        email,
        role,
        invited_by: UserId::from_uuid(row.invited_by),
        created_at: row.created_at,
        expires_at: row.expires_at,
        accepted_at: row.accepted_at,
        accepted_user_id: row.accepted_user_id.map(UserId::from_uuid),
    })
}

fn new_invitation_row(invitation: &Invitation) -> NewInvitationRow<'_> {
    NewInvitationRow {
        token: *invitation.token.as_uuid(),
        email: invitation.email.as_ref(),
        role: invitation.role.as_str(),
        invited_by: *invitation.invited_by.as_uuid(),
        created_at: invitation.created_at,
        expires_at: invitation.expires_at,
    }
}

#[async_trait]
impl InvitationRepository for DieselInvitationRepository {
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, InvitationRepositoryError::connection))?;
        diesel::insert_into(invitations::table)
            .values(&new_invitation_row(invitation))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Invitation>, InvitationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, InvitationRepositoryError::connection))?;
        let rows: Vec<InvitationRow> = invitations::table
            .order(invitations::created_at.desc())
            .select(InvitationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_invitation).collect()
    }

    async fn accept(
        &self,
        token: &InvitationToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(Invitation, User), InvitationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, InvitationRepositoryError::connection))?;
        let token = *token;
        let candidate = user.clone();

        conn.transaction::<(Invitation, User), TxError<InvitationRepositoryError>, _>(|conn| {
            async move {
                let row: Option<InvitationRow> = invitations::table
                    .filter(invitations::token.eq(token.as_uuid()))
                    .select(InvitationRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let row = row
                    .ok_or_else(|| TxError::Rejected(InvitationRepositoryError::not_found(token)))?;
                let mut invitation = row_to_invitation(row).map_err(TxError::Rejected)?;

                let created = candidate.with_role(invitation.role);
                invitation.accept(*created.id(), now).map_err(|reason| {
                    TxError::Rejected(InvitationRepositoryError::rejected(reason))
                })?;

                diesel::insert_into(users::table)
                    .values(&new_user_row(&created))
                    .execute(conn)
                    .await?;
                diesel::update(invitations::table.filter(invitations::token.eq(token.as_uuid())))
                    .set((
                        invitations::accepted_at.eq(invitation.accepted_at),
                        invitations::accepted_user_id.eq(invitation
                            .accepted_user_id
                            .map(|id| *id.as_uuid())),
                    ))
                    .execute(conn)
                    .await?;
                Ok((invitation, created))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_error(diesel_error))
    }
}
