//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie holds only the user id. Handlers turn it into an [`Actor`] via
//! [`SessionContext::actor`], which reloads the account so role changes and
//! deactivation take effect on the next request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::UsersQuery;
use crate::domain::{Actor, Error, User, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop everything stored in the session.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Resolve the signed-in account.
    ///
    /// Unknown or deactivated accounts are `401 Unauthorized`.
    pub async fn user(&self, users: &dyn UsersQuery) -> Result<User, Error> {
        let id = self.require_user_id()?;
        users.resolve_actor(&id).await
    }

    /// Resolve the signed-in account as an [`Actor`] for permission checks.
    pub async fn actor(&self, users: &dyn UsersQuery) -> Result<Actor, Error> {
        let user = self.user(users).await?;
        Ok(Actor::new(*user.id(), user.role()))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
