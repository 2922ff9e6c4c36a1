//! Error plumbing shared by the Diesel repositories.

use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through a repository's `connection` constructor.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => connection(message),
    }
}

/// Map a Diesel failure through a repository's `query`/`connection`
/// constructors.
///
/// Driver details are logged at debug level and kept out of the returned
/// message.
pub(super) fn map_diesel_error<E>(
    error: diesel::result::Error,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Error type for transaction closures: either Diesel failed, or the domain
/// refused the change and the transaction must roll back.
#[derive(Debug)]
pub(super) enum TxError<E> {
    Diesel(diesel::result::Error),
    Rejected(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl<E> TxError<E> {
    /// Collapse into the repository error, mapping Diesel failures with
    /// `map_diesel`.
    pub(super) fn into_error(self, map_diesel: impl FnOnce(diesel::result::Error) -> E) -> E {
        match self {
            Self::Diesel(error) => map_diesel(error),
            Self::Rejected(error) => error,
        }
    }
}
