//! Port abstraction for tour persistence.

use async_trait::async_trait;

use crate::domain::{Tour, TourChange, TourChangeError, TourId, TourStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tour repository adapters.
    pub enum TourRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "tour repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tour repository query failed: {message}",
        /// No tour exists with the given id.
        NotFound { id: TourId } => "tour {id} not found",
        /// The tour changed status after the caller's permission check.
        StatusChanged { expected: TourStatus, actual: TourStatus } =>
            "tour status changed from {expected} to {actual}",
        /// The aggregate refused the change.
        Rejected { reason: TourChangeError } => "{reason}",
    }
}

/// Storage for tours and their participant lists.
///
/// [`TourRepository::apply`] loads, mutates, and writes a tour as one atomic
/// step. Capacity and duplicate sign-up checks therefore hold under
/// concurrent joins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Fetch a tour with its participants.
    async fn find_by_id(&self, id: &TourId) -> Result<Option<Tour>, TourRepositoryError>;

    /// Every tour ordered by date, then title.
    async fn list(&self) -> Result<Vec<Tour>, TourRepositoryError>;

    /// Persist a freshly created tour.
    async fn insert(&self, tour: &Tour) -> Result<(), TourRepositoryError>;

    /// Remove a tour and its participant list.
    async fn delete(&self, id: &TourId) -> Result<(), TourRepositoryError>;

    /// Apply `change` to the stored tour and return the result.
    ///
    /// When `expected_status` is set and the stored status differs, the
    /// adapter returns [`TourRepositoryError::StatusChanged`] without writing.
    async fn apply(
        &self,
        id: &TourId,
        expected_status: Option<TourStatus>,
        change: TourChange,
    ) -> Result<Tour, TourRepositoryError>;
}
