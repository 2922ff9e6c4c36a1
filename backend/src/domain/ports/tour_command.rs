//! Driving port for tour mutations.
//!
//! Every operation takes the calling [`Actor`] explicitly; implementations
//! decide permissions through [`crate::domain::permissions`] before touching
//! storage.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Tour, TourDetails, TourId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourCommand: Send + Sync {
    /// Create a draft tour led by `actor`.
    async fn create_tour(&self, actor: &Actor, details: TourDetails) -> Result<Tour, Error>;

    /// Replace a tour's editable fields.
    async fn edit_tour(
        &self,
        actor: &Actor,
        tour_id: &TourId,
        details: TourDetails,
    ) -> Result<Tour, Error>;

    /// Remove a tour.
    async fn delete_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<(), Error>;

    /// Move a draft tour to published.
    async fn publish_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;

    /// Cancel a draft or published tour.
    async fn cancel_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;

    /// Bring a cancelled tour back to draft.
    async fn reopen_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;

    /// Sign `actor` up for a published tour.
    async fn join_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;

    /// Withdraw `actor` from a tour.
    async fn leave_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;
}
