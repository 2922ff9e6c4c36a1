//! Driving port for reading tours.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Tour, TourId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourQuery: Send + Sync {
    /// Tours visible to `actor`, ordered by date.
    async fn list_tours(&self, actor: &Actor) -> Result<Vec<Tour>, Error>;

    /// A single tour, if `actor` may see it.
    async fn get_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error>;
}
