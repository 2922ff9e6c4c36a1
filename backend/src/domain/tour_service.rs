//! Tour domain service implementing [`TourCommand`] and [`TourQuery`].
//!
//! Each operation loads the target tour, asks [`permissions`] whether the
//! actor may proceed, then hands the mutation to the repository as a single
//! [`TourChange`]. Notifications are sent after the write commits; delivery
//! failures are logged and swallowed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    NotificationSink, TourCommand, TourQuery, TourRepository, TourRepositoryError,
    UserRepository,
};
use crate::domain::user_account_service::map_user_error;
use crate::domain::{
    Actor, Error, Notification, ParticipationError, Tour, TourChange, TourChangeError,
    TourDetails, TourId, TourStatus, permissions,
};

/// Tour service implementing the tour driving ports.
#[derive(Clone)]
pub struct TourService<T, U, N> {
    tours: Arc<T>,
    users: Arc<U>,
    notifications: Arc<N>,
}

impl<T, U, N> TourService<T, U, N> {
    pub fn new(tours: Arc<T>, users: Arc<U>, notifications: Arc<N>) -> Self {
        Self {
            tours,
            users,
            notifications,
        }
    }
}

fn map_tour_error(error: TourRepositoryError) -> Error {
    match error {
        TourRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tour repository unavailable: {message}"))
        }
        TourRepositoryError::Query { message } => {
            Error::internal(format!("tour repository error: {message}"))
        }
        TourRepositoryError::NotFound { id } => Error::not_found(format!("tour {id} not found")),
        TourRepositoryError::StatusChanged { expected, actual } => {
            Error::conflict("tour changed while the request was processed").with_details(json!({
                "expectedStatus": expected,
                "actualStatus": actual,
            }))
        }
        TourRepositoryError::Rejected { reason } => map_change_error(reason),
    }
}

fn map_change_error(error: TourChangeError) -> Error {
    let message = error.to_string();
    match error {
        TourChangeError::Validation(_) => Error::invalid_request(message),
        TourChangeError::Transition(err) => {
            Error::invalid_transition(message).with_details(json!({
                "from": err.from,
                "to": err.to,
            }))
        }
        TourChangeError::Participation(
            ParticipationError::AlreadyJoined | ParticipationError::Full { .. },
        ) => Error::conflict(message),
        TourChangeError::Participation(_) => Error::invalid_request(message),
    }
}

impl<T, U, N> TourService<T, U, N>
where
    T: TourRepository,
    U: UserRepository,
    N: NotificationSink,
{
    async fn load(&self, tour_id: &TourId) -> Result<Tour, Error> {
        self.tours
            .find_by_id(tour_id)
            .await
            .map_err(map_tour_error)?
            .ok_or_else(|| Error::not_found(format!("tour {tour_id} not found")))
    }

    async fn apply(
        &self,
        tour_id: &TourId,
        expected_status: Option<TourStatus>,
        change: TourChange,
    ) -> Result<Tour, Error> {
        self.tours
            .apply(tour_id, expected_status, change)
            .await
            .map_err(map_tour_error)
    }

    async fn notify(&self, notification: Option<Notification>) {
        let Some(notification) = notification else {
            return;
        };
        if let Err(err) = self.notifications.deliver(&notification).await {
            warn!(
                kind = notification.kind.as_str(),
                tour_id = %notification.tour_id,
                recipients = notification.recipients.len(),
                error = %err,
                "notification delivery failed"
            );
        }
    }

    async fn transition(
        &self,
        actor: &Actor,
        tour_id: &TourId,
        next: TourStatus,
    ) -> Result<(Tour, TourStatus), Error> {
        let tour = self.load(tour_id).await?;
        actor.ensure(
            permissions::can_transition_tour(actor.role, tour.leader_id(), &actor.id),
            "change the status of this tour",
        )?;
        let previous = tour.status();
        let updated = self
            .apply(tour_id, Some(previous), TourChange::Transition(next))
            .await?;
        info!(%tour_id, actor = %actor.id, from = %previous, to = %next, "tour status changed");
        Ok((updated, previous))
    }
}

#[async_trait]
impl<T, U, N> TourCommand for TourService<T, U, N>
where
    T: TourRepository,
    U: UserRepository,
    N: NotificationSink,
{
    async fn create_tour(&self, actor: &Actor, details: TourDetails) -> Result<Tour, Error> {
        actor.ensure(permissions::can_create_tour(actor.role), "create tours")?;
        let leader = self
            .users
            .find_by_id(&actor.id)
            .await
            .map_err(map_user_error)?;
        if leader.is_none() {
            return Err(Error::not_found(format!("user {} not found", actor.id)));
        }

        let tour = Tour::draft(TourId::random(), actor.id, details);
        self.tours.insert(&tour).await.map_err(map_tour_error)?;
        info!(tour_id = %tour.id(), leader = %actor.id, "tour created");
        Ok(tour)
    }

    async fn edit_tour(
        &self,
        actor: &Actor,
        tour_id: &TourId,
        details: TourDetails,
    ) -> Result<Tour, Error> {
        let tour = self.load(tour_id).await?;
        actor.ensure(
            permissions::can_edit_tour(actor.role, tour.leader_id(), &actor.id, tour.status()),
            "edit this tour",
        )?;
        let updated = self
            .apply(tour_id, Some(tour.status()), TourChange::Edit(details))
            .await?;
        info!(%tour_id, actor = %actor.id, "tour edited");
        self.notify(Notification::tour_updated(&updated, actor.id))
            .await;
        Ok(updated)
    }

    async fn delete_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<(), Error> {
        let tour = self.load(tour_id).await?;
        actor.ensure(
            permissions::can_delete_tour(actor.role, tour.leader_id(), &actor.id),
            "delete this tour",
        )?;
        self.tours.delete(tour_id).await.map_err(map_tour_error)?;
        info!(%tour_id, actor = %actor.id, "tour deleted");
        Ok(())
    }

    async fn publish_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let (tour, _) = self
            .transition(actor, tour_id, TourStatus::Published)
            .await?;
        match self.users.active_user_ids().await {
            Ok(audience) => {
                self.notify(Notification::tour_published(&tour, actor.id, audience))
                    .await;
            }
            Err(err) => warn!(%tour_id, error = %err, "could not load publish audience"),
        }
        Ok(tour)
    }

    async fn cancel_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let (tour, previous) = self
            .transition(actor, tour_id, TourStatus::Cancelled)
            .await?;
        self.notify(Notification::tour_cancelled(&tour, actor.id, previous))
            .await;
        Ok(tour)
    }

    async fn reopen_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let tour = self.load(tour_id).await?;
        actor.ensure(
            permissions::can_reopen_tour(actor.role),
            "reopen cancelled tours",
        )?;
        let updated = self
            .apply(tour_id, Some(tour.status()), TourChange::Reopen)
            .await?;
        info!(%tour_id, actor = %actor.id, "tour reopened");
        Ok(updated)
    }

    async fn join_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let tour = self.load(tour_id).await?;
        if !permissions::can_view_tour(actor.role, tour.leader_id(), &actor.id, tour.status()) {
            return Err(Error::not_found(format!("tour {tour_id} not found")));
        }
        actor.ensure(permissions::can_join_tour(actor.role), "join tours")?;
        let updated = self
            .apply(tour_id, None, TourChange::Join(actor.id))
            .await?;
        info!(%tour_id, participant = %actor.id, "participant joined");
        self.notify(Notification::participant_joined(&updated, actor.id))
            .await;
        Ok(updated)
    }

    async fn leave_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let updated = self
            .apply(tour_id, None, TourChange::Leave(actor.id))
            .await?;
        info!(%tour_id, participant = %actor.id, "participant left");
        self.notify(Notification::participant_left(&updated, actor.id))
            .await;
        Ok(updated)
    }
}

#[async_trait]
impl<T, U, N> TourQuery for TourService<T, U, N>
where
    T: TourRepository,
    U: UserRepository,
    N: NotificationSink,
{
    async fn list_tours(&self, actor: &Actor) -> Result<Vec<Tour>, Error> {
        let tours = self.tours.list().await.map_err(map_tour_error)?;
        Ok(tours
            .into_iter()
            .filter(|tour| {
                permissions::can_view_tour(actor.role, tour.leader_id(), &actor.id, tour.status())
            })
            .collect())
    }

    async fn get_tour(&self, actor: &Actor, tour_id: &TourId) -> Result<Tour, Error> {
        let tour = self.load(tour_id).await?;
        if !permissions::can_view_tour(actor.role, tour.leader_id(), &actor.id, tour.status()) {
            return Err(Error::not_found(format!("tour {tour_id} not found")));
        }
        Ok(tour)
    }
}

#[cfg(test)]
#[path = "tour_service_tests.rs"]
mod tests;
