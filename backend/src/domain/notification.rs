//! Tour notifications and their recipient rules.
//!
//! Constructors return `None` when nobody should be told, so services can
//! forward whatever comes back straight to the sink.

use serde::Serialize;

use super::{Tour, TourId, TourStatus, UserId};

/// What happened to the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TourPublished,
    TourUpdated,
    TourCancelled,
    ParticipantJoined,
    ParticipantLeft,
}

impl NotificationKind {
    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TourPublished => "tour_published",
            Self::TourUpdated => "tour_updated",
            Self::TourCancelled => "tour_cancelled",
            Self::ParticipantJoined => "participant_joined",
            Self::ParticipantLeft => "participant_left",
        }
    }
}

/// A message to deliver to a set of users about one tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub tour_id: TourId,
    pub tour_title: String,
    pub actor_id: UserId,
    pub recipients: Vec<UserId>,
}

impl Notification {
    fn build(
        kind: NotificationKind,
        tour: &Tour,
        actor_id: UserId,
        recipients: impl IntoIterator<Item = UserId>,
    ) -> Option<Self> {
        let mut recipients: Vec<UserId> = recipients.into_iter().collect();
        recipients.sort();
        recipients.dedup();
        if recipients.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            tour_id: *tour.id(),
            tour_title: tour.details().title.to_string(),
            actor_id,
            recipients,
        })
    }

    /// Announce a newly published tour to every active user but its leader.
    pub fn tour_published(
        tour: &Tour,
        actor_id: UserId,
        active_users: impl IntoIterator<Item = UserId>,
    ) -> Option<Self> {
        let leader = *tour.leader_id();
        Self::build(
            NotificationKind::TourPublished,
            tour,
            actor_id,
            active_users.into_iter().filter(|id| *id != leader),
        )
    }

    /// Tell participants of a published tour, except the editor, about an edit.
    pub fn tour_updated(tour: &Tour, editor_id: UserId) -> Option<Self> {
        if tour.status() != TourStatus::Published {
            return None;
        }
        Self::build(
            NotificationKind::TourUpdated,
            tour,
            editor_id,
            tour.participants()
                .iter()
                .copied()
                .filter(|id| *id != editor_id),
        )
    }

    /// Tell participants that a tour they signed up for was called off.
    ///
    /// Drafts have no participants, so only cancellations of published tours
    /// produce a notification.
    pub fn tour_cancelled(tour: &Tour, actor_id: UserId, previous: TourStatus) -> Option<Self> {
        if previous != TourStatus::Published {
            return None;
        }
        Self::build(
            NotificationKind::TourCancelled,
            tour,
            actor_id,
            tour.participants().iter().copied(),
        )
    }

    /// Tell the leader that someone signed up.
    pub fn participant_joined(tour: &Tour, participant_id: UserId) -> Option<Self> {
        Self::build(
            NotificationKind::ParticipantJoined,
            tour,
            participant_id,
            [*tour.leader_id()],
        )
    }

    /// Tell the leader that someone withdrew.
    pub fn participant_left(tour: &Tour, participant_id: UserId) -> Option<Self> {
        Self::build(
            NotificationKind::ParticipantLeft,
            tour,
            participant_id,
            [*tour.leader_id()],
        )
    }
}
