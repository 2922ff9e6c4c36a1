//! Tour aggregate and its lifecycle.
//!
//! A tour moves `draft → published → cancelled`, may be cancelled straight
//! from `draft`, and never leaves `cancelled` through a plain transition.
//! Reopening a cancelled tour is a separate, explicit operation
//! ([`Tour::reopen`]) so the lifecycle table stays closed.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum length of a tour title, in characters.
pub const TOUR_TITLE_MAX: usize = 120;
/// Maximum length of a tour description, in characters.
pub const TOUR_DESCRIPTION_MAX: usize = 4000;
/// Largest accepted `max_participants`.
pub const TOUR_CAPACITY_MAX: u32 = 500;

/// Validation errors raised while building or editing a tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourValidationError {
    /// The identifier is not a UUID.
    InvalidId,
    /// The title is blank after trimming.
    EmptyTitle,
    /// The title exceeds [`TOUR_TITLE_MAX`] characters.
    TitleTooLong { max: usize },
    /// The description exceeds [`TOUR_DESCRIPTION_MAX`] characters.
    DescriptionTooLong { max: usize },
    /// A capacity of zero would make the tour unjoinable.
    ZeroCapacity,
    /// The capacity exceeds [`TOUR_CAPACITY_MAX`].
    CapacityTooLarge { max: u32 },
    /// An edit would leave more participants than places.
    CapacityBelowParticipants { capacity: u32, participants: usize },
    /// A stored record lists the leader among the participants.
    LeaderListedAsParticipant,
}

impl fmt::Display for TourValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "tour id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "tour title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "tour title must be at most {max} characters"),
            Self::DescriptionTooLong { max } => {
                write!(f, "tour description must be at most {max} characters")
            }
            Self::ZeroCapacity => write!(f, "maximum participants must be at least 1"),
            Self::CapacityTooLarge { max } => {
                write!(f, "maximum participants must be at most {max}")
            }
            Self::CapacityBelowParticipants {
                capacity,
                participants,
            } => write!(
                f,
                "maximum participants ({capacity}) is below the {participants} already signed up"
            ),
            Self::LeaderListedAsParticipant => {
                write!(f, "the tour leader cannot be a participant")
            }
        }
    }
}

impl std::error::Error for TourValidationError {}

/// Stable tour identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TourId(Uuid);

impl TourId {
    /// Parse a [`TourId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, TourValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| TourValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TourId> for String {
    fn from(value: TourId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for TourId {
    type Error = TourValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-empty, trimmed tour title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourTitle(String);

impl TourTitle {
    /// Validate and construct a title; surrounding whitespace is trimmed.
    pub fn new(title: impl AsRef<str>) -> Result<Self, TourValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TourValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TOUR_TITLE_MAX {
            return Err(TourValidationError::TitleTooLong {
                max: TOUR_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TourTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TourTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication state of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    /// Visible to its leader and admins only.
    #[default]
    Draft,
    /// Open for sign-ups.
    Published,
    /// Called off; terminal for the lifecycle.
    Cancelled,
}

impl TourStatus {
    /// Returns the storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// # Examples
    /// ```
    /// use skiclub::domain::TourStatus;
    ///
    /// assert!(TourStatus::Draft.can_transition_to(TourStatus::Published));
    /// assert!(!TourStatus::Published.can_transition_to(TourStatus::Draft));
    /// assert!(!TourStatus::Cancelled.can_transition_to(TourStatus::Published));
    /// ```
    pub fn can_transition_to(self, next: TourStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published)
                | (Self::Draft, Self::Cancelled)
                | (Self::Published, Self::Cancelled)
        )
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(self, next: TourStatus) -> Result<TourStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTourStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseTourStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tour status: {}", self.input)
    }
}

impl std::error::Error for ParseTourStatusError {}

impl FromStr for TourStatus {
    type Err = ParseTourStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTourStatusError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A status change the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    /// Status the tour was in.
    pub from: TourStatus,
    /// Status that was requested.
    pub to: TourStatus,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move a {} tour to {}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

/// Reasons a sign-up or withdrawal is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationError {
    /// Only published tours take sign-ups and withdrawals.
    NotOpen { status: TourStatus },
    /// The leader is on the tour already.
    LeaderCannotJoin,
    /// The user is already signed up.
    AlreadyJoined,
    /// Every place is taken.
    Full { capacity: u32 },
    /// The user is not signed up.
    NotParticipant,
}

impl fmt::Display for ParticipationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen { status } => write!(f, "sign-ups are closed for {status} tours"),
            Self::LeaderCannotJoin => write!(f, "the tour leader cannot sign up as a participant"),
            Self::AlreadyJoined => write!(f, "already signed up for this tour"),
            Self::Full { capacity } => write!(f, "tour is full ({capacity} participants)"),
            Self::NotParticipant => write!(f, "not signed up for this tour"),
        }
    }
}

impl std::error::Error for ParticipationError {}

/// Editable tour fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourDetails {
    pub title: TourTitle,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
}

impl TourDetails {
    /// Validate raw details. Blank descriptions collapse to `None`.
    pub fn new(
        title: impl AsRef<str>,
        date: NaiveDate,
        description: Option<String>,
        max_participants: Option<u32>,
    ) -> Result<Self, TourValidationError> {
        let title = TourTitle::new(title)?;
        let description = description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if let Some(text) = &description
            && text.chars().count() > TOUR_DESCRIPTION_MAX
        {
            return Err(TourValidationError::DescriptionTooLong {
                max: TOUR_DESCRIPTION_MAX,
            });
        }
        match max_participants {
            Some(0) => return Err(TourValidationError::ZeroCapacity),
            Some(capacity) if capacity > TOUR_CAPACITY_MAX => {
                return Err(TourValidationError::CapacityTooLarge {
                    max: TOUR_CAPACITY_MAX,
                });
            }
            _ => {}
        }
        Ok(Self {
            title,
            date,
            description,
            max_participants,
        })
    }
}

/// Persisted shape of a tour, used by repositories to rehydrate aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourRecord {
    pub id: TourId,
    pub leader_id: UserId,
    pub details: TourDetails,
    pub status: TourStatus,
    pub participants: BTreeSet<UserId>,
}

/// A club tour.
///
/// ## Invariants
/// - `participants` never contains `leader_id`.
/// - `participants.len()` never exceeds `max_participants`.
/// - `status` only changes along [`TourStatus::can_transition_to`], except
///   through [`Tour::reopen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    id: TourId,
    leader_id: UserId,
    details: TourDetails,
    status: TourStatus,
    participants: BTreeSet<UserId>,
}

impl Tour {
    /// Start a new draft tour led by `leader_id`.
    pub fn draft(id: TourId, leader_id: UserId, details: TourDetails) -> Self {
        Self {
            id,
            leader_id,
            details,
            status: TourStatus::Draft,
            participants: BTreeSet::new(),
        }
    }

    /// Tour identifier.
    pub fn id(&self) -> &TourId {
        &self.id
    }

    /// Account that owns the tour.
    pub fn leader_id(&self) -> &UserId {
        &self.leader_id
    }

    /// Current editable fields.
    pub fn details(&self) -> &TourDetails {
        &self.details
    }

    /// Lifecycle state.
    pub fn status(&self) -> TourStatus {
        self.status
    }

    /// Signed-up members, excluding the leader.
    pub fn participants(&self) -> &BTreeSet<UserId> {
        &self.participants
    }

    /// Whether `user_id` is signed up.
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// Whether a capacity is set and reached.
    pub fn is_full(&self) -> bool {
        self.details
            .max_participants
            .is_some_and(|capacity| self.participants.len() >= capacity as usize)
    }

    /// Replace the editable fields, keeping capacity above current sign-ups.
    pub fn apply_details(&mut self, details: TourDetails) -> Result<(), TourValidationError> {
        check_capacity(details.max_participants, self.participants.len())?;
        self.details = details;
        Ok(())
    }

    /// Move along the lifecycle, returning the previous status.
    pub fn transition(&mut self, next: TourStatus) -> Result<TourStatus, TransitionError> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        Ok(previous)
    }

    /// Explicitly bring a cancelled tour back to draft.
    ///
    /// Former participants were told about the cancellation and cannot see
    /// drafts, so the sign-up list starts over.
    pub fn reopen(&mut self) -> Result<(), TransitionError> {
        if self.status != TourStatus::Cancelled {
            return Err(TransitionError {
                from: self.status,
                to: TourStatus::Draft,
            });
        }
        self.status = TourStatus::Draft;
        self.participants.clear();
        Ok(())
    }

    /// Sign `user_id` up for the tour.
    pub fn add_participant(&mut self, user_id: UserId) -> Result<(), ParticipationError> {
        if self.status != TourStatus::Published {
            return Err(ParticipationError::NotOpen {
                status: self.status,
            });
        }
        if user_id == self.leader_id {
            return Err(ParticipationError::LeaderCannotJoin);
        }
        if self.participants.contains(&user_id) {
            return Err(ParticipationError::AlreadyJoined);
        }
        if let Some(capacity) = self.details.max_participants
            && self.is_full()
        {
            return Err(ParticipationError::Full { capacity });
        }
        self.participants.insert(user_id);
        Ok(())
    }

    /// Withdraw `user_id` from the tour.
    pub fn remove_participant(&mut self, user_id: &UserId) -> Result<(), ParticipationError> {
        if self.status == TourStatus::Cancelled {
            return Err(ParticipationError::NotOpen {
                status: self.status,
            });
        }
        if !self.participants.remove(user_id) {
            return Err(ParticipationError::NotParticipant);
        }
        Ok(())
    }
}

/// A single mutation of an existing tour, applied atomically by repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourChange {
    /// Replace the editable fields; status is untouched.
    Edit(TourDetails),
    /// Move along the lifecycle table.
    Transition(TourStatus),
    /// Bring a cancelled tour back to draft and drop its sign-ups.
    Reopen,
    /// Sign a member up.
    Join(UserId),
    /// Withdraw a member.
    Leave(UserId),
}

/// Why a [`TourChange`] was refused by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourChangeError {
    /// The new details are invalid for this tour.
    Validation(TourValidationError),
    /// The lifecycle forbids the move.
    Transition(TransitionError),
    /// The sign-up rules refuse the join or leave.
    Participation(ParticipationError),
}

impl fmt::Display for TourChangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => err.fmt(f),
            Self::Transition(err) => err.fmt(f),
            Self::Participation(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TourChangeError {}

impl TourChange {
    /// Apply the change to `tour`, leaving it untouched on error.
    pub fn apply_to(self, tour: &mut Tour) -> Result<(), TourChangeError> {
        match self {
            Self::Edit(details) => tour
                .apply_details(details)
                .map_err(TourChangeError::Validation),
            Self::Transition(next) => tour
                .transition(next)
                .map(|_| ())
                .map_err(TourChangeError::Transition),
            Self::Reopen => tour.reopen().map_err(TourChangeError::Transition),
            Self::Join(user_id) => tour
                .add_participant(user_id)
                .map_err(TourChangeError::Participation),
            Self::Leave(user_id) => tour
                .remove_participant(&user_id)
                .map_err(TourChangeError::Participation),
        }
    }
}

fn check_capacity(capacity: Option<u32>, participants: usize) -> Result<(), TourValidationError> {
    match capacity {
        Some(capacity) if (capacity as usize) < participants => {
            Err(TourValidationError::CapacityBelowParticipants {
                capacity,
                participants,
            })
        }
        _ => Ok(()),
    }
}

impl TryFrom<TourRecord> for Tour {
    type Error = TourValidationError;

    fn try_from(record: TourRecord) -> Result<Self, Self::Error> {
        let TourRecord {
            id,
            leader_id,
            details,
            status,
            participants,
        } = record;
        if participants.contains(&leader_id) {
            return Err(TourValidationError::LeaderListedAsParticipant);
        }
        check_capacity(details.max_participants, participants.len())?;
        Ok(Self {
            id,
            leader_id,
            details,
            status,
            participants,
        })
    }
}

impl From<Tour> for TourRecord {
    fn from(tour: Tour) -> Self {
        Self {
            id: tour.id,
            leader_id: tour.leader_id,
            details: tour.details,
            status: tour.status,
            participants: tour.participants,
        }
    }
}

#[cfg(test)]
mod tests;
