//! Role-based permission predicates.
//!
//! Every mutating service asks this module before touching a repository.
//! The predicates are pure and total: they look only at the arguments they
//! receive, so callers load the actor and the target first and pass the
//! relevant facts in explicitly.

use super::{Error, Role, TourStatus, UserId};

/// Authenticated caller of a service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Account the request was made with.
    pub id: UserId,
    /// Role loaded for that account at request time.
    pub role: Role,
}

impl Actor {
    /// Pair a resolved account id with its current role.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Convert a predicate outcome into a `permission_denied` error.
    ///
    /// # Examples
    /// ```
    /// use skiclub::domain::{permissions, Actor, ErrorCode, Role, UserId};
    ///
    /// let member = Actor::new(UserId::random(), Role::Member);
    /// let err = member
    ///     .ensure(permissions::can_create_tour(member.role), "create tours")
    ///     .expect_err("members cannot create tours");
    /// assert_eq!(err.code(), ErrorCode::PermissionDenied);
    /// ```
    pub fn ensure(&self, allowed: bool, action: &str) -> Result<(), Error> {
        if allowed {
            return Ok(());
        }
        tracing::debug!(actor = %self.id, role = %self.role, action, "permission denied");
        Err(Error::permission_denied(format!(
            "{} accounts may not {action}",
            self.role
        )))
    }
}

/// Admins and leaders may create tours.
pub fn can_create_tour(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Leader)
}

/// Admins edit any tour; leaders edit their own tours unless cancelled.
pub fn can_edit_tour(
    role: Role,
    tour_leader_id: &UserId,
    actor_id: &UserId,
    tour_status: TourStatus,
) -> bool {
    match role {
        Role::Admin => true,
        Role::Leader => actor_id == tour_leader_id && tour_status != TourStatus::Cancelled,
        Role::Member => false,
    }
}

/// Admins delete any tour; leaders delete their own.
pub fn can_delete_tour(role: Role, tour_leader_id: &UserId, actor_id: &UserId) -> bool {
    match role {
        Role::Admin => true,
        Role::Leader => actor_id == tour_leader_id,
        Role::Member => false,
    }
}

/// Admins and the leading leader may publish or cancel a tour.
pub fn can_transition_tour(role: Role, tour_leader_id: &UserId, actor_id: &UserId) -> bool {
    match role {
        Role::Admin => true,
        Role::Leader => actor_id == tour_leader_id,
        Role::Member => false,
    }
}

/// Only admins may bring a cancelled tour back to draft.
pub fn can_reopen_tour(role: Role) -> bool {
    role.is_admin()
}

/// Every role may sign up for tours it does not lead.
pub fn can_join_tour(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Leader | Role::Member)
}

/// Only admins manage accounts and invitations.
pub fn can_manage_users(role: Role) -> bool {
    role.is_admin()
}

/// Drafts are visible to their leader and to admins; other tours to everyone.
pub fn can_view_tour(
    role: Role,
    tour_leader_id: &UserId,
    actor_id: &UserId,
    tour_status: TourStatus,
) -> bool {
    tour_status != TourStatus::Draft || role.is_admin() || actor_id == tour_leader_id
}
