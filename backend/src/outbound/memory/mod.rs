//! In-process store implementing the user, tour, and invitation ports.
//!
//! Every repository call takes the same mutex for its whole duration, which
//! makes the last-admin count, capacity checks, and invitation acceptance
//! atomic. Used when no database URL is configured and in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    InvitationRepository, InvitationRepositoryError, TourRepository, TourRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    AccountChange, DisplayName, Invitation, InvitationToken, Tour, TourChange, TourId,
    TourStatus, User, UserId, check_account_change,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    tours: HashMap<TourId, Tour>,
    invitations: HashMap<InvitationToken, Invitation>,
}

impl State {
    fn active_admins_except(&self, id: &UserId) -> usize {
        self.users
            .values()
            .filter(|user| user.id() != id && user.is_active_admin())
            .count()
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, State>> {
        self.state.lock().ok()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        Ok(state.users.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.display_name()
                .as_ref()
                .cmp(b.display_name().as_ref())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(users)
    }

    async fn active_user_ids(&self) -> Result<Vec<UserId>, UserRepositoryError> {
        let state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        Ok(state
            .users
            .values()
            .filter(|user| user.is_active())
            .map(|user| *user.id())
            .collect())
    }

    async fn upsert(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        let stored = match state.users.remove(user.id()) {
            Some(existing) => existing.with_display_name(user.display_name().clone()),
            None => user.clone(),
        };
        state.users.insert(*stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: &DisplayName,
    ) -> Result<User, UserRepositoryError> {
        let mut state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserRepositoryError::not_found(*id))?;
        *user = user.clone().with_display_name(display_name.clone());
        Ok(user.clone())
    }

    async fn update_account(
        &self,
        id: &UserId,
        change: AccountChange,
    ) -> Result<User, UserRepositoryError> {
        let mut state = self.lock().ok_or_else(|| UserRepositoryError::query(POISONED))?;
        let others = state.active_admins_except(id);
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserRepositoryError::not_found(*id))?;
        check_account_change(user, change, others).map_err(|_| UserRepositoryError::last_admin())?;
        *user = change.apply(user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl TourRepository for MemoryStore {
    async fn find_by_id(&self, id: &TourId) -> Result<Option<Tour>, TourRepositoryError> {
        let state = self.lock().ok_or_else(|| TourRepositoryError::query(POISONED))?;
        Ok(state.tours.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Tour>, TourRepositoryError> {
        let state = self.lock().ok_or_else(|| TourRepositoryError::query(POISONED))?;
        let mut tours: Vec<Tour> = state.tours.values().cloned().collect();
        tours.sort_by(|a, b| {
            a.details()
                .date
                .cmp(&b.details().date)
                .then_with(|| a.details().title.as_ref().cmp(b.details().title.as_ref()))
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(tours)
    }

    async fn insert(&self, tour: &Tour) -> Result<(), TourRepositoryError> {
        let mut state = self.lock().ok_or_else(|| TourRepositoryError::query(POISONED))?;
        state.tours.insert(*tour.id(), tour.clone());
        Ok(())
    }

    async fn delete(&self, id: &TourId) -> Result<(), TourRepositoryError> {
        let mut state = self.lock().ok_or_else(|| TourRepositoryError::query(POISONED))?;
        state
            .tours
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TourRepositoryError::not_found(*id))
    }

    async fn apply(
        &self,
        id: &TourId,
        expected_status: Option<TourStatus>,
        change: TourChange,
    ) -> Result<Tour, TourRepositoryError> {
        let mut state = self.lock().ok_or_else(|| TourRepositoryError::query(POISONED))?;
        let stored = state
            .tours
            .get_mut(id)
            .ok_or_else(|| TourRepositoryError::not_found(*id))?;
        if let Some(expected) = expected_status
            && stored.status() != expected
        {
            return Err(TourRepositoryError::status_changed(expected, stored.status()));
        }
        let mut updated = stored.clone();
        change
            .apply_to(&mut updated)
            .map_err(TourRepositoryError::rejected)?;
        *stored = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| InvitationRepositoryError::query(POISONED))?;
        state
            .invitations
            .insert(invitation.token, invitation.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Invitation>, InvitationRepositoryError> {
        let state = self
            .lock()
            .ok_or_else(|| InvitationRepositoryError::query(POISONED))?;
        let mut invitations: Vec<Invitation> = state.invitations.values().cloned().collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn accept(
        &self,
        token: &InvitationToken,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(Invitation, User), InvitationRepositoryError> {
        let mut state = self
            .lock()
            .ok_or_else(|| InvitationRepositoryError::query(POISONED))?;
        let invitation = state
            .invitations
            .get_mut(token)
            .ok_or_else(|| InvitationRepositoryError::not_found(*token))?;
        let created = user.clone().with_role(invitation.role);
        invitation
            .accept(*created.id(), now)
            .map_err(InvitationRepositoryError::rejected)?;
        let accepted = invitation.clone();
        state.users.insert(*created.id(), created.clone());
        Ok((accepted, created))
    }
}
