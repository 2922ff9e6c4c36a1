//! Last-admin safeguard.
//!
//! The club must always keep at least one active administrator. Adapters call
//! [`check_account_change`] while holding whatever lock or transaction makes
//! the admin count and the write atomic.

use std::fmt;

use super::{LAST_ADMIN_MESSAGE, Role, User};

/// Admin-controlled mutation of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    /// Replace the account's role.
    Role(Role),
    /// Activate (`true`) or deactivate (`false`) the account.
    Active(bool),
}

impl AccountChange {
    /// Apply the change to a copy of `user`.
    #[must_use]
    pub fn apply(self, user: User) -> User {
        match self {
            Self::Role(role) => user.with_role(role),
            Self::Active(active) => user.with_active(active),
        }
    }

    /// Whether applying the change takes `user` out of the active admin set.
    pub fn removes_active_admin(self, user: &User) -> bool {
        if !user.is_active_admin() {
            return false;
        }
        match self {
            Self::Role(role) => !role.is_admin(),
            Self::Active(active) => !active,
        }
    }
}

/// Refusal raised when a change would leave the club without an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastAdminViolation;

impl fmt::Display for LastAdminViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(LAST_ADMIN_MESSAGE)
    }
}

impl std::error::Error for LastAdminViolation {}

/// Check `change` against the number of other active admins.
///
/// `other_active_admins` must exclude `target` itself.
///
/// # Examples
/// ```
/// use skiclub::domain::{AccountChange, DisplayName, Role, User, UserId, check_account_change};
///
/// let admin = User::new(
///     UserId::random(),
///     DisplayName::new("Only Admin").expect("valid name"),
///     Role::Admin,
/// );
/// assert!(check_account_change(&admin, AccountChange::Role(Role::Member), 0).is_err());
/// assert!(check_account_change(&admin, AccountChange::Role(Role::Member), 1).is_ok());
/// ```
pub fn check_account_change(
    target: &User,
    change: AccountChange,
    other_active_admins: usize,
) -> Result<(), LastAdminViolation> {
    if change.removes_active_admin(target) && other_active_admins == 0 {
        return Err(LastAdminViolation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, UserId};
    use rstest::rstest;

    fn user(role: Role, active: bool) -> User {
        let name = DisplayName::new("Guide Test").expect("valid name");
        User::new(UserId::random(), name, role).with_active(active)
    }

    #[rstest]
    #[case(AccountChange::Role(Role::Leader))]
    #[case(AccountChange::Role(Role::Member))]
    #[case(AccountChange::Active(false))]
    fn sole_admin_cannot_be_removed(#[case] change: AccountChange) {
        assert_eq!(
            check_account_change(&user(Role::Admin, true), change, 0),
            Err(LastAdminViolation)
        );
    }

    #[rstest]
    #[case(AccountChange::Role(Role::Member))]
    #[case(AccountChange::Active(false))]
    fn second_admin_allows_removal(#[case] change: AccountChange) {
        assert!(check_account_change(&user(Role::Admin, true), change, 1).is_ok());
    }

    #[rstest]
    #[case(user(Role::Admin, true), AccountChange::Role(Role::Admin))]
    #[case(user(Role::Admin, true), AccountChange::Active(true))]
    #[case(user(Role::Admin, false), AccountChange::Role(Role::Member))]
    #[case(user(Role::Leader, true), AccountChange::Active(false))]
    #[case(user(Role::Member, true), AccountChange::Role(Role::Leader))]
    fn changes_that_keep_the_admin_set_pass(#[case] target: User, #[case] change: AccountChange) {
        assert!(check_account_change(&target, change, 0).is_ok());
    }

    #[test]
    fn violation_uses_shared_message() {
        assert_eq!(LastAdminViolation.to_string(), LAST_ADMIN_MESSAGE);
    }

    #[test]
    fn apply_updates_the_copy() {
        let promoted = AccountChange::Role(Role::Admin).apply(user(Role::Member, true));
        assert_eq!(promoted.role(), Role::Admin);
        let disabled = AccountChange::Active(false).apply(promoted);
        assert!(!disabled.is_active());
    }
}
