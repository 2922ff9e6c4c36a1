//! PostgreSQL-backed `UserRepository`.
//!
//! `update_account` locks every active admin row plus the target inside one
//! transaction before counting, so concurrent demotions serialise on those
//! row locks and cannot both pass the last-admin check.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{AccountChange, DisplayName, Role, User, UserId, check_account_change};

use super::diesel_helpers::{TxError, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

pub(super) fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|err| UserRepositoryError::query(format!("stored user {}: {err}", row.id)))?;
    let display_name = DisplayName::new(row.display_name)
        .map_err(|err| UserRepositoryError::query(format!("stored user {}: {err}", row.id)))?;
    Ok(User::new(UserId::from_uuid(row.id), display_name, role).with_active(row.is_active))
}

pub(super) fn new_user_row(user: &User) -> NewUserRow<'_> {
    NewUserRow {
        id: *user.id().as_uuid(),
        display_name: user.display_name().as_ref(),
        role: user.role().as_str(),
        is_active: user.is_active(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let rows: Vec<UserRow> = users::table
            .order((users::display_name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn active_user_ids(&self) -> Result<Vec<UserId>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let ids: Vec<uuid::Uuid> = users::table
            .filter(users::is_active.eq(true))
            .select(users::id)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn upsert(&self, user: &User) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_user_row(user))
            .on_conflict(users::id)
            .do_update()
            .set((
                users::display_name.eq(excluded(users::display_name)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_user(row)
    }

    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: &DisplayName,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let row: Option<UserRow> = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::display_name.eq(display_name.as_ref()),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user)
            .transpose()?
            .ok_or_else(|| UserRepositoryError::not_found(*id))
    }

    async fn update_account(
        &self,
        id: &UserId,
        change: AccountChange,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;
        let target = *id;

        conn.transaction::<User, TxError<UserRepositoryError>, _>(|conn| {
            async move {
                let locked: Vec<UserRow> = users::table
                    .filter(
                        users::id.eq(target.as_uuid()).or(users::role
                            .eq(Role::Admin.as_str())
                            .and(users::is_active.eq(true))),
                    )
                    .order(users::id.asc())
                    .select(UserRow::as_select())
                    .for_update()
                    .load(conn)
                    .await?;

                let mut current = None;
                let mut other_admins = 0;
                for row in locked {
                    let user = row_to_user(row).map_err(TxError::Rejected)?;
                    if user.id() == &target {
                        current = Some(user);
                    } else if user.is_active_admin() {
                        other_admins += 1;
                    }
                }
                let current = current
                    .ok_or_else(|| TxError::Rejected(UserRepositoryError::not_found(target)))?;
                check_account_change(&current, change, other_admins)
                    .map_err(|_| TxError::Rejected(UserRepositoryError::last_admin()))?;

                let updated = change.apply(current);
                let row: UserRow =
                    diesel::update(users::table.filter(users::id.eq(target.as_uuid())))
                        .set((
                            users::role.eq(updated.role().as_str()),
                            users::is_active.eq(updated.is_active()),
                            users::updated_at.eq(Utc::now()),
                        ))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                row_to_user(row).map_err(TxError::Rejected)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_error(diesel_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(role: &str, display_name: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            display_name: display_name.to_owned(),
            role: role.to_owned(),
            is_active: false,
        }
    }

    #[rstest]
    fn rows_convert_to_users() {
        let user = row_to_user(row("leader", "Mia Graf")).expect("valid row");
        assert_eq!(user.role(), Role::Leader);
        assert!(!user.is_active());
    }

    #[rstest]
    #[case("superuser", "Mia Graf")]
    #[case("member", "x")]
    fn corrupt_rows_are_query_errors(#[case] role: &str, #[case] name: &str) {
        let err = row_to_user(row(role, name)).expect_err("corrupt row");
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn new_rows_mirror_the_user() {
        let user = User::new(
            UserId::random(),
            DisplayName::new("Mia Graf").expect("valid"),
            Role::Admin,
        );
        let row = new_user_row(&user);
        assert_eq!(row.role, "admin");
        assert_eq!(row.display_name, "Mia Graf");
        assert!(row.is_active);
    }
}
