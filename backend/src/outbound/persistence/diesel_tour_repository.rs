//! PostgreSQL-backed `TourRepository`.
//!
//! `apply` locks the tour row with `SELECT ... FOR UPDATE`, rebuilds the
//! aggregate, lets the domain apply the change, and writes the result in the
//! same transaction. Concurrent joins queue on the row lock, so capacity
//! holds.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TourRepository, TourRepositoryError};
use crate::domain::{
    Tour, TourChange, TourDetails, TourId, TourRecord, TourStatus, UserId,
};

use super::diesel_helpers::{TxError, map_diesel_error, map_pool_error};
use super::models::{NewParticipantRow, NewTourRow, TourRow, TourUpdate};
use super::pool::DbPool;
use super::schema::{tour_participants, tours};

/// Diesel-backed implementation of the `TourRepository` port.
#[derive(Clone)]
pub struct DieselTourRepository {
    pool: DbPool,
}

impl DieselTourRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: diesel::result::Error) -> TourRepositoryError {
    map_diesel_error(
        error,
        TourRepositoryError::query,
        TourRepositoryError::connection,
    )
}

fn capacity_to_db(capacity: Option<u32>) -> Result<Option<i32>, TourRepositoryError> {
    capacity
        .map(i32::try_from)
        .transpose()
        .map_err(|_| TourRepositoryError::query("max_participants out of range"))
}

/// Participant rows touched by a [`TourChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParticipantWrite {
    Add(UserId),
    Remove(UserId),
    Clear,
    None,
}

impl ParticipantWrite {
    fn for_change(change: &TourChange) -> Self {
        match change {
            TourChange::Join(user_id) => Self::Add(*user_id),
            TourChange::Leave(user_id) => Self::Remove(*user_id),
            TourChange::Reopen => Self::Clear,
            TourChange::Edit(_) | TourChange::Transition(_) => Self::None,
        }
    }
}

pub(super) fn row_to_tour(
    row: TourRow,
    participants: impl IntoIterator<Item = Uuid>,
) -> Result<Tour, TourRepositoryError> {
    let corrupt = |detail: String| TourRepositoryError::query(format!("stored tour {}: {detail}", row.id));
    let status: TourStatus = row.status.parse().map_err(|err| corrupt(format!("{err}")))?;
    let max_participants = row
        .max_participants
        .map(u32::try_from)
        .transpose()
        .map_err(|_| corrupt("negative max_participants".to_owned()))?;
    let details = TourDetails::new(&row.title, row.tour_date, row.description.clone(), max_participants)
        .map_err(|err| corrupt(err.to_string()))?;
    let record = TourRecord {
        id: TourId::from_uuid(row.id),
        leader_id: UserId::from_uuid(row.leader_id),
        details,
        status,
        participants: participants.into_iter().map(UserId::from_uuid).collect::<BTreeSet<_>>(),
    };
    Tour::try_from(record).map_err(|err| corrupt(err.to_string()))
}

async fn load_participants(
    conn: &mut AsyncPgConnection,
    tour_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, diesel::result::Error> {
    let pairs: Vec<(Uuid, Uuid)> = tour_participants::table
        .filter(tour_participants::tour_id.eq_any(tour_ids))
        .order((tour_participants::tour_id.asc(), tour_participants::user_id.asc()))
        .select((tour_participants::tour_id, tour_participants::user_id))
        .load(conn)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (tour_id, user_id) in pairs {
        grouped.entry(tour_id).or_default().push(user_id);
    }
    Ok(grouped)
}

#[async_trait]
impl TourRepository for DieselTourRepository {
    async fn find_by_id(&self, id: &TourId) -> Result<Option<Tour>, TourRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TourRepositoryError::connection))?;
        let row: Option<TourRow> = tours::table
            .filter(tours::id.eq(id.as_uuid()))
            .select(TourRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut participants = load_participants(&mut conn, &[row.id])
            .await
            .map_err(diesel_error)?;
        let members = participants.remove(&row.id).unwrap_or_default();
        row_to_tour(row, members).map(Some)
    }

    async fn list(&self) -> Result<Vec<Tour>, TourRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TourRepositoryError::connection))?;
        let rows: Vec<TourRow> = tours::table
            .order((tours::tour_date.asc(), tours::title.asc(), tours::id.asc()))
            .select(TourRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut participants = load_participants(&mut conn, &ids)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| {
                let members = participants.remove(&row.id).unwrap_or_default();
                row_to_tour(row, members)
            })
            .collect()
    }

    async fn insert(&self, tour: &Tour) -> Result<(), TourRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TourRepositoryError::connection))?;
        let details = tour.details();
        let row = NewTourRow {
            id: *tour.id().as_uuid(),
            leader_id: *tour.leader_id().as_uuid(),
            title: details.title.as_ref(),
            tour_date: details.date,
            description: details.description.as_deref(),
            max_participants: capacity_to_db(details.max_participants)?,
            status: tour.status().as_str(),
        };
        let participants: Vec<NewParticipantRow> = tour
            .participants()
            .iter()
            .map(|user_id| NewParticipantRow {
                tour_id: row.id,
                user_id: *user_id.as_uuid(),
            })
            .collect();

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(tours::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !participants.is_empty() {
                    diesel::insert_into(tour_participants::table)
                        .values(&participants)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn delete(&self, id: &TourId) -> Result<(), TourRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TourRepositoryError::connection))?;
        let deleted = diesel::delete(tours::table.filter(tours::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if deleted == 0 {
            return Err(TourRepositoryError::not_found(*id));
        }
        Ok(())
    }

    async fn apply(
        &self,
        id: &TourId,
        expected_status: Option<TourStatus>,
        change: TourChange,
    ) -> Result<Tour, TourRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, TourRepositoryError::connection))?;
        let tour_id = *id;

        conn.transaction::<Tour, TxError<TourRepositoryError>, _>(|conn| {
            async move {
                let row: Option<TourRow> = tours::table
                    .filter(tours::id.eq(tour_id.as_uuid()))
                    .select(TourRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let row = row.ok_or_else(|| {
                    TxError::Rejected(TourRepositoryError::not_found(tour_id))
                })?;
                let mut participants = load_participants(conn, &[row.id]).await?;
                let members = participants.remove(&row.id).unwrap_or_default();
                let mut tour = row_to_tour(row, members).map_err(TxError::Rejected)?;

                if let Some(expected) = expected_status
                    && tour.status() != expected
                {
                    return Err(TxError::Rejected(TourRepositoryError::status_changed(
                        expected,
                        tour.status(),
                    )));
                }

                let participant_write = ParticipantWrite::for_change(&change);
                change
                    .apply_to(&mut tour)
                    .map_err(|reason| TxError::Rejected(TourRepositoryError::rejected(reason)))?;

                let details = tour.details();
                let update = TourUpdate {
                    title: details.title.as_ref(),
                    tour_date: details.date,
                    description: details.description.as_deref(),
                    max_participants: capacity_to_db(details.max_participants)
                        .map_err(TxError::Rejected)?,
                    status: tour.status().as_str(),
                    updated_at: Utc::now(),
                };
                diesel::update(tours::table.filter(tours::id.eq(tour_id.as_uuid())))
                    .set(&update)
                    .execute(conn)
                    .await?;

                let of_tour = tour_participants::table
                    .filter(tour_participants::tour_id.eq(tour_id.as_uuid()));
                match participant_write {
                    ParticipantWrite::Add(user_id) => {
                        diesel::insert_into(tour_participants::table)
                            .values(&NewParticipantRow {
                                tour_id: *tour_id.as_uuid(),
                                user_id: *user_id.as_uuid(),
                            })
                            .execute(conn)
                            .await?;
                    }
                    ParticipantWrite::Remove(user_id) => {
                        diesel::delete(
                            of_tour.filter(tour_participants::user_id.eq(user_id.as_uuid())),
                        )
                        .execute(conn)
                        .await?;
                    }
                    ParticipantWrite::Clear => {
                        diesel::delete(of_tour).execute(conn).await?;
                    }
                    ParticipantWrite::None => {}
                }
                Ok(tour)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_error(diesel_error))
    }
}
