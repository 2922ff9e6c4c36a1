//! Integration tests for `DieselTourRepository` against embedded PostgreSQL.
//!
//! Every tour change runs under a row lock on the tour; these tests go through
//! `TourService` so capacity and participant bookkeeping are checked where the
//! database enforces them.

use std::sync::Arc;

use chrono::NaiveDate;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use skiclub::domain::ports::{TourCommand, TourRepository, UserRepository};
use skiclub::domain::{
    Actor, DisplayName, ErrorCode, Role, Tour, TourDetails, TourService, TourStatus, User, UserId,
};
use skiclub::outbound::notifications::RecordingNotificationSink;
use skiclub::outbound::persistence::{
    DbPool, DieselTourRepository, DieselUserRepository, PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster_handle};

type Tours = TourService<DieselTourRepository, DieselUserRepository, RecordingNotificationSink>;

struct TestContext {
    runtime: Runtime,
    users: Arc<DieselUserRepository>,
    repository: Arc<DieselTourRepository>,
    tours: Tours,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn seed(&self, name: &str, role: Role) -> Actor {
        let user = User::new(
            UserId::random(),
            DisplayName::new(name).expect("valid name"),
            role,
        );
        let stored = self
            .runtime
            .block_on(self.users.upsert(&user))
            .expect("seed user");
        Actor::new(*stored.id(), stored.role())
    }

    fn published_tour(&self, leader: &Actor, capacity: u32) -> Tour {
        let details = TourDetails::new(
            "Allalinhorn",
            NaiveDate::from_ymd_opt(2026, 3, 21).expect("valid date"),
            None,
            Some(capacity),
        )
        .expect("valid details");
        self.runtime.block_on(async {
            let tour = self
                .tours
                .create_tour(leader, details)
                .await
                .expect("create draft");
            self.tours
                .publish_tour(leader, tour.id())
                .await
                .expect("publish")
        })
    }

    fn stored(&self, tour: &Tour) -> Tour {
        self.runtime
            .block_on(self.repository.find_by_id(tour.id()))
            .expect("load tour")
            .expect("tour exists")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster)?;

    let database_url = temp_db.url().to_string();
    let config = PoolConfig::new(database_url)
        .with_max_size(4)
        .with_min_idle(Some(2));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let repository = Arc::new(DieselTourRepository::new(pool));

    Ok(TestContext {
        runtime,
        tours: TourService::new(
            repository.clone(),
            users.clone(),
            Arc::new(RecordingNotificationSink::new()),
        ),
        users,
        repository,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn joins_beyond_capacity_are_rejected(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: joins_beyond_capacity_are_rejected skipped");
        return;
    };
    let leader = context.seed("Lea Brunner", Role::Leader);
    let first = context.seed("Max Muster", Role::Member);
    let second = context.seed("Nina Keller", Role::Member);
    let tour = context.published_tour(&leader, 1);

    let (a, b) = context.runtime.block_on(async {
        tokio::join!(
            context.tours.join_tour(&first, tour.id()),
            context.tours.join_tour(&second, tour.id()),
        )
    });

    let outcomes = [a, b];
    assert_eq!(
        outcomes.iter().filter(|outcome| outcome.is_ok()).count(),
        1,
        "only one place was free"
    );
    let refused = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one join fails");
    assert_eq!(refused.code(), ErrorCode::Conflict);

    let stored = context.stored(&tour);
    assert_eq!(stored.participants().len(), 1);
    assert!(stored.is_full());
}

#[rstest]
fn reopening_clears_stored_participants(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: reopening_clears_stored_participants skipped");
        return;
    };
    let admin = context.seed("Club Admin", Role::Admin);
    let leader = context.seed("Lea Brunner", Role::Leader);
    let member = context.seed("Max Muster", Role::Member);
    let tour = context.published_tour(&leader, 4);

    context.runtime.block_on(async {
        context
            .tours
            .join_tour(&member, tour.id())
            .await
            .expect("join");
        context
            .tours
            .cancel_tour(&leader, tour.id())
            .await
            .expect("cancel");
        context
            .tours
            .reopen_tour(&admin, tour.id())
            .await
            .expect("reopen");
    });

    let stored = context.stored(&tour);
    assert_eq!(stored.status(), TourStatus::Draft);
    assert!(stored.participants().is_empty());
}
