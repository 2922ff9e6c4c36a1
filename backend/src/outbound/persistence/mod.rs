//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs (`models.rs`) and the schema (`schema.rs`) stay private to
//! this module. Multi-row invariants (last admin, tour capacity, single-use
//! invitations) are enforced inside transactions with row locks.
//!
//! ```ignore
//! use skiclub::outbound::persistence::{DbPool, DieselTourRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/skiclub")).await?;
//! let tours = DieselTourRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_invitation_repository;
mod diesel_tour_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_invitation_repository::DieselInvitationRepository;
pub use diesel_tour_repository::DieselTourRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
