//! Ski-touring club backend.
//!
//! A hexagonal service: [`domain`] holds roles, the tour lifecycle, the
//! permission predicates and the last-admin safeguard; [`inbound::http`]
//! exposes them over session-authenticated REST; [`outbound`] provides the
//! PostgreSQL and in-memory stores plus notification sinks.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
