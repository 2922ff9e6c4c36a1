//! HTTP inbound adapter exposing the club's REST endpoints.
//!
//! Handlers stay thin: they resolve the session actor, parse request bodies
//! into domain values, call a driving port, and wrap the result in the
//! success envelope.

pub mod dto;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod health;
pub mod invitations;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tours;
pub mod users;

pub use error::ApiResult;
