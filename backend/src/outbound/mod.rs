//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process store used without a database and in tests
//! - **notifications**: notification sinks

pub mod memory;
pub mod notifications;
pub mod persistence;
