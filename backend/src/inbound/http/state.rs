//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be exercised against the in-memory store or mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    InvitationCommand, LoginService, TourCommand, TourQuery, UserAccountCommand, UsersQuery,
};

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub tours: Arc<dyn TourCommand>,
    pub tours_query: Arc<dyn TourQuery>,
    pub invitations: Arc<dyn InvitationCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub tours: Arc<dyn TourCommand>,
    pub tours_query: Arc<dyn TourQuery>,
    pub invitations: Arc<dyn InvitationCommand>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            accounts,
            tours,
            tours_query,
            invitations,
        } = ports;
        Self {
            login,
            users,
            accounts,
            tours,
            tours_query,
            invitations,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
