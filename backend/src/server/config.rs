//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use skiclub::domain::BootstrapAdmin;
use skiclub::outbound::persistence::DbPool;
use std::net::SocketAddr;

use super::settings::SessionSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) admin: BootstrapAdmin,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, admin: BootstrapAdmin) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            admin,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one the server keeps all club data in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
