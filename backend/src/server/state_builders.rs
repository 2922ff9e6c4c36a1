//! Builders wiring repositories into the HTTP state.

use std::sync::Arc;

use skiclub::domain::ports::{InvitationRepository, TourRepository, UserRepository};
use skiclub::domain::{
    BootstrapAdmin, BootstrapLoginService, InvitationService, TourService, UserAccountService,
};
use skiclub::inbound::http::state::{HttpState, HttpStatePorts};
use skiclub::outbound::memory::MemoryStore;
use skiclub::outbound::notifications::LogNotificationSink;
use skiclub::outbound::persistence::{
    DieselInvitationRepository, DieselTourRepository, DieselUserRepository,
};
use tracing::info;

use super::ServerConfig;

/// Repositories backing one running server.
struct Repositories<U, T, I> {
    users: Arc<U>,
    tours: Arc<T>,
    invitations: Arc<I>,
}

/// Build the services over `repos` and make sure the bootstrap admin exists.
async fn wire<U, T, I>(
    repos: Repositories<U, T, I>,
    admin: BootstrapAdmin,
) -> std::io::Result<HttpState>
where
    U: UserRepository + 'static,
    T: TourRepository + 'static,
    I: InvitationRepository + 'static,
{
    let Repositories {
        users,
        tours,
        invitations,
    } = repos;
    let login = BootstrapLoginService::new(users.clone(), admin);
    let bootstrap = login
        .ensure_admin_exists()
        .await
        .map_err(|err| std::io::Error::other(format!("bootstrap admin: {err}")))?;
    info!(admin = %bootstrap.id(), "bootstrap admin ready");

    let accounts = Arc::new(UserAccountService::new(users.clone()));
    let tour_service = Arc::new(TourService::new(
        tours,
        users,
        Arc::new(LogNotificationSink),
    ));
    Ok(HttpState::new(HttpStatePorts {
        login: Arc::new(login),
        users: accounts.clone(),
        accounts,
        tours: tour_service.clone(),
        tours_query: tour_service,
        invitations: Arc::new(InvitationService::new(invitations)),
    }))
}

/// Build the HTTP state: Diesel adapters when a pool is configured,
/// otherwise the in-memory store.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let admin = config.admin.clone();
    match &config.db_pool {
        Some(pool) => {
            let repos = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                tours: Arc::new(DieselTourRepository::new(pool.clone())),
                invitations: Arc::new(DieselInvitationRepository::new(pool.clone())),
            };
            wire(repos, admin).await
        }
        None => {
            info!("no database configured; club data lives in memory");
            let store = Arc::new(MemoryStore::new());
            let repos = Repositories {
                users: store.clone(),
                tours: store.clone(),
                invitations: store,
            };
            wire(repos, admin).await
        }
    }
}
