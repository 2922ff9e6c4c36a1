//! Server construction and middleware wiring.

mod config;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use skiclub::Trace;
#[cfg(debug_assertions)]
use skiclub::doc::ApiDoc;
use skiclub::inbound::http::extractors::{json_config, path_config};
use skiclub::inbound::http::health::{HealthState, live, ready};
use skiclub::inbound::http::invitations::{
    accept_invitation, create_invitation, list_invitations,
};
use skiclub::inbound::http::state::HttpState;
use skiclub::inbound::http::tours::{
    cancel_tour, create_tour, delete_tour, edit_tour, get_tour, join_tour, leave_tour, list_tours,
    publish_tour, reopen_tour,
};
use skiclub::inbound::http::users::{
    change_role, current_user, list_users, login, logout, set_active, update_profile,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .app_data(json_config())
        .app_data(path_config())
        .wrap(session)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(update_profile)
        .service(list_users)
        .service(change_role)
        .service(set_active)
        .service(list_tours)
        .service(create_tour)
        .service(get_tour)
        .service(edit_tour)
        .service(delete_tour)
        .service(publish_tour)
        .service(cancel_tour)
        .service(reopen_tour)
        .service(join_tour)
        .service(leave_tour)
        .service(list_invitations)
        .service(create_invitation)
        .service(accept_invitation);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Wires the club services over the configured store, ensures the bootstrap
/// admin exists, binds the listener and marks the health state ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when the store rejects the bootstrap admin
/// or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config).await?);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        admin: _,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
