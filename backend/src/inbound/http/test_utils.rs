//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test as actix_test;
use zeroize::Zeroizing;

use crate::domain::{
    BootstrapAdmin, BootstrapLoginService, DisplayName, InvitationService, Role, TourService,
    User, UserAccountService, UserId,
};
use crate::outbound::memory::MemoryStore;
use crate::outbound::notifications::RecordingNotificationSink;

use super::state::{HttpState, HttpStatePorts};

pub(crate) const ADMIN_USERNAME: &str = "admin";
pub(crate) const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Session middleware with a fresh key per invocation and the `Secure` flag
/// off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Real services over a shared in-memory store.
pub(crate) struct TestWorld {
    pub store: MemoryStore,
    pub sink: RecordingNotificationSink,
    pub admin: User,
    pub state: HttpState,
}

impl TestWorld {
    pub(crate) async fn new() -> Self {
        let store = MemoryStore::new();
        let sink = RecordingNotificationSink::new();
        let admin = BootstrapAdmin {
            id: UserId::random(),
            display_name: DisplayName::new("Club Admin").expect("valid name"),
            username: ADMIN_USERNAME.to_owned(),
            password: Zeroizing::new(ADMIN_PASSWORD.to_owned()),
        };
        let shared = Arc::new(store.clone());
        let login = BootstrapLoginService::new(shared.clone(), admin);
        let admin = login.ensure_admin_exists().await.expect("admin seeded");
        let accounts = Arc::new(UserAccountService::new(shared.clone()));
        let tours = Arc::new(TourService::new(
            shared.clone(),
            shared.clone(),
            Arc::new(sink.clone()),
        ));
        let state = HttpState::new(HttpStatePorts {
            login: Arc::new(login),
            users: accounts.clone(),
            accounts,
            tours: tours.clone(),
            tours_query: tours,
            invitations: Arc::new(InvitationService::new(shared)),
        });
        Self {
            store,
            sink,
            admin,
            state,
        }
    }

    /// Add an active account straight into the store.
    pub(crate) async fn seed_user(&self, name: &str, role: Role) -> User {
        use crate::domain::ports::UserRepository;

        let user = User::new(
            UserId::random(),
            DisplayName::new(name).expect("valid name"),
            role,
        );
        self.store.upsert(&user).await.expect("seed user")
    }
}

/// Build a cookie that authenticates as `user_id`.
///
/// Signs in through a throwaway route on the same app, so the cookie is
/// encrypted with the app's session key.
pub(crate) async fn session_cookie<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri(&format!("/test-session/{user_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "test session route missing");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Route used by [`session_cookie`]; register it on test apps.
pub(crate) async fn test_session_route(
    session: super::session::SessionContext,
    path: actix_web::web::Path<String>,
) -> super::ApiResult<actix_web::HttpResponse> {
    let id = UserId::new(path.into_inner()).map_err(|err| {
        crate::domain::Error::invalid_request(format!("bad test user id: {err}"))
    })?;
    session.persist_user(&id)?;
    Ok(actix_web::HttpResponse::Ok().finish())
}
