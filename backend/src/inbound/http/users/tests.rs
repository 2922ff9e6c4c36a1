//! Tests for session and account handlers.

use super::*;
use crate::domain::Role;
use crate::inbound::http::extractors;
use crate::inbound::http::test_utils::{
    ADMIN_PASSWORD, ADMIN_USERNAME, TestWorld, session_cookie, test_session_middleware,
    test_session_route,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

fn test_app(
    world: &TestWorld,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(world.state.clone()))
        .app_data(extractors::json_config())
        .app_data(extractors::path_config())
        .wrap(test_session_middleware())
        .route("/test-session/{id}", web::post().to(test_session_route))
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(logout)
                .service(current_user)
                .service(update_profile)
                .service(list_users)
                .service(change_role)
                .service(set_active),
        )
}

async fn body_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

#[rstest]
#[case("   ", "secret", "username must not be empty", "empty_username")]
#[case("admin", "", "password must not be empty", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] message: &str,
    #[case] detail_code: &str,
) {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert_eq!(value.pointer("/error/message").and_then(Value::as_str), Some(message));
    assert_eq!(
        value.pointer("/error/details/code").and_then(Value::as_str),
        Some(detail_code)
    );
}

#[actix_web::test]
async fn login_rejects_wrong_password() {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: ADMIN_USERNAME.into(),
            password: "wrong-password".into(),
        })
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value = body_json(response).await;
    assert_eq!(value["success"], false);
    assert_eq!(value.pointer("/error/code").and_then(Value::as_str), Some("unauthorized"));
}

#[actix_web::test]
async fn login_then_me_returns_the_admin() {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;

    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(&LoginRequest {
                username: ADMIN_USERNAME.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(login_res.status(), StatusCode::OK);
    let cookie = login_res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let value = body_json(me).await;
    assert_eq!(value["success"], true);
    assert_eq!(value.pointer("/data/role").and_then(Value::as_str), Some("admin"));
    assert_eq!(
        value.pointer("/data/displayName").and_then(Value::as_str),
        Some("Club Admin")
    );
}

#[actix_web::test]
async fn roster_requires_a_session() {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn members_see_the_roster_but_cannot_change_roles() {
    let world = TestWorld::new().await;
    let member = world.seed_user("Max Muster", Role::Member).await;
    let app = actix_test::init_service(test_app(&world)).await;
    let cookie = session_cookie(&app, member.id()).await;

    let roster = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(roster.status(), StatusCode::OK);
    let value = body_json(roster).await;
    assert_eq!(value["data"].as_array().map(Vec::len), Some(2));

    let promote = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", member.id()))
            .cookie(cookie)
            .set_json(&ChangeRoleRequest {
                role: "admin".to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(promote.status(), StatusCode::FORBIDDEN);
    let value = body_json(promote).await;
    assert_eq!(
        value.pointer("/error/code").and_then(Value::as_str),
        Some("permission_denied")
    );
}

#[actix_web::test]
async fn sole_admin_cannot_demote_themselves() {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;
    let cookie = session_cookie(&app, world.admin.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", world.admin.id()))
            .cookie(cookie)
            .set_json(&ChangeRoleRequest {
                role: "member".to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value = body_json(response).await;
    assert_eq!(
        value.pointer("/error/code").and_then(Value::as_str),
        Some("last_admin_violation")
    );
}

#[actix_web::test]
async fn unknown_roles_are_bad_requests() {
    let world = TestWorld::new().await;
    let member = world.seed_user("Max Muster", Role::Member).await;
    let app = actix_test::init_service(test_app(&world)).await;
    let cookie = session_cookie(&app, world.admin.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", member.id()))
            .cookie(cookie)
            .set_json(&ChangeRoleRequest {
                role: "owner".to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deactivated_members_lose_access() {
    let world = TestWorld::new().await;
    let member = world.seed_user("Max Muster", Role::Member).await;
    let app = actix_test::init_service(test_app(&world)).await;
    let admin_cookie = session_cookie(&app, world.admin.id()).await;
    let member_cookie = session_cookie(&app, member.id()).await;

    let deactivate = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/active", member.id()))
            .cookie(admin_cookie)
            .set_json(&SetActiveRequest { active: false })
            .to_request(),
    )
    .await;
    assert_eq!(deactivate.status(), StatusCode::OK);

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(member_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("Lea Brunner", StatusCode::OK)]
#[case("x", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn profile_updates_validate_the_name(#[case] name: &str, #[case] status: StatusCode) {
    let world = TestWorld::new().await;
    let member = world.seed_user("Max Muster", Role::Member).await;
    let app = actix_test::init_service(test_app(&world)).await;
    let cookie = session_cookie(&app, member.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .set_json(&UpdateProfileRequest {
                display_name: name.to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), status);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let world = TestWorld::new().await;
    let app = actix_test::init_service(test_app(&world)).await;
    let cookie = session_cookie(&app, world.admin.id()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let removal = response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("removal cookie");
    assert_eq!(removal.value(), "");
}
