//! Extractor configuration routing body and path failures through the
//! domain error, so malformed requests still receive the failure envelope.

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::Error;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("request body is not valid")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("request path is not valid")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// JSON body extractor settings for every API route.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Path extractor settings for every API route.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, post, test as actix_test};
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize)]
    struct Body {
        count: u8,
    }

    #[post("/count/{n}")]
    async fn count(path: web::Path<u8>, body: web::Json<Body>) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}/{}", body.count, path.into_inner()))
    }

    #[rstest]
    #[case("/count/1", r#"{"count":300}"#)]
    #[case("/count/1", "not json")]
    #[case("/count/x", r#"{"count":3}"#)]
    #[actix_web::test]
    async fn extractor_failures_use_the_envelope(#[case] uri: &str, #[case] body: &'static str) {
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(path_config())
                .service(count),
        )
        .await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(("content-type", "application/json"))
                .set_payload(body)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["details"]["reason"].is_string());
    }
}
