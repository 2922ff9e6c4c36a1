//! Success envelope shared by every JSON endpoint.
//!
//! Failures use the matching `{"success": false, "error": …}` body written by
//! the [`ResponseError`](actix_web::ResponseError) impl in `error.rs`.

use actix_web::web;
use serde::Serialize;
use utoipa::ToSchema;

/// `{"success": true, "data": …}`
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> web::Json<Self> {
        web::Json(Self {
            success: true,
            data,
        })
    }
}
