//! Tour handlers.
//!
//! Every route requires a session. Handlers resolve the actor, parse the path
//! and body into domain values, and delegate to the tour ports; permission and
//! lifecycle rules live in the domain.
//!
//! ```text
//! POST /api/v1/tours {"title":"Piz Palü","date":"2026-02-14","maxParticipants":8}
//! POST /api/v1/tours/{id}/publish
//! POST /api/v1/tours/{id}/participants
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;

use crate::domain::{Error, TourDetails, TourId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{TourDto, TourRequest};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorEnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub(crate) fn parse_tour_id(raw: &str) -> Result<TourId, Error> {
    TourId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "id", "value": raw }))
    })
}

/// Tours visible to the caller, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/tours",
    responses(
        (status = 200, description = "Tours", body = Envelope<Vec<TourDto>>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "listTours"
)]
#[get("/tours")]
pub async fn list_tours(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Envelope<Vec<TourDto>>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tours = state.tours_query.list_tours(&actor).await?;
    Ok(Envelope::ok(tours.iter().map(TourDto::from).collect()))
}

/// Create a draft tour led by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/tours",
    request_body = TourRequest,
    responses(
        (status = 201, description = "Created draft", body = Envelope<TourDto>),
        (status = 400, description = "Invalid tour", body = ErrorEnvelopeSchema),
        (status = 401, description = "Unauthorised", body = ErrorEnvelopeSchema),
        (status = 403, description = "Members cannot create tours", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "createTour"
)]
#[post("/tours")]
pub async fn create_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TourRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.actor(state.users.as_ref()).await?;
    let details = TourDetails::try_from(payload.into_inner())?;
    let tour = state.tours.create_tour(&actor, details).await?;
    Ok(HttpResponse::Created().json(Envelope {
        success: true,
        data: TourDto::from(tour),
    }))
}

/// A single tour.
#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Tour", body = Envelope<TourDto>),
        (status = 404, description = "Unknown or hidden tour", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "getTour"
)]
#[get("/tours/{id}")]
pub async fn get_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours_query.get_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Replace a tour's details.
#[utoipa::path(
    patch,
    path = "/api/v1/tours/{id}",
    params(("id" = String, Path, description = "Tour id")),
    request_body = TourRequest,
    responses(
        (status = 200, description = "Updated tour", body = Envelope<TourDto>),
        (status = 400, description = "Invalid tour", body = ErrorEnvelopeSchema),
        (status = 403, description = "Not allowed to edit", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown tour", body = ErrorEnvelopeSchema),
        (status = 409, description = "Capacity below sign-ups or concurrent change", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "editTour"
)]
#[patch("/tours/{id}")]
pub async fn edit_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TourRequest>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let details = TourDetails::try_from(payload.into_inner())?;
    let tour = state.tours.edit_tour(&actor, &tour_id, details).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Delete a tour and its sign-ups.
#[utoipa::path(
    delete,
    path = "/api/v1/tours/{id}",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not allowed to delete", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown tour", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "deleteTour"
)]
#[delete("/tours/{id}")]
pub async fn delete_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    state.tours.delete_tour(&actor, &tour_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Move a draft tour to published.
#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/publish",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Published tour", body = Envelope<TourDto>),
        (status = 403, description = "Not allowed", body = ErrorEnvelopeSchema),
        (status = 409, description = "Not a draft", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "publishTour"
)]
#[post("/tours/{id}/publish")]
pub async fn publish_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours.publish_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Cancel a draft or published tour.
#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/cancel",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Cancelled tour", body = Envelope<TourDto>),
        (status = 403, description = "Not allowed", body = ErrorEnvelopeSchema),
        (status = 409, description = "Already cancelled", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "cancelTour"
)]
#[post("/tours/{id}/cancel")]
pub async fn cancel_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours.cancel_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Return a cancelled tour to draft. Admins only.
#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/reopen",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Draft tour", body = Envelope<TourDto>),
        (status = 403, description = "Not an admin", body = ErrorEnvelopeSchema),
        (status = 409, description = "Not cancelled", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "reopenTour"
)]
#[post("/tours/{id}/reopen")]
pub async fn reopen_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours.reopen_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Sign the caller up for a published tour.
#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/participants",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Tour with the new sign-up", body = Envelope<TourDto>),
        (status = 400, description = "Tour not open or caller leads it", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown tour", body = ErrorEnvelopeSchema),
        (status = 409, description = "Full or already joined", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "joinTour"
)]
#[post("/tours/{id}/participants")]
pub async fn join_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours.join_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

/// Withdraw the caller's sign-up.
#[utoipa::path(
    delete,
    path = "/api/v1/tours/{id}/participants",
    params(("id" = String, Path, description = "Tour id")),
    responses(
        (status = 200, description = "Tour without the caller", body = Envelope<TourDto>),
        (status = 400, description = "Caller is not signed up", body = ErrorEnvelopeSchema),
        (status = 404, description = "Unknown tour", body = ErrorEnvelopeSchema)
    ),
    tags = ["tours"],
    operation_id = "leaveTour"
)]
#[delete("/tours/{id}/participants")]
pub async fn leave_tour(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TourDto>>> {
    let actor = session.actor(state.users.as_ref()).await?;
    let tour_id = parse_tour_id(&path)?;
    let tour = state.tours.leave_tour(&actor, &tour_id).await?;
    Ok(Envelope::ok(TourDto::from(tour)))
}

#[cfg(test)]
#[path = "tours_tests.rs"]
mod tests;
