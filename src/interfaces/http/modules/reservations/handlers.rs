//! Reservation HTTP handlers
//!
//! Every route lives under `/api/v1/businesses/{business_id}`. The caller's
//! business must match the path (403 otherwise); ids owned by another
//! business answer 404.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::dto::*;
use crate::application::ReservationService;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub reservations: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/businesses/{business_id}/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("business_id" = String, Path, description = "Business ID")),
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid range, guest count or contact"),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Business or resource not found"),
        (status = 409, description = "Resource already booked for that time")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationDto>>), ApiError<ReservationDto>> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let reservation = state
        .reservations
        .create(&business_id, request.into())
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ReservationListQuery
    ),
    responses(
        (status = 200, description = "Reservations of the business", body = ApiResponse<PaginatedResponse<ReservationDto>>),
        (status = 400, description = "Bad filter"),
        (status = 403, description = "Caller belongs to another business")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
    Query(query): Query<ReservationListQuery>,
) -> ApiResult<PaginatedResponse<ReservationDto>> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;
    let filter = query.filter().map_err(domain_error)?;

    let page = state
        .reservations
        .list(&business_id, filter, query.pagination())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        ReservationDto::from,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, reservation_id)): Path<(String, String)>,
) -> ApiResult<ReservationDto> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let reservation = state
        .reservations
        .get(&business_id, &reservation_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/businesses/{business_id}/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid range, guest count or contact"),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Reservation not found or cancelled"),
        (status = 409, description = "New slot is already booked")
    )
)]
pub async fn update_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, reservation_id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> ApiResult<ReservationDto> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let reservation = state
        .reservations
        .update(&business_id, &reservation_id, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/businesses/{business_id}/reservations/{reservation_id}/confirm",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation confirmed", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Reservation not found or cancelled")
    )
)]
pub async fn confirm_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, reservation_id)): Path<(String, String)>,
) -> ApiResult<ReservationDto> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let reservation = state
        .reservations
        .confirm(&business_id, &reservation_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/businesses/{business_id}/reservations/{reservation_id}/cancel",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation cancelled (idempotent)", body = ApiResponse<CancelReservationResponse>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, reservation_id)): Path<(String, String)>,
) -> ApiResult<CancelReservationResponse> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let outcome = state
        .reservations
        .cancel(&business_id, &reservation_id)
        .await
        .map_err(domain_error)?;

    let already_cancelled = outcome.was_already_cancelled();
    Ok(Json(ApiResponse::success(CancelReservationResponse {
        reservation: outcome.into_reservation().into(),
        already_cancelled,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{business_id}/reservations/{reservation_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation soft-deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_reservation(
    State(state): State<ReservationAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, reservation_id)): Path<(String, String)>,
) -> ApiResult<EmptyData> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    state
        .reservations
        .delete(&business_id, &reservation_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(EmptyData {})))
}
