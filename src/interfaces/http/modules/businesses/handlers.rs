//! Business HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::dto::{BusinessDto, BusinessRequest};
use crate::application::BusinessService;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, EmptyData, PageQuery, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BusinessAppState {
    pub businesses: Arc<BusinessService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses",
    tag = "Businesses",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Every business for admins, the caller's own otherwise", body = ApiResponse<PaginatedResponse<BusinessDto>>)
    )
)]
pub async fn list_businesses(
    State(state): State<BusinessAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<BusinessDto>> {
    let page = state
        .businesses
        .list(user.actor(), query.params())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        BusinessDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/businesses",
    tag = "Businesses",
    security(("bearer_auth" = [])),
    request_body = BusinessRequest,
    responses(
        (status = 201, description = "Business created", body = ApiResponse<BusinessDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_business(
    State(state): State<BusinessAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<BusinessRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BusinessDto>>), ApiError<BusinessDto>> {
    let business = state
        .businesses
        .create(user.actor(), request.into())
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(business.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}",
    tag = "Businesses",
    security(("bearer_auth" = [])),
    params(("business_id" = String, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business details", body = ApiResponse<BusinessDto>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn get_business(
    State(state): State<BusinessAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
) -> ApiResult<BusinessDto> {
    let business = state
        .businesses
        .get(user.actor(), &business_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(business.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/businesses/{business_id}",
    tag = "Businesses",
    security(("bearer_auth" = [])),
    params(("business_id" = String, Path, description = "Business ID")),
    request_body = BusinessRequest,
    responses(
        (status = 200, description = "Business updated", body = ApiResponse<BusinessDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owner or admin role required"),
        (status = 404, description = "Business not found"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn update_business(
    State(state): State<BusinessAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
    ValidatedJson(request): ValidatedJson<BusinessRequest>,
) -> ApiResult<BusinessDto> {
    let business = state
        .businesses
        .update(user.actor(), &business_id, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(business.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{business_id}",
    tag = "Businesses",
    security(("bearer_auth" = [])),
    params(("business_id" = String, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business soft-deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn delete_business(
    State(state): State<BusinessAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .businesses
        .delete(user.actor(), &business_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(EmptyData {})))
}
