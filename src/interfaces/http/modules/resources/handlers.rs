//! Resource HTTP handlers
//!
//! Reads need access to the business; writes need owner rights.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::dto::*;
use crate::application::ResourceService;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ResourceAppState {
    pub resources: Arc<ResourceService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}/resources",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ResourceListQuery
    ),
    responses(
        (status = 200, description = "Tables and rooms", body = ApiResponse<PaginatedResponse<ResourceDto>>),
        (status = 400, description = "Unknown kind"),
        (status = 403, description = "Caller belongs to another business")
    )
)]
pub async fn list_resources(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
    Query(query): Query<ResourceListQuery>,
) -> ApiResult<PaginatedResponse<ResourceDto>> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;
    let kind = query.kind().map_err(domain_error)?;

    let page = state
        .resources
        .list(&business_id, kind, query.pagination())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        ResourceDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/businesses/{business_id}/resources",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(("business_id" = String, Path, description = "Business ID")),
    request_body = ResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = ApiResponse<ResourceDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owner or admin role required"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn create_resource(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(business_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ResourceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ResourceDto>>), ApiError<ResourceDto>> {
    user.actor().authorize_management(&business_id).map_err(domain_error)?;
    let draft = request.into_draft().map_err(domain_error)?;

    let resource = state
        .resources
        .create(&business_id, draft)
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(resource.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}/resources/{resource_id}",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("resource_id" = String, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource details", body = ApiResponse<ResourceDto>),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, resource_id)): Path<(String, String)>,
) -> ApiResult<ResourceDto> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let resource = state
        .resources
        .get(&business_id, &resource_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(resource.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/businesses/{business_id}/resources/{resource_id}",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("resource_id" = String, Path, description = "Resource ID")
    ),
    request_body = ResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = ApiResponse<ResourceDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owner or admin role required"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn update_resource(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, resource_id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<ResourceRequest>,
) -> ApiResult<ResourceDto> {
    user.actor().authorize_management(&business_id).map_err(domain_error)?;
    let draft = request.into_draft().map_err(domain_error)?;

    let resource = state
        .resources
        .update(&business_id, &resource_id, draft)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(resource.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{business_id}/resources/{resource_id}",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("resource_id" = String, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource soft-deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Owner or admin role required"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn delete_resource(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, resource_id)): Path<(String, String)>,
) -> ApiResult<EmptyData> {
    user.actor().authorize_management(&business_id).map_err(domain_error)?;

    state
        .resources
        .delete(&business_id, &resource_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/v1/businesses/{business_id}/resources/{resource_id}/availability",
    tag = "Resources",
    security(("bearer_auth" = [])),
    params(
        ("business_id" = String, Path, description = "Business ID"),
        ("resource_id" = String, Path, description = "Resource ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Whether the slot is free", body = ApiResponse<AvailabilityDto>),
        (status = 400, description = "End not after start"),
        (status = 403, description = "Caller belongs to another business"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn resource_availability(
    State(state): State<ResourceAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((business_id, resource_id)): Path<(String, String)>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<AvailabilityDto> {
    user.actor().authorize_business(&business_id).map_err(domain_error)?;

    let availability = state
        .resources
        .availability(&business_id, &resource_id, query.start_at, query.end_at)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(availability.into())))
}
