use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireBusiness;
use crate::server::AppState;
use crate::server::dto::{InstallRequest, ListInstalledParams};
use crate::server::response::{ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse};

pub async fn install(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Json(req): Json<InstallRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let local_name = req.name.as_deref().unwrap_or(&req.extension);
    if let Err(e) = validate_name(local_name) {
        return Err(ApiError::bad_request(e));
    }

    let installation = state.registry.install(
        &principal.business_id,
        &principal.user_id,
        &req.extension,
        local_name,
        req.domain.as_deref(),
        &req.permissions,
    )?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(installation))))
}

pub async fn list_installed(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListInstalledParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.registry.list(
        &principal.business_id,
        params.kind,
        params.offset.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok(Json(PaginatedResponse {
        data: page.items,
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

pub async fn get_installed(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let installation = state.registry.resolve(&principal.business_id, &name)?;
    Ok(Json(ApiResponse::success(installation)))
}

pub async fn activate(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.registry.activate(&principal.business_id, &name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.registry.deactivate(&principal.business_id, &name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn uninstall(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.registry.uninstall(&principal.business_id, &name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if name.len() > 64 {
        return Err("Name cannot exceed 64 characters".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "Name can only contain alphanumeric characters, hyphens, and underscores".to_string(),
        );
    }

    if name.starts_with('-') || name.starts_with('_') {
        return Err("Name cannot start with a hyphen or underscore".to_string());
    }

    Ok(())
}
