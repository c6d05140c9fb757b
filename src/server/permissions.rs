use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::RequireBusiness;
use crate::server::AppState;
use crate::server::dto::CreatePermissionRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::Permission;

pub async fn create_permission(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.scope.is_empty() {
        return Err(ApiError::bad_request("Scope cannot be empty"));
    }

    let permission = Permission {
        id: Uuid::new_v4().to_string(),
        scope: req.scope,
        description: req.description,
        created_at: Utc::now(),
    };

    state.store.create_permission(&permission)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(permission))))
}

pub async fn list_permissions(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = state.store.list_permissions()?;
    Ok(Json(ApiResponse::success(permissions)))
}

pub async fn delete_permission(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.delete_permission(&scope)? {
        return Err(ApiError::not_found(format!("Permission {scope} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
