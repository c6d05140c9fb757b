use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use super::installed::validate_name;
use crate::auth::RequireBusiness;
use crate::server::AppState;
use crate::server::dto::{CreateExtensionRequest, ListExtensionsParams};
use crate::server::response::{ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse};
use crate::types::{Extension, ExtensionKind, normalize_domain};

pub async fn create_extension(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateExtensionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = validate_name(&req.name) {
        return Err(ApiError::bad_request(e));
    }

    let domain = normalize_domain(&req.domain)?;

    let now = Utc::now();
    // New entries always start unpublished and inactive; both are separate
    // state changes, never settable at creation.
    let extension = Extension {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        domain,
        kind: req.kind.unwrap_or(ExtensionKind::Basic),
        owner_id: principal.user_id,
        description: req.description,
        logo: req.logo,
        api_doc_url: req.api_doc_url,
        support_email: req.support_email,
        developer_contact_emails: req.developer_contact_emails,
        authorized_domains: req.authorized_domains,
        needed_data: req.needed_data,
        permissions: req.permissions,
        is_active: false,
        is_published: false,
        created_at: now,
        updated_at: now,
    };

    state.store.create_extension(&extension)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(extension))))
}

pub async fn list_extensions(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListExtensionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if offset < 0 || limit <= 0 {
        return Err(ApiError::bad_request("Invalid pagination parameters"));
    }

    let (items, total) = state.store.list_extensions(offset, limit)?;

    Ok(Json(PaginatedResponse {
        data: items,
        total,
        offset,
        limit,
    }))
}

pub async fn get_extension(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let extension = state
        .store
        .get_extension_by_name(&name)?
        .ok_or_else(|| ApiError::not_found(format!("Extension {name} not found")))?;

    Ok(Json(ApiResponse::success(extension)))
}

pub async fn publish_extension(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.set_extension_published(&name, true)? {
        return Err(ApiError::not_found(format!("Extension {name} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_extension(
    RequireBusiness(_principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.set_extension_active(&name, true)? {
        return Err(ApiError::not_found(format!("Extension {name} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
