use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, header::HOST},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::auth::RequireBusiness;
use crate::error::Error;
use crate::gateway::resolve_route;
use crate::server::AppState;
use crate::server::response::ApiError;

/// Gateway entry point for `/{app_name}/{*path}`. Tenant resolution happens
/// in the extractor; route resolution and forwarding happen here. Upstream
/// responses of any status are relayed verbatim.
pub async fn proxy(
    RequireBusiness(principal): RequireBusiness,
    State(state): State<Arc<AppState>>,
    Path((app_name, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let target = resolve_route(&state.registry, &principal.business_id, &app_name).map_err(
        |e| match e {
            Error::NotFound => ApiError::not_found(format!("Extension {app_name} not found")),
            other => ApiError::from(other),
        },
    )?;

    let original_host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let body = match method {
        Method::POST | Method::PUT | Method::PATCH => Some(body),
        _ => None,
    };

    let upstream = state
        .forwarder
        .forward(
            &target,
            method,
            &path,
            query.as_deref(),
            &headers,
            original_host.as_deref(),
            body,
        )
        .await?;

    let mut response = (upstream.status, upstream.body).into_response();
    *response.headers_mut() = upstream.headers;
    Ok(response)
}
