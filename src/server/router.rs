use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post},
};

use super::{extensions, installed, permissions, proxy};
use crate::auth::IdentityClient;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::gateway::ProxyForwarder;
use crate::registry::InstallationRegistry;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: InstallationRegistry,
    pub forwarder: ProxyForwarder,
    pub identity: IdentityClient,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            registry: InstallationRegistry::new(store.clone(), config.max_page_size),
            forwarder: ProxyForwarder::new(config.proxy_timeout)?,
            identity: IdentityClient::new(&config.identity_url, &config.identity_api_key)?,
            store,
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/apps", apps_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

fn apps_router() -> Router<Arc<AppState>> {
    Router::new()
        // Extension catalog routes (thin)
        .route("/extensions", post(extensions::create_extension))
        .route("/extensions", get(extensions::list_extensions))
        .route("/extensions/{name}", get(extensions::get_extension))
        .route(
            "/extensions/{name}/publish",
            post(extensions::publish_extension),
        )
        .route(
            "/extensions/{name}/activate",
            post(extensions::activate_extension),
        )
        // Permission scope catalog routes (thin)
        .route("/permissions", post(permissions::create_permission))
        .route("/permissions", get(permissions::list_permissions))
        .route("/permissions/{scope}", delete(permissions::delete_permission))
        // Installation registry routes
        .route("/installed", post(installed::install))
        .route("/installed", get(installed::list_installed))
        .route("/installed/{name}", get(installed::get_installed))
        .route("/installed/{name}", delete(installed::uninstall))
        .route("/installed/{name}/activate", post(installed::activate))
        .route("/installed/{name}/deactivate", post(installed::deactivate))
        // Gateway entry point: static prefixes above always win over the
        // capture, so catalog and registry routes shadow same-named apps.
        .route(
            "/{app_name}/{*path}",
            get(proxy::proxy)
                .post(proxy::proxy)
                .put(proxy::proxy)
                .patch(proxy::proxy)
                .delete(proxy::proxy),
        )
}
