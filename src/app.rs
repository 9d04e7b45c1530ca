use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::boundary::TenantBoundary;
use crate::config::{AppConfig, TenancyConfig};
use crate::database::InMemoryDelegate;
use crate::handlers;
use crate::middleware::{principal_middleware, tenant_boundary_middleware};
use crate::models::{Project, SystemSetting};

/// Shared, request-independent state. Tenant state never lives here.
#[derive(Debug)]
pub struct AppState {
    pub boundary: TenantBoundary,
    pub tenancy: TenancyConfig,
    pub jwt_secret: String,
    pub projects: InMemoryDelegate<Project>,
    pub settings: InMemoryDelegate<SystemSetting>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            boundary: TenantBoundary::from_config(&config.tenancy),
            tenancy: config.tenancy.clone(),
            jwt_secret: config.security.jwt_secret.clone(),
            projects: InMemoryDelegate::new(),
            settings: InMemoryDelegate::new(),
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .merge(project_routes())
        .merge(admin_routes())
        .route("/api/settings", get(handlers::settings::list).post(handlers::settings::create))
        // Layers run bottom-up: principal first, then the tenant boundary
        .layer(from_fn_with_state(Arc::clone(&state), tenant_boundary_middleware))
        .layer(from_fn_with_state(Arc::clone(&state), principal_middleware))
        .with_state(state)
}

/// Adds CORS and HTTP tracing according to configuration
pub fn with_http_layers(router: Router, config: &AppConfig) -> Router {
    let router = if config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn project_routes() -> Router<Arc<AppState>> {
    use handlers::projects;

    Router::new()
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/batch", axum::routing::post(projects::create_batch))
        .route("/api/projects/count", get(projects::count))
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/projects", get(handlers::admin::list_all_projects))
}
