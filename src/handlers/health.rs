use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "projects": "/api/projects[/:id], /api/projects/batch, /api/projects/count (tenant scoped)",
                "settings": "/api/settings (global)",
                "admin": "/api/admin/projects (super-admin, audited bypass)",
            }
        }
    }))
}

/// GET /health - liveness
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
