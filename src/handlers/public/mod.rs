// handlers/public/mod.rs - Public handlers
//
// Route Prefix: none (/, /health)
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::SharedContext;

/// GET / - service info
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CRM Roles API",
            "version": version,
            "description": "Role, group and menu permission service",
            "endpoints": {
                "health": "/health",
                "permissions": "/api/permissions/:user_id[/check]",
                "groups": "/api/groups[/:group_id]",
                "features": "/api/roles/:role_id/features, /api/groups/:group_id/features",
                "users": "/api/users/:user_id/groups[/:group_id]",
                "screens": "/api/screens/:screen_type/:dashboard_type",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(ctx): State<SharedContext>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match ctx.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": ctx.config.storage.backend,
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "storage unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "storage_error": e.to_string()
                }
            })),
        ),
    }
}
