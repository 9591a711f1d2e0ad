use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::SharedContext;
use crate::database::models::Screen;
use crate::handlers::optional_id;
use crate::menu::MenuTree;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{DashboardType, ScreenType};

#[derive(Debug, Deserialize)]
pub struct ScreenQuery {
    pub college_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenBody {
    #[serde(default)]
    pub menus: MenuTree,
}

/// PUT /api/screens/:screen_type/:dashboard_type?college_id= - replace a screen tree
pub async fn screens_put(
    State(ctx): State<SharedContext>,
    Path((screen_type, dashboard_type)): Path<(String, String)>,
    Query(query): Query<ScreenQuery>,
    payload: Result<Json<ScreenBody>, JsonRejection>,
) -> ApiResult<Screen> {
    let screen_type: ScreenType = screen_type.parse()?;
    let dashboard_type: DashboardType = dashboard_type.parse()?;
    let college_id = optional_id(&query.college_id)?;
    let Json(body) = payload?;

    let screen = ctx
        .admin
        .upsert_screen(screen_type, dashboard_type, college_id, body.menus)
        .await?;
    Ok(ApiResponse::success(screen))
}
