use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::app::SharedContext;
use crate::handlers::optional_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::ResolvedPermissions;
use crate::types::{Action, DashboardType, ObjectId};

#[derive(Debug, Deserialize)]
pub struct PermissionsQuery {
    pub dashboard_type: Option<String>,
    pub college_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub feature_id: String,
    pub action: String,
    pub dashboard_type: Option<String>,
    pub college_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub allowed: bool,
    pub feature_id: String,
    pub action: Action,
}

fn dashboard(raw: &Option<String>) -> Result<DashboardType, crate::error::ApiError> {
    match raw.as_deref() {
        None | Some("") => Ok(DashboardType::default()),
        Some(raw) => Ok(raw.parse()?),
    }
}

/// GET /api/permissions/:user_id - merged permission tree for a dashboard
pub async fn permissions_get(
    State(ctx): State<SharedContext>,
    Path(user_id): Path<String>,
    Query(query): Query<PermissionsQuery>,
) -> ApiResult<ResolvedPermissions> {
    let user_id = ObjectId::parse(&user_id)?;
    let dashboard_type = dashboard(&query.dashboard_type)?;
    let college_id = ctx.college_or_default(optional_id(&query.college_id)?);

    let resolved = ctx
        .resolver
        .resolve_for_user(user_id, dashboard_type, college_id)
        .await?;
    Ok(ApiResponse::success(resolved))
}

/// GET /api/permissions/:user_id/check - 401 unless the action is granted
pub async fn permissions_check(
    State(ctx): State<SharedContext>,
    Path(user_id): Path<String>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<CheckResult> {
    let user_id = ObjectId::parse(&user_id)?;
    let dashboard_type = dashboard(&query.dashboard_type)?;
    let action: Action = query.action.parse()?;
    let college_id = ctx.college_or_default(optional_id(&query.college_id)?);

    ctx.resolver
        .authorize(user_id, dashboard_type, college_id, &query.feature_id, action)
        .await?;
    Ok(ApiResponse::success(CheckResult {
        allowed: true,
        feature_id: query.feature_id,
        action,
    }))
}
