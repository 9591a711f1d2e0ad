use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::SharedContext;
use crate::database::models::{Group, GroupSummary};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CreateGroupRequest;
use crate::types::ObjectId;

#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    #[serde(default)]
    pub update: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub feature_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub group_id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
}

/// GET /api/groups - summaries of every feature group
pub async fn groups_list(State(ctx): State<SharedContext>) -> ApiResult<Vec<GroupSummary>> {
    let groups = ctx.admin.list_feature_groups().await?;
    Ok(ApiResponse::success(groups))
}

/// POST /api/groups?update=bool - create a group, or fold into an existing one
pub async fn groups_post(
    State(ctx): State<SharedContext>,
    Query(query): Query<CreateQuery>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> ApiResult<Group> {
    let Json(request) = payload?;
    let group = ctx.admin.create_feature_group(request, query.update).await?;
    if query.update {
        Ok(ApiResponse::success(group))
    } else {
        Ok(ApiResponse::created(group))
    }
}

/// DELETE /api/groups/:group_id?feature_id= - remove one feature or the whole group
pub async fn groups_delete(
    State(ctx): State<SharedContext>,
    Path(group_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Deleted> {
    let group_id = ObjectId::parse(&group_id)?;
    let feature_id = query.feature_id.filter(|f| !f.is_empty());
    ctx.admin
        .delete_feature_group(group_id, feature_id.as_deref())
        .await?;
    Ok(ApiResponse::success(Deleted {
        group_id,
        feature_id,
    }))
}
