use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::SharedContext;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Detail};
use crate::types::ObjectId;

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    pub group_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Unassigned {
    pub user_id: ObjectId,
    pub group_id: ObjectId,
}

/// POST /api/users/:user_id/groups - assign groups, skipping ones already held.
/// When every group is already held the reply is a 200 detail.
pub async fn user_groups_post(
    State(ctx): State<SharedContext>,
    Path(user_id): Path<String>,
    payload: Result<Json<AssignBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_id = ObjectId::parse(&user_id)?;
    let Json(body) = payload?;
    let group_ids = body
        .group_ids
        .iter()
        .map(|id| ObjectId::parse(id))
        .collect::<Result<Vec<_>, _>>()?;

    let added = ctx.links.get_assigned_permissions(user_id, &group_ids).await?;
    if added.is_empty() {
        return Ok(Detail("Group already exists for user".to_string()).into_response());
    }
    Ok(ApiResponse::success(added).into_response())
}

/// DELETE /api/users/:user_id/groups/:group_id
pub async fn user_groups_delete(
    State(ctx): State<SharedContext>,
    Path((user_id, group_id)): Path<(String, String)>,
) -> ApiResult<Unassigned> {
    let user_id = ObjectId::parse(&user_id)?;
    let group_id = ObjectId::parse(&group_id)?;

    ctx.links.remove_feature_group(user_id, group_id).await?;
    Ok(ApiResponse::success(Unassigned { user_id, group_id }))
}
