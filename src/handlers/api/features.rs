use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::app::SharedContext;
use crate::error::ApiError;
use crate::handlers::optional_id;
use crate::menu::{MenuTree, ScreenDetail};
use crate::middleware::{ApiResponse, ApiResult, Detail};
use crate::services::{TreeKind, UpdateOutcome};
use crate::types::ObjectId;

#[derive(Debug, Deserialize)]
pub struct FeaturesQuery {
    pub feature_id: Option<String>,
    pub college_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollegeQuery {
    pub college_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleFeaturesBody {
    pub screen_details: Vec<ScreenDetail>,
}

async fn features_get(
    ctx: SharedContext,
    kind: TreeKind,
    id: String,
    query: FeaturesQuery,
) -> ApiResult<Vec<Value>> {
    let id = ObjectId::parse(&id)?;
    let college_id = optional_id(&query.college_id)?;
    let feature_id = query.feature_id.as_deref().filter(|f| !f.is_empty());

    let features = ctx
        .admin
        .get_role_features(kind, id, feature_id, college_id)
        .await?;
    Ok(ApiResponse::success(features))
}

async fn feature_patch(
    ctx: SharedContext,
    kind: TreeKind,
    id: String,
    feature_id: String,
    query: CollegeQuery,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = ObjectId::parse(&id)?;
    let college_id = optional_id(&query.college_id)?;
    let Json(fields) = payload?;

    let outcome = ctx
        .admin
        .update_role_specific_fields(kind, id, &feature_id, &fields, college_id)
        .await?;
    Ok(match outcome {
        UpdateOutcome::Updated(menus) => ApiResponse::success(menus).into_response(),
        UpdateOutcome::NothingToUpdate => Detail("Nothing to update".to_string()).into_response(),
    })
}

/// GET /api/roles/:role_id/features?feature_id=&college_id=
pub async fn role_features_get(
    State(ctx): State<SharedContext>,
    Path(role_id): Path<String>,
    Query(query): Query<FeaturesQuery>,
) -> ApiResult<Vec<Value>> {
    features_get(ctx, TreeKind::Role, role_id, query).await
}

/// GET /api/groups/:group_id/features?feature_id=
pub async fn group_features_get(
    State(ctx): State<SharedContext>,
    Path(group_id): Path<String>,
    Query(query): Query<FeaturesQuery>,
) -> ApiResult<Vec<Value>> {
    features_get(ctx, TreeKind::Group, group_id, query).await
}

/// PATCH /api/roles/:role_id/features/:feature_id?college_id= - overwrite fields of one feature
pub async fn role_feature_patch(
    State(ctx): State<SharedContext>,
    Path((role_id, feature_id)): Path<(String, String)>,
    Query(query): Query<CollegeQuery>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    feature_patch(ctx, TreeKind::Role, role_id, feature_id, query, payload).await
}

/// PATCH /api/groups/:group_id/features/:feature_id
pub async fn group_feature_patch(
    State(ctx): State<SharedContext>,
    Path((group_id, feature_id)): Path<(String, String)>,
    Query(query): Query<CollegeQuery>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    feature_patch(ctx, TreeKind::Group, group_id, feature_id, query, payload).await
}

/// PUT /api/roles/:role_id/features?college_id= - fold screen_details into the role
pub async fn role_features_put(
    State(ctx): State<SharedContext>,
    Path(role_id): Path<String>,
    Query(query): Query<CollegeQuery>,
    payload: Result<Json<RoleFeaturesBody>, JsonRejection>,
) -> ApiResult<MenuTree> {
    let role_id = ObjectId::parse(&role_id)?;
    let college_id = optional_id(&query.college_id)?;
    let Json(body) = payload?;

    let menus = ctx
        .admin
        .update_role_feature(role_id, &body.screen_details, college_id)
        .await?;
    Ok(ApiResponse::success(menus))
}
