// In-process flows over the library: shared cache, configured college,
// and the router without a spawned binary.

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crm_roles_api::app::{router, AppContext};
use crm_roles_api::cache::MemoryCache;
use crm_roles_api::config::AppConfig;
use crm_roles_api::database::models::ScreenKey;
use crm_roles_api::database::{Fixture, MemoryPermissionStore, PermissionStore};
use crm_roles_api::menu::ScreenDetail;
use crm_roles_api::services::CreateGroupRequest;
use crm_roles_api::types::{Action, DashboardType, ObjectId};

const FIXTURE: &str = r#"
screens:
  - screen_type: master_screen
    dashboard_type: admin_dashboard
    menus:
      leads:
        feature_id: leads
        name: Leads
        permissions: { read: true, write: false, delete: false }
      reports:
        feature_id: reports
        name: Reports
        permissions: { read: false }
  - screen_type: college_screen
    dashboard_type: admin_dashboard
    college_id: 65f1000000000000000000c1
    menus:
      leads:
        feature_id: leads
        permissions: { read: false }
roles:
  - _id: 65f1000000000000000000a1
    role_name: counselor
    menus:
      leads:
        feature_id: leads
        permissions: { read: true }
college_roles:
  - _id: 65f1000000000000000000a2
    role_id: 65f1000000000000000000a1
    college_id: 65f1000000000000000000c1
    role_name: counselor
    menus:
      leads:
        feature_id: leads
        permissions: { read: true }
users:
  - _id: 65f1000000000000000000b1
    role: { role_id: 65f1000000000000000000a1 }
    associated_colleges: [65f1000000000000000000c1]
"#;

fn id(hex: &str) -> ObjectId {
    ObjectId::parse(hex).unwrap()
}

async fn context(current_college: Option<ObjectId>) -> Result<(Arc<AppContext>, ObjectId)> {
    let fixture = Fixture::from_yaml(FIXTURE)?;
    assert!(fixture.problems().is_empty(), "{:?}", fixture.problems());
    let user_id = fixture.users[0].id;

    let store = Arc::new(MemoryPermissionStore::from_fixture(fixture));
    let mut config = AppConfig::development();
    config.cache.enabled = true;
    config.tenant.current_college_id = current_college;

    let ctx = AppContext::new(config, store, Arc::new(MemoryCache::new(None)));
    Ok((Arc::new(ctx), user_id))
}

fn details(value: Value) -> Vec<ScreenDetail> {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn college_beats_group_beats_role() -> Result<()> {
    let college = id("65f1000000000000000000c1");
    let (ctx, user_id) = context(None).await?;

    let group = ctx
        .admin
        .create_feature_group(
            CreateGroupRequest {
                name: "Lead Writers".to_string(),
                description: None,
                screen_details: details(json!([
                    {"feature_id": "leads", "permissions": {"write": true}}
                ])),
                created_by: None,
            },
            false,
        )
        .await?;
    ctx.links.get_assigned_permissions(user_id, &[group.id]).await?;

    let resolved = ctx
        .resolver
        .resolve_for_user(user_id, DashboardType::AdminDashboard, Some(college))
        .await?;
    let leads = resolved.data.node("leads").expect("leads");
    let permissions = leads.permissions.expect("permissions");
    assert_eq!(permissions.read, Some(false));
    assert_eq!(permissions.write, Some(true));
    Ok(())
}

#[tokio::test]
async fn writes_through_one_service_clear_the_shared_cache() -> Result<()> {
    let college = id("65f1000000000000000000c1");
    let (ctx, user_id) = context(None).await?;

    let first = ctx
        .resolver
        .resolve_for_user(user_id, DashboardType::AdminDashboard, Some(college))
        .await?;
    assert!(first.data.node("reports").is_none());

    ctx.admin
        .update_role_feature(
            id("65f1000000000000000000a1"),
            &details(json!([{"feature_id": "reports", "permissions": {"read": true}}])),
            Some(college),
        )
        .await?;

    let second = ctx
        .resolver
        .resolve_for_user(user_id, DashboardType::AdminDashboard, Some(college))
        .await?;
    assert!(second.data.node("reports").is_some());

    ctx.resolver
        .authorize(user_id, DashboardType::AdminDashboard, Some(college), "reports", Action::Read)
        .await?;
    Ok(())
}

#[tokio::test]
async fn removing_the_college_screen_drops_the_override() -> Result<()> {
    let college = id("65f1000000000000000000c1");
    let (ctx, user_id) = context(None).await?;

    let denied = ctx
        .resolver
        .authorize(user_id, DashboardType::AdminDashboard, Some(college), "leads", Action::Read)
        .await;
    assert!(denied.is_err());

    let key = ScreenKey::college(DashboardType::AdminDashboard, college);
    assert!(ctx.store.find_screen(key).await?.is_some());
    ctx.admin
        .upsert_screen(
            key.screen_type,
            key.dashboard_type,
            Some(college),
            Default::default(),
        )
        .await?;

    ctx.resolver
        .authorize(user_id, DashboardType::AdminDashboard, Some(college), "leads", Action::Read)
        .await?;
    Ok(())
}

#[tokio::test]
async fn router_falls_back_to_the_configured_college() -> Result<()> {
    let college = id("65f1000000000000000000c1");
    let (ctx, user_id) = context(Some(college)).await?;
    let app = router(ctx);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/permissions/{}", user_id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["data"]["college_id"], college.to_hex());
    assert_eq!(body["data"]["data"]["leads"]["permissions"]["read"], false);
    Ok(())
}
