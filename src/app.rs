use axum::{
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::cache::{CacheStore, MemoryCache, NoopCache};
use crate::config::{AppConfig, StorageBackend};
use crate::database::{
    Fixture, MemoryPermissionStore, PermissionStore, PgPermissionStore, StoreError,
};
use crate::handlers;
use crate::permissions::PermissionResolver;
use crate::services::{GroupLinkService, RoleAdminService};
use crate::types::ObjectId;

/// Shared state handed to every handler
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn PermissionStore>,
    pub resolver: PermissionResolver,
    pub admin: RoleAdminService,
    pub links: GroupLinkService,
}

pub type SharedContext = Arc<AppContext>;

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn PermissionStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            resolver: PermissionResolver::new(store.clone(), cache.clone()),
            admin: RoleAdminService::new(store.clone(), cache.clone()),
            links: GroupLinkService::new(store.clone(), cache),
            store,
            config,
        }
    }

    /// Build the store and cache the configuration asks for
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let fixture = match &config.storage.fixture {
            Some(path) => Some(Fixture::load(path)?),
            None => None,
        };
        for problem in fixture.iter().flat_map(Fixture::problems) {
            warn!(problem = %problem, "Fixture inconsistency");
        }

        let store: Arc<dyn PermissionStore> = match config.storage.backend {
            StorageBackend::Memory => {
                Arc::new(MemoryPermissionStore::from_fixture(fixture.unwrap_or_default()))
            }
            StorageBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
                let store = PgPermissionStore::connect(
                    url,
                    config.database.max_connections,
                    config.connection_timeout(),
                )
                .await?;
                if let Some(fixture) = fixture {
                    fixture.apply(&store).await?;
                    info!("Applied fixture to database");
                }
                Arc::new(store)
            }
        };

        let cache: Arc<dyn CacheStore> = if config.cache.enabled {
            Arc::new(MemoryCache::new(config.cache_ttl()))
        } else {
            Arc::new(NoopCache)
        };

        Ok(Self::new(config, store, cache))
    }

    /// College named by the request, else the configured current college
    pub fn college_or_default(&self, college_id: Option<ObjectId>) -> Option<ObjectId> {
        college_id.or(self.config.tenant.current_college_id)
    }
}

pub fn router(ctx: SharedContext) -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(permission_routes())
        .merge(group_routes())
        .merge(feature_routes())
        .merge(user_routes())
        .merge(screen_routes());

    if ctx.config.security.enable_cors {
        app = app.layer(cors_layer(&ctx.config.security.cors_origins));
    }
    if ctx.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.layer(RequestBodyLimitLayer::new(ctx.config.api.max_request_size_bytes))
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    let origin = if origins.iter().any(|o| o == "*") || parsed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parsed)
    };
    CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any)
}

fn permission_routes() -> Router<SharedContext> {
    use handlers::api::permissions;

    Router::new()
        .route("/api/permissions/:user_id", get(permissions::permissions_get))
        .route("/api/permissions/:user_id/check", get(permissions::permissions_check))
}

fn group_routes() -> Router<SharedContext> {
    use handlers::api::groups;

    Router::new()
        .route("/api/groups", get(groups::groups_list).post(groups::groups_post))
        .route("/api/groups/:group_id", delete(groups::groups_delete))
}

fn feature_routes() -> Router<SharedContext> {
    use handlers::api::features;

    Router::new()
        .route(
            "/api/roles/:role_id/features",
            get(features::role_features_get).put(features::role_features_put),
        )
        .route("/api/roles/:role_id/features/:feature_id", patch(features::role_feature_patch))
        .route("/api/groups/:group_id/features", get(features::group_features_get))
        .route("/api/groups/:group_id/features/:feature_id", patch(features::group_feature_patch))
}

fn user_routes() -> Router<SharedContext> {
    use handlers::api::users;

    Router::new()
        .route("/api/users/:user_id/groups", post(users::user_groups_post))
        .route("/api/users/:user_id/groups/:group_id", delete(users::user_groups_delete))
}

fn screen_routes() -> Router<SharedContext> {
    use handlers::api::screens;

    Router::new().route(
        "/api/screens/:screen_type/:dashboard_type",
        put(screens::screens_put),
    )
}
