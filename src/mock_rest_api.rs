//! Mock REST API Server for the admin console
//!
//! Serves the menu, collected-menu and role endpoints from an
//! [`InProcessBackend`] so the pipeline (and the console) can run without the
//! real admin service. Endpoints are mounted under `/api`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::client::{
    CollectMenuRequest, InProcessBackend, MenuBackend, RoleBackend, ROLES_PATH,
    ROLE_BY_NAME_PATH, USER_COLLECT_MENUS_PATH, USER_MENUS_PATH,
};
use crate::error::MenuError;
use crate::record::{MenuRecord, RecordId, QIANKUN_TARGET};
use crate::roles::{RolePage, RoleQuery, RoleRecord, DEFAULT_PAGE_SIZE, ROLE_TYPE_CUSTOM};

/// Mock REST API server configuration
#[derive(Debug, Clone)]
pub struct MockRestApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for MockRestApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Mock application state
#[derive(Clone)]
pub struct MockAppState {
    pub backend: Arc<InProcessBackend>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListQuery {
    pub name: Option<String>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleByNameQuery {
    pub name: String,
    pub system_id: Option<String>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn internal(err: MenuError) -> (StatusCode, String) {
    warn!("Mock API: backend error: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Mock REST API server
pub struct MockRestApiServer {
    config: MockRestApiConfig,
    app_state: MockAppState,
}

impl MockRestApiServer {
    /// Create a server over the seeded demo data.
    pub fn new(config: MockRestApiConfig) -> Self {
        Self::with_backend(config, Arc::new(seeded_backend()))
    }

    pub fn with_backend(config: MockRestApiConfig, backend: Arc<InProcessBackend>) -> Self {
        Self {
            config,
            app_state: MockAppState { backend },
        }
    }

    /// Start the mock REST API server and serve until the process exits.
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!("Starting Mock REST API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Bind (port 0 picks a free port) and serve in the background.
    pub async fn spawn(self) -> std::io::Result<SocketAddr> {
        let app = self.create_router();
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        info!("Mock REST API listening on {}", addr);

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                warn!("Mock REST API stopped: {}", err);
            }
        });
        Ok(addr)
    }

    /// Create the router with all endpoints
    pub fn create_router(&self) -> Router {
        let api = Router::new()
            .route(USER_MENUS_PATH, get(user_menus))
            .route(
                USER_COLLECT_MENUS_PATH,
                get(collected_menus).post(save_collected_menu),
            )
            .route(ROLES_PATH, get(list_roles))
            .route(&format!("{ROLES_PATH}/:id"), get(get_role))
            .route(ROLE_BY_NAME_PATH, get(role_by_name))
            .route("/health", get(health_check));

        Router::new()
            .nest("/api", api)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any)),
            )
            .with_state(self.app_state.clone())
    }
}

/// Health check endpoint, with the backend's call counters.
async fn health_check(State(state): State<MockAppState>) -> ApiResult<serde_json::Value> {
    let backend = &state.backend;
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "mock-admin-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "mode": "mock",
        "calls": {
            "userMenus": backend.menu_calls(),
            "collectedReads": backend.collected_reads(),
            "collectedSaves": backend.collected_saves(),
            "roleReads": backend.role_reads()
        }
    })))
}

async fn user_menus(
    State(state): State<MockAppState>,
    Query(params): Query<UserQuery>,
) -> ApiResult<Vec<MenuRecord>> {
    info!("Mock API: /userMenus for {:?}", params.user_id);
    state
        .backend
        .fetch_user_menus(params.user_id.as_deref())
        .await
        .map(Json)
        .map_err(internal)
}

async fn collected_menus(
    State(state): State<MockAppState>,
    Query(params): Query<UserQuery>,
) -> ApiResult<Vec<MenuRecord>> {
    state
        .backend
        .fetch_collected_menus(params.user_id.as_deref())
        .await
        .map(Json)
        .map_err(internal)
}

async fn save_collected_menu(
    State(state): State<MockAppState>,
    Json(request): Json<CollectMenuRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    info!(
        "Mock API: collect menu {} = {} for {:?}",
        request.menu_id, request.collected, request.user_id
    );
    state
        .backend
        .save_collected_menu(&request)
        .await
        .map(|_| StatusCode::OK)
        .map_err(internal)
}

async fn list_roles(
    State(state): State<MockAppState>,
    Query(params): Query<RoleListQuery>,
) -> ApiResult<RolePage> {
    let query = RoleQuery {
        name: params.name,
        page_num: 1,
        page_size: DEFAULT_PAGE_SIZE,
    }
    .page(
        params.page_num.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    state
        .backend
        .list_roles(&query)
        .await
        .map(Json)
        .map_err(internal)
}

async fn get_role(
    State(state): State<MockAppState>,
    Path(id): Path<String>,
) -> ApiResult<Option<RoleRecord>> {
    state
        .backend
        .get_role(&RecordId::Text(id))
        .await
        .map(Json)
        .map_err(internal)
}

async fn role_by_name(
    State(state): State<MockAppState>,
    Query(params): Query<RoleByNameQuery>,
) -> ApiResult<Option<RoleRecord>> {
    let system_id = params.system_id.map(RecordId::Text);
    state
        .backend
        .find_role_by_name(&params.name, system_id.as_ref())
        .await
        .map(Json)
        .map_err(internal)
}

/// Demo dataset: a system menu with two screens, one permission, and one
/// micro-frontend; two built-in roles and two custom ones.
pub fn seeded_backend() -> InProcessBackend {
    let mut reports = MenuRecord::new(5)
        .with_parent(1)
        .with_type(1)
        .with_title("Reports");
    reports.ord = Some(950);
    reports.path = Some("/reports".into());
    reports.target = Some(QIANKUN_TARGET.to_string());
    reports.name = Some("reports".into());
    reports.entry = Some("//localhost:3002".into());

    let mut users = MenuRecord::new(2)
        .with_parent(1)
        .with_type(1)
        .with_title("Users");
    users.ord = Some(900);
    users.path = Some("/users".into());

    let mut roles = MenuRecord::new(3)
        .with_parent(1)
        .with_type(1)
        .with_title("Roles");
    roles.sort = Some(910);
    roles.path = Some("/roles".into());

    let menus = vec![
        MenuRecord::new(1).with_type(1).with_title("Sys").with_order(900),
        users,
        roles,
        MenuRecord::new(4)
            .with_parent(2)
            .with_type(2)
            .with_title("perm.read")
            .with_code("user:read"),
        reports,
    ];

    let roles = vec![
        RoleRecord::new(1, "admin").with_type(1).with_system(1),
        RoleRecord::new(2, "guest").with_type(2).with_system(1),
        RoleRecord::new(3, "auditor").with_type(ROLE_TYPE_CUSTOM).with_system(1),
        RoleRecord::new(4, "operator").with_type(ROLE_TYPE_CUSTOM).with_system(1),
    ];

    InProcessBackend::new(menus).with_roles(roles)
}
