//! HTTP-level tests: `HttpBackend` against the mock REST API on an
//! ephemeral port.
//!
//! Run:
//!   cargo test --features server --test http_backend

#![cfg(feature = "server")]

use std::sync::Arc;

use admin_menus::client::{InProcessBackend, MenuBackend, RoleBackend};
use admin_menus::mock_rest_api::{seeded_backend, MockRestApiConfig, MockRestApiServer};
use admin_menus::{
    AuthContext, HttpBackend, MenuError, MenuRecord, MenuService, PipelineConfig, Principal,
    RecordId, RoleDirectory, RoleQuery, RoleRecord, SaveCollectedMenu,
};

async fn start_mock(backend: Arc<InProcessBackend>) -> PipelineConfig {
    let server = MockRestApiServer::with_backend(
        MockRestApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backend,
    );
    let addr = server.spawn().await.expect("mock server binds");
    PipelineConfig::new(&format!("http://{addr}/api")).expect("config")
}

fn user() -> AuthContext {
    AuthContext::signed_in(Principal::new("1"))
}

#[tokio::test]
async fn resolves_menus_over_http() {
    let backend = Arc::new(seeded_backend());
    let config = start_mock(backend.clone()).await;
    let service = MenuService::connect(config).unwrap();

    let menus = service.get_menus(&user()).await.unwrap();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].record.title.as_deref(), Some("Sys"));
    let children: Vec<&str> = menus[0]
        .children
        .iter()
        .map(|c| c.record.title.as_deref().unwrap_or(""))
        .collect();
    // Users(ord 900) < Roles(sort 910) < Reports(ord 950)
    assert_eq!(children, vec!["Users", "Roles", "Reports"]);

    assert_eq!(
        service.get_permissions(&user()).await.unwrap(),
        vec!["user:read"]
    );

    let apps = service.get_sub_apps(&user()).await.unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name.as_deref(), Some("reports"));

    assert_eq!(backend.menu_calls(), 1);
}

#[tokio::test]
async fn collected_menus_over_http() {
    let backend = Arc::new(seeded_backend());
    let config = start_mock(backend.clone()).await;
    let service = MenuService::connect(config).unwrap();

    service
        .save_collected_menu(
            &user(),
            SaveCollectedMenu {
                menu_id: RecordId::Int(3),
                collected: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(backend.collected_ids("1"), vec!["3"]);

    let collected = service.get_collected_menus(&user()).await.unwrap();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].record.title.as_deref(), Some("Roles"));
    assert!(collected[0].record.is_collected_menu);
}

#[tokio::test]
async fn roles_over_http() {
    let backend = Arc::new(seeded_backend());
    let config = start_mock(backend.clone()).await;
    let http = Arc::new(HttpBackend::new(config).unwrap());
    let directory = RoleDirectory::new(http.clone());

    let page = directory
        .list_custom_roles(&RoleQuery::default())
        .await
        .unwrap();
    assert_eq!(page.data_source.len(), 2);
    assert_eq!(page.total, 4);

    let role = http.get_role(&RecordId::Int(3)).await.unwrap().unwrap();
    assert_eq!(role.name, "auditor");
    assert!(http.get_role(&RecordId::Int(404)).await.unwrap().is_none());

    let err = directory
        .check_role_name("auditor", Some(&RecordId::Int(1)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MenuError::DuplicateRoleName(_)));
    assert_eq!(backend.role_reads(), 4);
}

#[tokio::test]
async fn health_reports_call_counters() {
    let backend = Arc::new(seeded_backend());
    let config = start_mock(backend.clone()).await;
    let service = MenuService::connect(config.clone()).unwrap();
    service.get_permissions(&user()).await.unwrap();

    let health: serde_json::Value = reqwest::get(config.endpoint("/health").unwrap())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["calls"]["userMenus"], 1);
    assert_eq!(health["calls"]["roleReads"], 0);
}

#[tokio::test]
async fn role_id_is_sent_as_one_segment() {
    let backend = InProcessBackend::new(Vec::new()).with_roles(vec![
        RoleRecord::new("ops/eu?x#1", "regional"),
        RoleRecord::new("ops", "parent"),
    ]);
    let config = start_mock(Arc::new(backend)).await;
    let http = HttpBackend::new(config).unwrap();

    let role = http
        .get_role(&RecordId::from("ops/eu?x#1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.name, "regional");
}

#[tokio::test]
async fn unrecognised_type_survives_http_decoding() {
    let dataset: Vec<MenuRecord> = serde_json::from_value(serde_json::json!([
        {"id": 1, "type": 1, "title": "Sys"},
        {"id": 2, "parentId": 1, "type": "1", "title": "stringly"},
        {"id": 3, "parentId": 1, "type": 1, "title": "Users", "sort": "oops"}
    ]))
    .unwrap();
    let config = start_mock(Arc::new(InProcessBackend::new(dataset))).await;
    let service = MenuService::connect(config).unwrap();

    let menus = service.get_menus(&user()).await.unwrap();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].children.len(), 1);
    assert_eq!(menus[0].children[0].record.title.as_deref(), Some("Users"));
}

#[tokio::test]
async fn missing_endpoint_is_status_error() {
    let backend = Arc::new(seeded_backend());
    let config = start_mock(backend).await;
    let broken = PipelineConfig::new(&format!("{}nope", config.base_url)).unwrap();
    let http = HttpBackend::new(broken).unwrap();

    let err = http.fetch_user_menus(Some("1")).await.unwrap_err();
    assert!(matches!(err, MenuError::Status { status: 404, .. }));
}
