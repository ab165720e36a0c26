//! Mock admin API server
//!
//! Serves seeded menus, collected menus and roles under `/api` so the
//! console and `menu_inspect` can run without the real backend.
//!
//! ```bash
//! cargo run --features server --bin mock_menu_server
//! curl 'http://127.0.0.1:8080/api/userMenus?userId=1'
//! ```
//!
//! Environment: MOCK_API_HOST (default 127.0.0.1), MOCK_API_PORT (default 8080).

use admin_menus::mock_rest_api::{MockRestApiConfig, MockRestApiServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let defaults = MockRestApiConfig::default();
    let config = MockRestApiConfig {
        host: std::env::var("MOCK_API_HOST").unwrap_or(defaults.host),
        port: match std::env::var("MOCK_API_PORT") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.port,
        },
    };

    MockRestApiServer::new(config).start().await
}
