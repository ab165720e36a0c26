//! Menu Inspection CLI
//!
//! Resolves the menu pipeline for one user against a running admin API and
//! prints the result as JSON.
//!
//! Usage:
//!   cargo run --features cli --bin menu_inspect -- --user 42 menus
//!   cargo run --features cli --bin menu_inspect -- --user 42 permissions
//!   cargo run --features cli --bin menu_inspect -- --user 42 sub-apps
//!   cargo run --features cli --bin menu_inspect -- --user 42 collected
//!   cargo run --features cli --bin menu_inspect -- --user 42 collect 7 --off
//!   cargo run --features cli --bin menu_inspect -- --session permissions
//!
//! Environment: ADMIN_API_BASE_URL, ADMIN_MOCK, ADMIN_HTTP_TIMEOUT_SECS
//! (a `.env` file is honoured).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use admin_menus::{
    AuthContext, MenuError, MenuService, PipelineConfig, Principal, RecordId, SaveCollectedMenu,
};

#[derive(Parser, Debug)]
#[command(name = "menu_inspect")]
#[command(about = "Inspect resolved menus, permissions and sub-apps for a user")]
struct Args {
    /// User id to resolve for; omit to act as the login page
    #[arg(long, short = 'u', env = "ADMIN_USER_ID")]
    user: Option<String>,

    /// Display name of the user, for log output
    #[arg(long, requires = "user")]
    name: Option<String>,

    /// Signed-in session without a user id; the server picks the user
    #[arg(long, conflicts_with = "user")]
    session: bool,

    /// Override ADMIN_API_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Navigable menu tree
    Menus,
    /// Permission codes
    Permissions,
    /// Micro-frontend registration list
    SubApps,
    /// Collected menu tree
    Collected,
    /// Set the collected state of a menu
    Collect {
        menu_id: String,
        /// Un-collect instead
        #[arg(long)]
        off: bool,
    },
}

/// Point at the connection settings when the admin API itself failed.
fn explain(err: MenuError) -> anyhow::Error {
    if err.is_backend_failure() {
        anyhow::Error::new(err).context("admin API request failed (check ADMIN_API_BASE_URL)")
    } else {
        err.into()
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
    if let Some(base_url) = &args.base_url {
        let mock_mode = config.mock_mode;
        config = PipelineConfig::new(base_url)?.with_mock_mode(mock_mode);
    }
    let service = MenuService::connect(config)?;

    let auth = match (&args.user, args.session) {
        (Some(user), _) => {
            let mut principal = Principal::new(user);
            if let Some(name) = &args.name {
                principal = principal.with_name(name);
            }
            AuthContext::signed_in(principal)
        }
        (None, true) => AuthContext::anonymous_session(),
        (None, false) => AuthContext::login_page(),
    };
    info!(
        user = ?auth.user_id(),
        name = ?auth.principal.as_ref().and_then(|p| p.name.as_deref()),
        login_page = auth.is_login_page(),
        "resolving menus"
    );

    match args.command {
        Command::Menus => {
            let menus = service.get_menus(&auth).await.map_err(explain)?;
            print_json(&menus, args.pretty)?
        }
        Command::Permissions => {
            let codes = service.get_permissions(&auth).await.map_err(explain)?;
            print_json(&codes, args.pretty)?
        }
        Command::SubApps => {
            let apps = service.get_sub_apps(&auth).await.map_err(explain)?;
            print_json(&apps, args.pretty)?
        }
        Command::Collected => {
            let collected = service.get_collected_menus(&auth).await.map_err(explain)?;
            print_json(&collected, args.pretty)?
        }
        Command::Collect { menu_id, off } => {
            let menu_id = match menu_id.parse::<i64>() {
                Ok(n) => RecordId::Int(n),
                Err(_) => RecordId::Text(menu_id),
            };
            service
                .save_collected_menu(
                    &auth,
                    SaveCollectedMenu {
                        menu_id,
                        collected: !off,
                    },
                )
                .await
                .map_err(explain)?;
            eprintln!("saved");
        }
    }

    Ok(())
}
