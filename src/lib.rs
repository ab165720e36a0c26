//! Menu/permission resolution for the admin console.
//!
//! The backend serves one flat list of menu and permission records per user.
//! This crate fetches it once per session ([`loader`]), splits it into
//! navigable menus and permission codes ([`normalize`]), nests the menus
//! ([`tree`]) and derives the micro-frontend registration list
//! ([`registrar`]). Collected (starred) menus are an independent overlay
//! ([`collected`]). [`service::MenuService`] ties it together.
//!
//! ```rust,no_run
//! use admin_menus::{AuthContext, MenuService, PipelineConfig, Principal};
//!
//! # async fn demo() -> admin_menus::Result<()> {
//! let service = MenuService::connect(PipelineConfig::from_env()?)?;
//! let auth = AuthContext::signed_in(Principal::new("42"));
//!
//! let menus = service.get_menus(&auth).await?;
//! let codes = service.get_permissions(&auth).await?;
//! let apps = service.get_sub_apps(&auth).await?;
//! # let _ = (menus, codes, apps);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collected;
pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod principal;
pub mod record;
pub mod registrar;
pub mod roles;
pub mod service;
pub mod tree;

#[cfg(feature = "server")]
pub mod mock_rest_api;

pub use client::{HttpBackend, InProcessBackend, MenuBackend, RoleBackend};
pub use config::PipelineConfig;
pub use error::{MenuError, Result};
pub use loader::{LoadStatus, MenuLoader};
pub use principal::{AuthContext, Principal};
pub use record::{MenuRecord, RecordId, RecordType};
pub use registrar::MountTarget;
pub use roles::{CustomRolePage, RoleDirectory, RoleQuery, RoleRecord};
pub use service::{MenuService, SaveCollectedMenu};
pub use tree::MenuTreeNode;
