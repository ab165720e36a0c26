//! Backend traits: the only boundary between the pipeline and the admin API.
//!
//! `HttpBackend` talks to the real service; `InProcessBackend` serves seeded
//! data from memory for tests and the mock server.

pub mod http;
pub mod inprocess;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{MenuRecord, RecordId};
use crate::roles::{RolePage, RoleQuery, RoleRecord};

pub use http::HttpBackend;
pub use inprocess::InProcessBackend;

pub const USER_MENUS_PATH: &str = "/userMenus";
pub const USER_COLLECT_MENUS_PATH: &str = "/userCollectMenus";
pub const ROLES_PATH: &str = "/roles";
pub const ROLE_BY_NAME_PATH: &str = "/roleByName";

/// Body of `POST /userCollectMenus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectMenuRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub menu_id: RecordId,
    pub collected: bool,
}

#[async_trait]
pub trait MenuBackend: Send + Sync {
    /// `GET /userMenus`. `user_id` is omitted from the query when `None`.
    async fn fetch_user_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>>;

    /// `GET /userCollectMenus`.
    async fn fetch_collected_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>>;

    /// `POST /userCollectMenus`. Sets the state; never toggles server-side.
    async fn save_collected_menu(&self, request: &CollectMenuRequest) -> Result<()>;
}

#[async_trait]
pub trait RoleBackend: Send + Sync {
    /// `GET /roles`: one page, all role types.
    async fn list_roles(&self, query: &RoleQuery) -> Result<RolePage>;

    /// `GET /roles/:id`.
    async fn get_role(&self, id: &RecordId) -> Result<Option<RoleRecord>>;

    /// `GET /roleByName`.
    async fn find_role_by_name(
        &self,
        name: &str,
        system_id: Option<&RecordId>,
    ) -> Result<Option<RoleRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_request_wire_shape() {
        let req = CollectMenuRequest {
            user_id: Some("42".into()),
            menu_id: RecordId::Int(7),
            collected: true,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"userId": "42", "menuId": 7, "collected": true})
        );
    }

    #[test]
    fn collect_request_omits_missing_user() {
        let req = CollectMenuRequest {
            user_id: None,
            menu_id: RecordId::Text("m".into()),
            collected: false,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"menuId": "m", "collected": false})
        );
    }
}
