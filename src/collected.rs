//! Collected (starred) menus: a per-user overlay read from its own endpoint.
//!
//! Never memoized, so a save is visible on the next read.

use std::sync::Arc;

use tracing::debug;

use crate::client::{CollectMenuRequest, MenuBackend};
use crate::error::Result;
use crate::principal::AuthContext;
use crate::record::{RecordId, MENU_TYPE_MENU};
use crate::tree::{build_menu_tree, MenuTreeNode};

#[derive(Clone)]
pub struct CollectedMenus {
    backend: Arc<dyn MenuBackend>,
}

impl CollectedMenus {
    pub fn new(backend: Arc<dyn MenuBackend>) -> Self {
        Self { backend }
    }

    /// The user's collected menus as a tree, every node tagged
    /// `isCollectedMenu`. Collected permissions are dropped.
    pub async fn get(&self, auth: &AuthContext) -> Result<Vec<MenuTreeNode>> {
        if auth.is_login_page() {
            return Ok(Vec::new());
        }

        let records = self.backend.fetch_collected_menus(auth.user_id()).await?;
        let menus = records
            .into_iter()
            .filter(|r| r.type_code() == Some(MENU_TYPE_MENU))
            .map(|mut r| {
                r.is_collected_menu = true;
                r
            })
            .collect();

        build_menu_tree(menus)
    }

    /// Set the collected state of one menu. The backend owns the current
    /// state; nothing is read first.
    pub async fn save(&self, auth: &AuthContext, menu_id: RecordId, collected: bool) -> Result<()> {
        if auth.is_login_page() {
            debug!(%menu_id, "login page: collected-menu save ignored");
            return Ok(());
        }

        let request = CollectMenuRequest {
            user_id: auth.user_id().map(str::to_owned),
            menu_id,
            collected,
        };
        self.backend.save_collected_menu(&request).await
    }
}
