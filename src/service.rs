//! `MenuService`, the pipeline's public surface.
//!
//! One service per session. The flat `/userMenus` dataset is fetched once
//! and every view (tree, permission codes, sub-apps) is recomputed from it
//! on each call. Collected menus always go back to the backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{HttpBackend, MenuBackend};
use crate::collected::CollectedMenus;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::{LoadStatus, MenuLoader};
use crate::normalize::{extract_permission_codes, split_menus};
use crate::principal::AuthContext;
use crate::record::RecordId;
use crate::registrar::{collect_mount_targets, MountTarget};
use crate::tree::{build_menu_tree, MenuTreeNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCollectedMenu {
    pub menu_id: RecordId,
    pub collected: bool,
}

pub struct MenuService {
    config: PipelineConfig,
    loader: MenuLoader,
    collected: CollectedMenus,
}

impl MenuService {
    pub fn new(backend: Arc<dyn MenuBackend>, config: PipelineConfig) -> Self {
        Self {
            config,
            loader: MenuLoader::new(Arc::clone(&backend)),
            collected: CollectedMenus::new(backend),
        }
    }

    /// Service over the HTTP backend described by `config`.
    pub fn connect(config: PipelineConfig) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(config.clone())?);
        Ok(Self::new(backend, config))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Navigable menus as a tree.
    pub async fn get_menus(&self, auth: &AuthContext) -> Result<Vec<MenuTreeNode>> {
        if self.config.mock_mode {
            // Let mock interception on this runtime attach before the request.
            tokio::task::yield_now().await;
        }

        let records = self.loader.load(auth).await?;
        let partition = split_menus(&records);
        debug!(
            menus = partition.menu_candidates.len(),
            permissions = partition.permission_candidates.len(),
            "split menu dataset"
        );
        build_menu_tree(partition.menu_candidates)
    }

    pub async fn get_collected_menus(&self, auth: &AuthContext) -> Result<Vec<MenuTreeNode>> {
        self.collected.get(auth).await
    }

    pub async fn save_collected_menu(
        &self,
        auth: &AuthContext,
        request: SaveCollectedMenu,
    ) -> Result<()> {
        self.collected
            .save(auth, request.menu_id, request.collected)
            .await
    }

    /// Permission codes of the session, in server order.
    pub async fn get_permissions(&self, auth: &AuthContext) -> Result<Vec<String>> {
        let records = self.loader.load(auth).await?;
        Ok(extract_permission_codes(&records))
    }

    /// Micro-frontends to register, read off the menu tree.
    pub async fn get_sub_apps(&self, auth: &AuthContext) -> Result<Vec<MountTarget>> {
        let tree = self.get_menus(auth).await?;
        Ok(collect_mount_targets(&tree))
    }

    /// Forget the cached dataset, e.g. after the principal changes.
    pub fn reload(&self) {
        self.loader.invalidate();
    }

    pub fn cache_status(&self) -> LoadStatus {
        self.loader.status()
    }
}
