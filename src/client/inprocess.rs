//! In-memory backend over seeded records.
//!
//! Used by the test suites and as the state behind the mock REST API.
//! Every call is counted so callers can assert how often the network
//! would have been hit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{CollectMenuRequest, MenuBackend, RoleBackend};
use crate::error::{MenuError, Result};
use crate::record::{MenuRecord, RecordId};
use crate::roles::{RolePage, RoleQuery, RoleRecord};

#[derive(Default)]
struct CallCounters {
    user_menus: AtomicUsize,
    collected_reads: AtomicUsize,
    collected_saves: AtomicUsize,
    role_reads: AtomicUsize,
}

#[derive(Default)]
pub struct InProcessBackend {
    menus: Vec<MenuRecord>,
    roles: Vec<RoleRecord>,
    /// user id ("" when absent) → collected menu ids, textual, in save order.
    collected: Mutex<HashMap<String, Vec<String>>>,
    menu_failure: Option<MenuError>,
    latency: Option<Duration>,
    calls: CallCounters,
}

impl InProcessBackend {
    pub fn new(menus: Vec<MenuRecord>) -> Self {
        Self {
            menus,
            ..Self::default()
        }
    }

    pub fn with_roles(mut self, roles: Vec<RoleRecord>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_collected(self, user_id: &str, menu_ids: &[&str]) -> Self {
        self.collected_for()
            .insert(user_id.to_string(), menu_ids.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Every `/userMenus` call fails with `error`.
    pub fn failing_menus(mut self, error: MenuError) -> Self {
        self.menu_failure = Some(error);
        self
    }

    /// Delay each call, so concurrent callers overlap in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn menu_calls(&self) -> usize {
        self.calls.user_menus.load(Ordering::SeqCst)
    }

    pub fn collected_reads(&self) -> usize {
        self.calls.collected_reads.load(Ordering::SeqCst)
    }

    pub fn collected_saves(&self) -> usize {
        self.calls.collected_saves.load(Ordering::SeqCst)
    }

    pub fn role_reads(&self) -> usize {
        self.calls.role_reads.load(Ordering::SeqCst)
    }

    pub fn collected_ids(&self, user_id: &str) -> Vec<String> {
        self.collected_for()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn collected_for(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<String>>> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MenuBackend for InProcessBackend {
    async fn fetch_user_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>> {
        self.calls.user_menus.fetch_add(1, Ordering::SeqCst);
        debug!(?user_id, "in-process /userMenus");
        self.simulate_latency().await;

        match &self.menu_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.menus.clone()),
        }
    }

    async fn fetch_collected_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>> {
        self.calls.collected_reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let ids = self.collected_ids(user_id.unwrap_or_default());
        Ok(ids
            .iter()
            .filter_map(|id| self.menus.iter().find(|m| m.id.as_text() == *id))
            .cloned()
            .collect())
    }

    async fn save_collected_menu(&self, request: &CollectMenuRequest) -> Result<()> {
        self.calls.collected_saves.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let menu_id = request.menu_id.as_text();
        let user = request.user_id.clone().unwrap_or_default();
        let mut collected = self.collected_for();
        let ids = collected.entry(user).or_default();
        let present = ids.iter().any(|id| *id == menu_id);

        match (request.collected, present) {
            (true, false) => ids.push(menu_id),
            (false, true) => ids.retain(|id| *id != menu_id),
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl RoleBackend for InProcessBackend {
    async fn list_roles(&self, query: &RoleQuery) -> Result<RolePage> {
        self.calls.role_reads.fetch_add(1, Ordering::SeqCst);

        let needle = query.name.as_deref().unwrap_or_default();
        let matching: Vec<&RoleRecord> = self
            .roles
            .iter()
            .filter(|r| needle.is_empty() || r.name.contains(needle))
            .collect();

        let size = query.page_size.max(1) as usize;
        let offset = (query.page_num.max(1) as usize - 1) * size;
        Ok(RolePage {
            total: matching.len() as u64,
            list: matching.into_iter().skip(offset).take(size).cloned().collect(),
        })
    }

    async fn get_role(&self, id: &RecordId) -> Result<Option<RoleRecord>> {
        self.calls.role_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .roles
            .iter()
            .find(|r| r.id.as_text() == id.as_text())
            .cloned())
    }

    async fn find_role_by_name(
        &self,
        name: &str,
        system_id: Option<&RecordId>,
    ) -> Result<Option<RoleRecord>> {
        self.calls.role_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .roles
            .iter()
            .filter(|r| r.name == name)
            .find(|r| match system_id {
                Some(sys) => r.system_id.as_ref().map(RecordId::as_text) == Some(sys.as_text()),
                None => true,
            })
            .cloned())
    }
}
