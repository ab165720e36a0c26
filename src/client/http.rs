//! reqwest-backed admin API client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{
    CollectMenuRequest, MenuBackend, RoleBackend, ROLES_PATH, ROLE_BY_NAME_PATH,
    USER_COLLECT_MENUS_PATH, USER_MENUS_PATH,
};
use crate::config::PipelineConfig;
use crate::error::{MenuError, Result};
use crate::record::{MenuRecord, RecordId};
use crate::roles::{RolePage, RoleQuery, RoleRecord};

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: PipelineConfig,
}

impl HttpBackend {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MenuError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.config.endpoint(path)?;
        self.get_url(path, url, query).await
    }

    async fn get_url<T: DeserializeOwned>(
        &self,
        path: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MenuError::network(path, e))?;

        decode_body(path, response).await
    }

    async fn post_json<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| MenuError::network(path, e))?;

        check_status(path, &response)?;
        Ok(())
    }
}

fn user_query(user_id: Option<&str>) -> Vec<(&'static str, String)> {
    user_id
        .map(|id| vec![("userId", id.to_string())])
        .unwrap_or_default()
}

fn check_status(path: &str, response: &Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(MenuError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
        })
    }
}

/// An empty 2xx body is read as JSON `null`, so `Option` targets become `None`.
async fn decode_body<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    check_status(path, &response)?;

    let text = response
        .text()
        .await
        .map_err(|e| MenuError::network(path, e))?;
    let body = if text.trim().is_empty() { "null" } else { text.as_str() };

    serde_json::from_str(body).map_err(|e| MenuError::decode(path, e))
}

#[async_trait]
impl MenuBackend for HttpBackend {
    async fn fetch_user_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>> {
        let records: Option<Vec<MenuRecord>> =
            self.get_json(USER_MENUS_PATH, &user_query(user_id)).await?;
        Ok(records.unwrap_or_default())
    }

    async fn fetch_collected_menus(&self, user_id: Option<&str>) -> Result<Vec<MenuRecord>> {
        let records: Option<Vec<MenuRecord>> = self
            .get_json(USER_COLLECT_MENUS_PATH, &user_query(user_id))
            .await?;
        Ok(records.unwrap_or_default())
    }

    async fn save_collected_menu(&self, request: &CollectMenuRequest) -> Result<()> {
        self.post_json(USER_COLLECT_MENUS_PATH, request).await
    }
}

#[async_trait]
impl RoleBackend for HttpBackend {
    async fn list_roles(&self, query: &RoleQuery) -> Result<RolePage> {
        let mut params = vec![
            ("pageNum", query.page_num.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
            params.push(("name", name.to_string()));
        }

        let page: Option<RolePage> = self.get_json(ROLES_PATH, &params).await?;
        Ok(page.unwrap_or_default())
    }

    async fn get_role(&self, id: &RecordId) -> Result<Option<RoleRecord>> {
        let url = self.config.resource(ROLES_PATH, &id.as_text())?;
        self.get_url(ROLES_PATH, url, &[]).await
    }

    async fn find_role_by_name(
        &self,
        name: &str,
        system_id: Option<&RecordId>,
    ) -> Result<Option<RoleRecord>> {
        let mut params = vec![("name", name.to_string())];
        if let Some(system_id) = system_id {
            params.push(("systemId", system_id.as_text()));
        }
        self.get_json(ROLE_BY_NAME_PATH, &params).await
    }
}
