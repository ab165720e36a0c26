//! Read side of the role management screen: custom-role listing, role
//! detail, and role-name uniqueness checks. Roles are never written here.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::RoleBackend;
use crate::error::{MenuError, Result};
use crate::record::RecordId;

/// `type` of a user-defined role; built-in roles are hidden from the screen.
pub const ROLE_TYPE_CUSTOM: i64 = 3;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<i64>,
    /// Servers send either a boolean or `0`/`1`.
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub menu_ids: Vec<RecordId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleRecord {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role_type: None,
            enable: None,
            remark: None,
            system_id: None,
            system_name: None,
            menu_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_type(mut self, role_type: i64) -> Self {
        self.role_type = Some(role_type);
        self
    }

    pub fn with_system(mut self, system_id: impl Into<RecordId>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn is_custom(&self) -> bool {
        self.role_type == Some(ROLE_TYPE_CUSTOM)
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Some(Value::String(s)) => Some(!s.is_empty() && s != "0" && s != "false"),
        Some(_) => Some(true),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleQuery {
    pub name: Option<String>,
    /// 1-based.
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for RoleQuery {
    fn default() -> Self {
        Self {
            name: None,
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RoleQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn page(mut self, page_num: u32, page_size: u32) -> Self {
        self.page_num = page_num.max(1);
        self.page_size = page_size.max(1);
        self
    }
}

/// `GET /roles` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePage {
    #[serde(default, deserialize_with = "deserialize_nullable_list")]
    pub list: Vec<RoleRecord>,
    #[serde(default)]
    pub total: u64,
}

fn deserialize_nullable_list<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<RoleRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RoleRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// What the role table renders: custom roles of one page plus the server total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRolePage {
    pub data_source: Vec<RoleRecord>,
    pub total: u64,
}

#[derive(Clone)]
pub struct RoleDirectory {
    backend: Arc<dyn RoleBackend>,
}

impl RoleDirectory {
    pub fn new(backend: Arc<dyn RoleBackend>) -> Self {
        Self { backend }
    }

    /// One page of roles filtered to custom roles. The filter runs after the
    /// server paginates, so `total` counts every role type.
    pub async fn list_custom_roles(&self, query: &RoleQuery) -> Result<CustomRolePage> {
        let page = self.backend.list_roles(query).await?;
        let data_source: Vec<RoleRecord> =
            page.list.into_iter().filter(RoleRecord::is_custom).collect();
        debug!(
            page_num = query.page_num,
            custom = data_source.len(),
            total = page.total,
            "listed roles"
        );
        Ok(CustomRolePage {
            data_source,
            total: page.total,
        })
    }

    pub async fn get_role(&self, id: &RecordId) -> Result<Option<RoleRecord>> {
        self.backend.get_role(id).await
    }

    /// Role names are unique per system. `editing_id` is the role being edited,
    /// or `None` when creating; a role never conflicts with itself.
    pub async fn check_role_name(
        &self,
        name: &str,
        system_id: Option<&RecordId>,
        editing_id: Option<&RecordId>,
    ) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }

        let Some(existing) = self.backend.find_role_by_name(name, system_id).await? else {
            return Ok(());
        };
        if existing.name != name {
            return Ok(());
        }

        match editing_id {
            Some(id) if id.as_text() == existing.id.as_text() => Ok(()),
            _ => Err(MenuError::DuplicateRoleName(name.to_string())),
        }
    }
}
