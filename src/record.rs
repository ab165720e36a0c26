//! Flat menu/permission records as served by `/userMenus` and
//! `/userCollectMenus`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `type` value of a navigable menu entry.
pub const MENU_TYPE_MENU: i64 = 1;
/// `type` value of a permission-code entry.
pub const MENU_TYPE_PERMISSION: i64 = 2;
/// `_target` value marking a micro-frontend mount point.
pub const QIANKUN_TARGET: &str = "qiankun";

/// Record identifier. Endpoints disagree on numeric vs string ids, so both
/// are accepted and compared through [`RecordId::as_text`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// The same identifier in textual form.
    pub fn into_text(self) -> Self {
        match self {
            Self::Int(n) => Self::Text(n.to_string()),
            text => text,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Wire `type`. Whole numbers are classified; any other value is carried
/// through verbatim and only counts when falsy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordType {
    Code(i64),
    Other(Value),
}

impl RecordType {
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Code(n) => Some(*n),
            Self::Other(Value::Number(n)) => whole_number(n),
            Self::Other(_) => None,
        }
    }

    /// `0`, `false` and `""`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Code(n) => *n == 0,
            Self::Other(Value::Null) => true,
            Self::Other(Value::Bool(b)) => !b,
            Self::Other(Value::Number(n)) => n.as_f64() == Some(0.0),
            Self::Other(Value::String(s)) => s.is_empty(),
            Self::Other(_) => false,
        }
    }
}

impl From<i64> for RecordType {
    fn from(value: i64) -> Self {
        Self::Code(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub menu_type: Option<RecordType>,
    #[serde(
        default,
        deserialize_with = "deserialize_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub ord: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub sort: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(rename = "_target", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_collected_menu: bool,
    /// Server fields this crate does not interpret, carried through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuRecord {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            title: None,
            menu_type: None,
            order: None,
            ord: None,
            sort: None,
            code: None,
            path: None,
            name: None,
            entry: None,
            target: None,
            is_collected_menu: false,
            extra: Map::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<RecordId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_type(mut self, menu_type: i64) -> Self {
        self.menu_type = Some(RecordType::Code(menu_type));
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Numeric `type`, if the server sent one.
    pub fn type_code(&self) -> Option<i64> {
        self.menu_type.as_ref().and_then(RecordType::code)
    }

    pub fn is_mount_point(&self) -> bool {
        self.target.as_deref() == Some(QIANKUN_TARGET)
    }
}

fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Order fields accept whole numbers and numeric strings. Anything else
/// leaves the record unordered instead of failing the whole response.
fn deserialize_order<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => whole_number(&n),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
