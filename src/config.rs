//! Pipeline configuration
//!
//! Loaded from the process environment (and `.env` when present).

use std::time::Duration;

use tracing::info;
use url::Url;

use crate::error::{MenuError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: Url,
    /// Mock mode: `get_menus` yields once before querying so request
    /// interception installed on the same runtime gets to attach.
    pub mock_mode: bool,
    pub request_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            mock_mode: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `ADMIN_API_BASE_URL`, `ADMIN_MOCK` and `ADMIN_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("ADMIN_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mock_mode = lookup("ADMIN_MOCK").map(|v| is_truthy(&v)).unwrap_or(false);
        let timeout_secs = match lookup("ADMIN_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                MenuError::Config(format!("ADMIN_HTTP_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url: parse_base_url(&base_url)?,
            mock_mode,
            request_timeout: Duration::from_secs(timeout_secs),
        };
        info!(
            base_url = %config.base_url,
            mock_mode = config.mock_mode,
            "Loaded pipeline configuration"
        );
        Ok(config)
    }

    pub fn with_mock_mode(mut self, mock_mode: bool) -> Self {
        self.mock_mode = mock_mode;
        self
    }

    /// Join an endpoint path (`/userMenus`, `/roles/7`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| MenuError::Config(format!("cannot build url for {path}: {e}")))
    }

    /// `endpoint(path)` followed by `id` as one percent-encoded segment.
    pub fn resource(&self, path: &str, id: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        let display = url.to_string();
        url.path_segments_mut()
            .map_err(|_| MenuError::Config(format!("cannot append a segment to {display}")))?
            .push(id);
        Ok(url)
    }
}

/// Base URLs are treated as directories so relative joins keep their path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| MenuError::Config(format!("invalid base url {raw}: {e}")))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = PipelineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/api/");
        assert!(!config.mock_mode);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_all_variables() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("ADMIN_API_BASE_URL", "https://admin.example.com/v1"),
            ("ADMIN_MOCK", "TRUE"),
            ("ADMIN_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://admin.example.com/v1/");
        assert!(config.mock_mode);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err =
            PipelineConfig::from_lookup(lookup_from(&[("ADMIN_HTTP_TIMEOUT_SECS", "soon")]))
                .unwrap_err();
        assert!(matches!(err, MenuError::Config(_)));
    }

    #[test]
    fn resource_escapes_the_id() {
        let config = PipelineConfig::new("http://localhost:8080/api").unwrap();
        assert_eq!(
            config.resource("/roles", "7").unwrap().as_str(),
            "http://localhost:8080/api/roles/7"
        );
        assert_eq!(
            config.resource("/roles", "ops/eu?x#y").unwrap().as_str(),
            "http://localhost:8080/api/roles/ops%2Feu%3Fx%23y"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = PipelineConfig::new("not a url").unwrap_err();
        assert!(matches!(err, MenuError::Config(_)));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let config = PipelineConfig::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            config.endpoint("/userMenus").unwrap().as_str(),
            "http://localhost:3000/api/userMenus"
        );
        assert_eq!(
            config.endpoint("roles/7").unwrap().as_str(),
            "http://localhost:3000/api/roles/7"
        );
    }

    #[test]
    fn mock_flag_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" yes "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
