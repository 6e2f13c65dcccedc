//! Provider configuration and the JSON payloads exchanged with the server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// Capability payload as sent to and returned by `/v1/capabilities`.
///
/// Every property value is a string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Capability kind identifier (e.g. "baseurl").
    pub type_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Content selector payload for `/v1/security/content-selectors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSelectorDto {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub expression: String,
}

/// Body for `PUT /v1/security/content-selectors/{name}` (name lives in the path).
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ContentSelectorUpdateDto<'a> {
    pub description: &'a str,
    pub expression: &'a str,
}

/// Provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Nexus instance, without the `/service/rest` suffix.
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Version hint (`Nexus/3.84.0-01 (OSS)` or `3.84.0-01`), overrides the probed header.
    #[serde(default)]
    pub server_version: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
}

// Keeps the password out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("server_version", &self.server_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("insecure", &self.insecure)
            .finish()
    }
}

fn default_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: String::new(),
            password: String::new(),
            server_version: None,
            timeout_secs: default_timeout(),
            insecure: false,
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `NEXUS_URL` | Server base URL |
    /// | `NEXUS_USERNAME` | Basic auth user |
    /// | `NEXUS_PASSWORD` | Basic auth password |
    /// | `NEXUS_VERSION` | Server version hint |
    /// | `NEXUS_TIMEOUT` | Request timeout in seconds |
    /// | `NEXUS_INSECURE` | Skip TLS verification |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("NEXUS_URL").unwrap_or_else(|_| default_url()),
            username: std::env::var("NEXUS_USERNAME").unwrap_or_default(),
            password: std::env::var("NEXUS_PASSWORD").unwrap_or_default(),
            server_version: std::env::var("NEXUS_VERSION")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_secs: std::env::var("NEXUS_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            insecure: std::env::var("NEXUS_INSECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Check required fields before building a client.
    pub fn validate(&self) -> ProviderResult<()> {
        let parsed = url::Url::parse(&self.url).map_err(|e| ProviderError::Config {
            message: format!("invalid url {:?}: {}", self.url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Config {
                message: format!("url must use http or https, got {}", parsed.scheme()),
            });
        }
        if self.username.is_empty() {
            return Err(ProviderError::Config {
                message: "username is required".to_string(),
            });
        }
        if self.password.is_empty() {
            return Err(ProviderError::Config {
                message: "password is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_capability_dto_wire_shape() {
        let dto = CapabilityDto {
            id: None,
            type_id: "baseurl".to_string(),
            notes: None,
            enabled: true,
            properties: BTreeMap::from([("url".to_string(), "https://example.test/".to_string())]),
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(
            json,
            r#"{"typeId":"baseurl","enabled":true,"properties":{"url":"https://example.test/"}}"#
        );
    }

    #[test]
    fn test_capability_dto_tolerates_missing_fields() {
        let dto: CapabilityDto = serde_json::from_str(r#"{"id":"cap-1","typeId":"audit"}"#).unwrap();
        assert_eq!(dto.id.as_deref(), Some("cap-1"));
        assert!(!dto.enabled);
        assert!(dto.properties.is_empty());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("NEXUS_URL", "https://nexus.example.test");
        std::env::set_var("NEXUS_USERNAME", "admin");
        std::env::set_var("NEXUS_PASSWORD", "admin123");
        std::env::set_var("NEXUS_VERSION", "Nexus/3.84.0-01 (PRO)");
        std::env::set_var("NEXUS_INSECURE", "true");

        let config = ProviderConfig::from_env();
        assert_eq!(config.url, "https://nexus.example.test");
        assert_eq!(config.username, "admin");
        assert_eq!(config.server_version.as_deref(), Some("Nexus/3.84.0-01 (PRO)"));
        assert!(config.insecure);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());

        for var in [
            "NEXUS_URL",
            "NEXUS_USERNAME",
            "NEXUS_PASSWORD",
            "NEXUS_VERSION",
            "NEXUS_INSECURE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_config_validation() {
        let missing_user = ProviderConfig::default();
        assert!(matches!(
            missing_user.validate(),
            Err(ProviderError::Config { .. })
        ));

        let bad_scheme = ProviderConfig::default()
            .with_url("ftp://nexus")
            .with_credentials("admin", "pw");
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ProviderConfig::default().with_credentials("admin", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
