//! One handler per capability kind, plus the wire-property helpers they share.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ProviderError, ProviderResult};

use super::{CapabilityHandler, CapabilityKind};

mod audit;
mod base_url;
mod branding;
mod custom_s3_regions;
mod default_role;
mod firewall_audit;
mod healthcheck;
mod outreach;
mod rut_auth;
mod settings;
mod webhook;

pub use audit::{AuditHandler, AuditProperties};
pub use base_url::{BaseUrlHandler, BaseUrlProperties};
pub use branding::{BrandingHandler, BrandingProperties};
pub use custom_s3_regions::{CustomS3RegionsHandler, CustomS3RegionsProperties};
pub use default_role::{DefaultRoleHandler, DefaultRoleProperties};
pub use firewall_audit::{FirewallAuditHandler, FirewallAuditProperties};
pub use healthcheck::{HealthcheckHandler, HealthcheckProperties};
pub use outreach::{OutreachHandler, OutreachProperties};
pub use rut_auth::{RutAuthHandler, RutAuthProperties};
pub use settings::{SettingsHandler, SettingsProperties};
pub use webhook::{WebhookHandler, WebhookProperties, WebhookScope};

/// URL pattern shared by every URL-valued property.
pub const URL_PATTERN: &str = r"^https?://\S+$";

/// Placeholder Nexus returns instead of stored secrets.
pub const SECRET_PLACEHOLDER: &str = "#~NXRM~PLACEHOLDER~PASSWORD~#";

/// Every built-in handler, one per [`CapabilityKind`].
pub fn builtin() -> Vec<Box<dyn CapabilityHandler>> {
    vec![
        Box::new(AuditHandler::new()),
        Box::new(BaseUrlHandler::new()),
        Box::new(CustomS3RegionsHandler::new()),
        Box::new(DefaultRoleHandler::new()),
        Box::new(FirewallAuditHandler::new()),
        Box::new(HealthcheckHandler::new()),
        Box::new(OutreachHandler::new()),
        Box::new(RutAuthHandler::new()),
        Box::new(BrandingHandler::new()),
        Box::new(SettingsHandler::new()),
        Box::new(WebhookHandler::new(WebhookScope::Global)),
        Box::new(WebhookHandler::new(WebhookScope::Repository)),
    ]
}

/// Typed access to the string-valued properties of a server response.
pub(crate) struct WireReader<'a> {
    kind: CapabilityKind,
    api: &'a BTreeMap<String, String>,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(kind: CapabilityKind, api: &'a BTreeMap<String, String>) -> Self {
        Self { kind, api }
    }

    fn invalid(&self, key: &str, message: impl std::fmt::Display) -> ProviderError {
        ProviderError::InvalidResponse {
            message: format!("{} property {key}: {message}", self.kind),
        }
    }

    pub(crate) fn string(&self, key: &str) -> ProviderResult<String> {
        self.api
            .get(key)
            .cloned()
            .ok_or_else(|| self.invalid(key, "missing from response"))
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> String {
        self.api
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Missing and empty both read as `None`.
    pub(crate) fn optional_string(&self, key: &str) -> Option<String> {
        self.api.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub(crate) fn bool(&self, key: &str) -> ProviderResult<bool> {
        let raw = self.string(key)?;
        parse_bool(&raw).ok_or_else(|| self.invalid(key, format!("expected true/false, got {raw:?}")))
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> ProviderResult<bool> {
        match self.api.get(key).filter(|v| !v.is_empty()) {
            Some(_) => self.bool(key),
            None => Ok(default),
        }
    }

    pub(crate) fn int_or(&self, key: &str, default: i32) -> ProviderResult<i32> {
        match self.api.get(key).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| self.invalid(key, format!("expected 32-bit integer, got {raw:?}: {e}"))),
            None => Ok(default),
        }
    }

    /// Comma-separated list; blanks dropped.
    pub(crate) fn set(&self, key: &str) -> BTreeSet<String> {
        self.api
            .get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Builder for the string-valued properties of a payload.
#[derive(Debug, Default)]
pub(crate) struct WireWriter(BTreeMap<String, String>);

impl WireWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn string(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub(crate) fn optional_string(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.string(key, value),
            None => self,
        }
    }

    pub(crate) fn bool(self, key: &str, value: bool) -> Self {
        self.string(key, if value { "true" } else { "false" })
    }

    pub(crate) fn int(self, key: &str, value: i32) -> Self {
        self.string(key, &value.to_string())
    }

    pub(crate) fn set(self, key: &str, values: &BTreeSet<String>) -> Self {
        let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        self.string(key, &joined)
    }

    pub(crate) fn finish(self) -> BTreeMap<String, String> {
        self.0
    }
}
