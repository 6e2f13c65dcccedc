//! `rapture.settings`: UI title, debug flag, polling intervals and timeouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, Validator};
use crate::version::ServerVersion;

pub const DEFAULT_TITLE: &str = "Sonatype Nexus Repository";
pub const DEFAULT_STATUS_INTERVAL_AUTHENTICATED: i32 = 5;
pub const DEFAULT_STATUS_INTERVAL_ANONYMOUS: i32 = 60;
pub const DEFAULT_SESSION_TIMEOUT: i32 = 30;
pub const DEFAULT_REQUEST_TIMEOUT: i32 = 60;
pub const DEFAULT_LONG_REQUEST_TIMEOUT: i32 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsProperties {
    pub title: String,
    pub debug_allowed: bool,
    pub status_interval_authenticated: i32,
    pub status_interval_anonymous: i32,
    pub session_timeout: i32,
    pub request_timeout: i32,
    pub long_request_timeout: i32,
}

impl Default for SettingsProperties {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            debug_allowed: true,
            status_interval_authenticated: DEFAULT_STATUS_INTERVAL_AUTHENTICATED,
            status_interval_anonymous: DEFAULT_STATUS_INTERVAL_ANONYMOUS,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            long_request_timeout: DEFAULT_LONG_REQUEST_TIMEOUT,
        }
    }
}

fn seconds(default: i32, description: &str) -> AttributeSchema {
    AttributeSchema::with_default(AttributeType::Int32, default)
        .validator(Validator::AtLeast { min: 0 })
        .describe(description)
}

#[derive(Debug)]
pub struct SettingsHandler {
    schema: AttributeMap,
}

impl SettingsHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new()
                .attribute(
                    "title",
                    AttributeSchema::with_default(AttributeType::String, DEFAULT_TITLE)
                        .describe("Browser page title."),
                )
                .attribute(
                    "debug_allowed",
                    AttributeSchema::with_default(AttributeType::Bool, true)
                        .describe("Allow the UI debug mode (`?debug`)."),
                )
                .attribute(
                    "status_interval_authenticated",
                    seconds(
                        DEFAULT_STATUS_INTERVAL_AUTHENTICATED,
                        "Status polling interval for signed-in users, in seconds.",
                    ),
                )
                .attribute(
                    "status_interval_anonymous",
                    seconds(
                        DEFAULT_STATUS_INTERVAL_ANONYMOUS,
                        "Status polling interval for anonymous users, in seconds.",
                    ),
                )
                .attribute(
                    "session_timeout",
                    seconds(DEFAULT_SESSION_TIMEOUT, "Idle session timeout, in minutes."),
                )
                .attribute(
                    "request_timeout",
                    seconds(DEFAULT_REQUEST_TIMEOUT, "UI request timeout, in seconds."),
                )
                .attribute(
                    "long_request_timeout",
                    seconds(
                        DEFAULT_LONG_REQUEST_TIMEOUT,
                        "Timeout for long-running UI requests, in seconds.",
                    ),
                ),
        }
    }
}

impl Default for SettingsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for SettingsHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::UiSettings
    }

    fn public_name(&self) -> &'static str {
        "UI Settings"
    }

    fn description(&self) -> &'static str {
        "Tunes the Nexus UI: page title, debug mode, status polling intervals and \
         request timeouts. Omitted properties fall back to the Nexus defaults."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Settings)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Settings(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::Settings(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new()
            .string("title", &p.title)
            .bool("debugAllowed", p.debug_allowed)
            .int("statusIntervalAuthenticated", p.status_interval_authenticated)
            .int("statusIntervalAnonymous", p.status_interval_anonymous)
            .int("sessionTimeout", p.session_timeout)
            .int("requestTimeout", p.request_timeout)
            .int("longRequestTimeout", p.long_request_timeout)
            .finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        let d = SettingsProperties::default();
        Ok(CapabilityProperties::Settings(SettingsProperties {
            title: r.string_or("title", &d.title),
            debug_allowed: r.bool_or("debugAllowed", d.debug_allowed)?,
            status_interval_authenticated: r
                .int_or("statusIntervalAuthenticated", d.status_interval_authenticated)?,
            status_interval_anonymous: r.int_or("statusIntervalAnonymous", d.status_interval_anonymous)?,
            session_timeout: r.int_or("sessionTimeout", d.session_timeout)?,
            request_timeout: r.int_or("requestTimeout", d.request_timeout)?,
            long_request_timeout: r.int_or("longRequestTimeout", d.long_request_timeout)?,
        }))
    }
}
