//! `audit`: server-side auditing on/off. Only `enabled` matters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::AttributeMap;
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditProperties {}

#[derive(Debug, Default)]
pub struct AuditHandler {
    schema: AttributeMap,
}

impl AuditHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityHandler for AuditHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Audit
    }

    fn public_name(&self) -> &'static str {
        "Audit"
    }

    fn description(&self) -> &'static str {
        "Enables or disables the Nexus audit log. The capability has no properties; \
         toggle it with `enabled`."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Audit)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Audit(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        match properties {
            CapabilityProperties::Audit(_) => Ok(BTreeMap::new()),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_from_api(&self, _api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        Ok(CapabilityProperties::Audit(AuditProperties {}))
    }
}
