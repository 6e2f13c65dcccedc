//! `healthcheck`: Repository Health Check for proxy repositories.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType};
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthcheckProperties {
    pub configured_for_all_proxies: bool,
    pub use_nexus_truststore: bool,
}

#[derive(Debug)]
pub struct HealthcheckHandler {
    schema: AttributeMap,
}

impl HealthcheckHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new()
                .attribute(
                    "configured_for_all_proxies",
                    AttributeSchema::with_default(AttributeType::Bool, false)
                        .describe("Analyze every proxy repository."),
                )
                .attribute(
                    "use_nexus_truststore",
                    AttributeSchema::with_default(AttributeType::Bool, false)
                        .describe("Use the Nexus truststore for health check connections."),
                ),
        }
    }
}

impl Default for HealthcheckHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for HealthcheckHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Healthcheck
    }

    fn public_name(&self) -> &'static str {
        "Healthcheck"
    }

    fn description(&self) -> &'static str {
        "Configures Repository Health Check analysis of proxied components."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Healthcheck)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Healthcheck(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::Healthcheck(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new()
            .bool("configuredForAllProxies", p.configured_for_all_proxies)
            .bool("useNexusTruststore", p.use_nexus_truststore)
            .finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::Healthcheck(HealthcheckProperties {
            configured_for_all_proxies: r.bool_or("configuredForAllProxies", false)?,
            use_nexus_truststore: r.bool_or("useNexusTruststore", false)?,
        }))
    }
}
