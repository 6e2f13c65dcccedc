//! `firewall.audit`: Firewall audit and quarantine for one proxy repository.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, PlanModifier};
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirewallAuditProperties {
    pub repository: String,
    pub quarantine: bool,
}

#[derive(Debug)]
pub struct FirewallAuditHandler {
    schema: AttributeMap,
}

impl FirewallAuditHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new()
                .attribute(
                    "repository",
                    AttributeSchema::required(AttributeType::String)
                        .plan_modifier(PlanModifier::RequiresReplace)
                        .describe("Proxy repository to audit."),
                )
                .attribute(
                    "quarantine",
                    AttributeSchema::required(AttributeType::Bool).describe(
                        "Quarantine components that violate policy. Turning this off cannot be undone.",
                    ),
                ),
        }
    }
}

impl Default for FirewallAuditHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for FirewallAuditHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::FirewallAudit
    }

    fn public_name(&self) -> &'static str {
        "Firewall Audit and Quarantine"
    }

    fn description(&self) -> &'static str {
        "Enables Sonatype Firewall audit for a proxy repository and, optionally, \
         quarantine of components that violate policy.\n\n\
         **Warning:** disabling quarantine is irreversible. Components released while \
         quarantine is off are not quarantined again when it is turned back on."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::FirewallAudit)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::FirewallAudit(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::FirewallAudit(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new()
            .string("repository", &p.repository)
            .bool("quarantine", p.quarantine)
            .finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::FirewallAudit(FirewallAuditProperties {
            repository: r.string("repository")?,
            quarantine: r.bool_or("quarantine", false)?,
        }))
    }
}
