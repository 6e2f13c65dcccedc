//! `OutreachManagementCapability`: welcome page / outreach content source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter, URL_PATTERN};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, Validator};
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutreachProperties {
    pub override_url: Option<String>,
    pub always_remote: bool,
}

#[derive(Debug)]
pub struct OutreachHandler {
    schema: AttributeMap,
}

impl OutreachHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new()
                .attribute(
                    "override_url",
                    AttributeSchema::optional(AttributeType::String)
                        .validator(Validator::regex(URL_PATTERN))
                        .describe("Alternative location for outreach content."),
                )
                .attribute(
                    "always_remote",
                    AttributeSchema::with_default(AttributeType::Bool, false)
                        .describe("Always load outreach content from the remote location."),
                ),
        }
    }
}

impl Default for OutreachHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for OutreachHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::OutreachManagement
    }

    fn public_name(&self) -> &'static str {
        "Outreach Management"
    }

    fn description(&self) -> &'static str {
        "Controls where Nexus loads the outreach content shown on the welcome page."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Outreach)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Outreach(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::Outreach(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new()
            .optional_string("overrideUrl", p.override_url.as_deref())
            .bool("alwaysRemote", p.always_remote)
            .finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::Outreach(OutreachProperties {
            override_url: r.optional_string("overrideUrl"),
            always_remote: r.bool_or("alwaysRemote", false)?,
        }))
    }
}
