//! `defaultrole`: role granted to every authenticated user.

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
pub struct DefaultRoleProperties {
    pub role: String,
}

#[derive(Debug)]
pub struct DefaultRoleHandler {
    schema: AttributeMap,
}

impl DefaultRoleHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new().attribute(
                "role",
                AttributeSchema::required(AttributeType::String)
                    .describe("Role id granted to all authenticated users."),
            ),
        }
    }
}

impl Default for DefaultRoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for DefaultRoleHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::DefaultRole
    }

    fn public_name(&self) -> &'static str {
        "Default Role"
    }

    fn description(&self) -> &'static str {
        "Grants a role to every authenticated user in addition to the roles they \
         already have."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::DefaultRole)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::DefaultRole(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::DefaultRole(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new().string("role", &p.role).finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::DefaultRole(DefaultRoleProperties {
            role: r.string("role")?,
        }))
    }
}
