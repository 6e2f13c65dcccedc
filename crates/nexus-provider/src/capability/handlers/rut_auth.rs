//! `rutauth`: authenticate users from a trusted HTTP header set by a proxy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, Validator};
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RutAuthProperties {
    pub http_header: String,
}

#[derive(Debug)]
pub struct RutAuthHandler {
    schema: AttributeMap,
}

impl RutAuthHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new().attribute(
                "http_header",
                AttributeSchema::required(AttributeType::String)
                    .validator(Validator::MinLength { min: 1 })
                    .describe("Header carrying the remote user name, e.g. `X-Forwarded-User`."),
            ),
        }
    }
}

impl Default for RutAuthHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for RutAuthHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::RutAuth
    }

    fn public_name(&self) -> &'static str {
        "Rut Auth"
    }

    fn description(&self) -> &'static str {
        "Remote user token authentication: trust a user name supplied in an HTTP \
         header by an authenticating reverse proxy. The `Rut Auth` realm must also be active."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::RutAuth)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::RutAuth(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::RutAuth(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new().string("httpHeader", &p.http_header).finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::RutAuth(RutAuthProperties {
            http_header: r.string("httpHeader")?,
        }))
    }
}
