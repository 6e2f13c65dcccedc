//! `baseurl`: the externally visible URL of the server.

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
pub struct BaseUrlProperties {
    pub url: String,
}

#[derive(Debug)]
pub struct BaseUrlHandler {
    schema: AttributeMap,
}

impl BaseUrlHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new().attribute(
                "url",
                AttributeSchema::required(AttributeType::String)
                    .validator(Validator::regex(URL_PATTERN))
                    .describe("Base URL used to build absolute links, e.g. `https://nexus.example.com/`."),
            ),
        }
    }
}

impl Default for BaseUrlHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for BaseUrlHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::BaseUrl
    }

    fn public_name(&self) -> &'static str {
        "Base URL"
    }

    fn description(&self) -> &'static str {
        "Sets the base URL Nexus uses when it generates absolute links, for example \
         behind a reverse proxy."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::BaseUrl)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::BaseUrl(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::BaseUrl(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new().string("url", &p.url).finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::BaseUrl(BaseUrlProperties {
            url: r.string("url")?,
        }))
    }
}
