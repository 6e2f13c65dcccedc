//! `customs3regions`: extra region names offered for S3 blob stores.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter};
use crate::capability::{decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityProperties};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, Validator};
use crate::version::ServerVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomS3RegionsProperties {
    pub regions: BTreeSet<String>,
}

#[derive(Debug)]
pub struct CustomS3RegionsHandler {
    schema: AttributeMap,
}

impl CustomS3RegionsHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new().attribute(
                "regions",
                AttributeSchema::required(AttributeType::StringSet)
                    .validator(Validator::MinSetSize { min: 1 })
                    .describe("Region identifiers to offer in the S3 blob store region list."),
            ),
        }
    }
}

impl Default for CustomS3RegionsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for CustomS3RegionsHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::CustomS3Regions
    }

    fn public_name(&self) -> &'static str {
        "Custom S3 Regions"
    }

    fn description(&self) -> &'static str {
        "Adds custom regions to the region list of S3 blob stores, for S3-compatible \
         storage that uses non-AWS region names."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::CustomS3Regions)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::CustomS3Regions(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::CustomS3Regions(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new().set("regions", &p.regions).finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::CustomS3Regions(CustomS3RegionsProperties {
            regions: r.set("regions"),
        }))
    }
}
