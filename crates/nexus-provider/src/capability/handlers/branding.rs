//! `rapture.branding`: custom HTML header and footer in the UI.

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
pub struct BrandingProperties {
    pub header_enabled: bool,
    pub header_html: String,
    pub footer_enabled: bool,
    pub footer_html: String,
}

#[derive(Debug)]
pub struct BrandingHandler {
    schema: AttributeMap,
}

impl BrandingHandler {
    pub fn new() -> Self {
        Self {
            schema: AttributeMap::new()
                .attribute(
                    "header_enabled",
                    AttributeSchema::with_default(AttributeType::Bool, false)
                        .describe("Show the custom header."),
                )
                .attribute(
                    "header_html",
                    AttributeSchema::with_default(AttributeType::String, "")
                        .describe("HTML rendered above the UI."),
                )
                .attribute(
                    "footer_enabled",
                    AttributeSchema::with_default(AttributeType::Bool, false)
                        .describe("Show the custom footer."),
                )
                .attribute(
                    "footer_html",
                    AttributeSchema::with_default(AttributeType::String, "")
                        .describe("HTML rendered below the UI."),
                ),
        }
    }
}

impl Default for BrandingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityHandler for BrandingHandler {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::UiBranding
    }

    fn public_name(&self) -> &'static str {
        "UI Branding"
    }

    fn description(&self) -> &'static str {
        "Adds a custom HTML header and/or footer to every page of the Nexus UI."
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Branding)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Branding(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::Branding(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        Ok(WireWriter::new()
            .bool("headerEnabled", p.header_enabled)
            .string("headerHtml", &p.header_html)
            .bool("footerEnabled", p.footer_enabled)
            .string("footerHtml", &p.footer_html)
            .finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        Ok(CapabilityProperties::Branding(BrandingProperties {
            header_enabled: r.bool_or("headerEnabled", false)?,
            header_html: r.string_or("headerHtml", ""),
            footer_enabled: r.bool_or("footerEnabled", false)?,
            footer_html: r.string_or("footerHtml", ""),
        }))
    }
}
