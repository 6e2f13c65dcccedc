//! Capability kinds, the internal model and the per-kind handler contract.
//!
//! Every kind is served by one [`CapabilityHandler`]. The generic resource in
//! `resource::capability` only ever talks to this trait; per-kind knowledge
//! (schema, wire property names, sensitive fields) stays in `handlers`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{ProviderError, ProviderResult};
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, PlanModifier, Resolve, ResourceSchema};
use crate::types::CapabilityDto;
use crate::version::ServerVersion;

pub mod handlers;
pub mod registry;
pub(crate) mod timestamp;

pub use handlers::{
    AuditProperties, BaseUrlProperties, BrandingProperties, CustomS3RegionsProperties,
    DefaultRoleProperties, FirewallAuditProperties, HealthcheckProperties, OutreachProperties,
    RutAuthProperties, SettingsProperties, WebhookProperties,
};
pub use registry::{registry, CapabilityRegistry};
pub use timestamp::{format_last_updated, parse_last_updated};

/// Prefix of every capability resource type name.
pub const RESOURCE_PREFIX: &str = "capability_";

/// Server-recognised capability type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    Audit,
    BaseUrl,
    CustomS3Regions,
    DefaultRole,
    FirewallAudit,
    Healthcheck,
    OutreachManagement,
    RutAuth,
    UiBranding,
    UiSettings,
    WebhookGlobal,
    WebhookRepository,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 12] = [
        Self::Audit,
        Self::BaseUrl,
        Self::CustomS3Regions,
        Self::DefaultRole,
        Self::FirewallAudit,
        Self::Healthcheck,
        Self::OutreachManagement,
        Self::RutAuth,
        Self::UiBranding,
        Self::UiSettings,
        Self::WebhookGlobal,
        Self::WebhookRepository,
    ];

    /// Identifier sent as `typeId`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::BaseUrl => "baseurl",
            Self::CustomS3Regions => "customs3regions",
            Self::DefaultRole => "defaultrole",
            Self::FirewallAudit => "firewall.audit",
            Self::Healthcheck => "healthcheck",
            Self::OutreachManagement => "OutreachManagementCapability",
            Self::RutAuth => "rutauth",
            Self::UiBranding => "rapture.branding",
            Self::UiSettings => "rapture.settings",
            Self::WebhookGlobal => "webhook.global",
            Self::WebhookRepository => "webhook.repository",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProviderError::programming(format!("unknown capability type {s:?}")))
    }
}

/// Kind-specific properties. Closed: adding a kind means adding a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityProperties {
    Audit(AuditProperties),
    BaseUrl(BaseUrlProperties),
    CustomS3Regions(CustomS3RegionsProperties),
    DefaultRole(DefaultRoleProperties),
    FirewallAudit(FirewallAuditProperties),
    Healthcheck(HealthcheckProperties),
    Outreach(OutreachProperties),
    RutAuth(RutAuthProperties),
    Branding(BrandingProperties),
    Settings(SettingsProperties),
    Webhook(WebhookProperties),
}

impl CapabilityProperties {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Audit(_) => "Audit",
            Self::BaseUrl(_) => "BaseUrl",
            Self::CustomS3Regions(_) => "CustomS3Regions",
            Self::DefaultRole(_) => "DefaultRole",
            Self::FirewallAudit(_) => "FirewallAudit",
            Self::Healthcheck(_) => "Healthcheck",
            Self::Outreach(_) => "Outreach",
            Self::RutAuth(_) => "RutAuth",
            Self::Branding(_) => "Branding",
            Self::Settings(_) => "Settings",
            Self::Webhook(_) => "Webhook",
        }
    }
}

/// Internal representation of one capability instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityModel {
    pub id: Option<String>,
    pub notes: Option<String>,
    pub enabled: bool,
    pub last_updated: Option<String>,
    pub properties: CapabilityProperties,
}

/// Lowercase, collapse every run of non-alphanumerics into `_`, trim `_`.
pub fn sanitise(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Attributes shared by every capability resource.
pub fn common_attributes() -> AttributeMap {
    AttributeMap::new()
        .attribute(
            "id",
            AttributeSchema::computed(AttributeType::String)
                .plan_modifier(PlanModifier::UseStateForUnknown)
                .describe("Identifier assigned by the server."),
        )
        .attribute(
            "notes",
            AttributeSchema::optional(AttributeType::String)
                .describe("Free-text notes stored with the capability."),
        )
        .attribute(
            "enabled",
            AttributeSchema::required(AttributeType::Bool)
                .describe("Whether the capability is enabled."),
        )
        .attribute(
            "last_updated",
            AttributeSchema::computed(AttributeType::String)
                .describe("Time of the last successful apply."),
        )
}

/// Per-kind behaviour behind the generic capability resource.
///
/// Implementors supply identity, the `properties` schema, and the mapping
/// between typed properties, plan/state JSON and wire properties. The
/// provided methods build the full lifecycle on top of those.
pub trait CapabilityHandler: Send + Sync + fmt::Debug {
    fn kind(&self) -> CapabilityKind;

    fn public_name(&self) -> &'static str;

    /// Markdown documentation.
    fn description(&self) -> &'static str;

    fn properties_schema(&self) -> &AttributeMap;

    /// Typed properties from a resolved `properties` object.
    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties>;

    /// `properties` object for plan/state JSON.
    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>>;

    /// Wire properties for create/update payloads.
    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>>;

    /// Typed properties from a server response.
    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties>;

    /// Copy values the server never returns from `plan` into `state`.
    fn preserve_sensitive(&self, _plan: &CapabilityModel, _state: &mut CapabilityModel) {}

    fn resource_name(&self) -> String {
        format!("{RESOURCE_PREFIX}{}", sanitise(self.public_name()))
    }

    fn resource_schema(&self) -> ResourceSchema {
        ResourceSchema {
            description: self.description().to_string(),
            attributes: common_attributes(),
            properties: Some(self.properties_schema().clone()),
        }
    }

    fn plan_as_model(&self, plan: &Value) -> ProviderResult<CapabilityModel> {
        model_from_value(self, plan, Resolve::Plan)
    }

    fn state_as_model(&self, state: &Value) -> ProviderResult<CapabilityModel> {
        model_from_value(self, state, Resolve::State)
    }

    /// Plan or state JSON for `model`.
    fn model_to_value(&self, model: &CapabilityModel) -> ProviderResult<Value> {
        Ok(json!({
            "id": model.id,
            "notes": model.notes,
            "enabled": model.enabled,
            "last_updated": model.last_updated,
            "properties": Value::Object(self.encode_properties(&model.properties)?),
        }))
    }

    fn to_create_payload(
        &self,
        model: &CapabilityModel,
        version: &ServerVersion,
    ) -> ProviderResult<CapabilityDto> {
        Ok(CapabilityDto {
            id: None,
            type_id: self.kind().as_str().to_string(),
            notes: model.notes.clone(),
            enabled: model.enabled,
            properties: self.properties_to_api(&model.properties, version)?,
        })
    }

    fn to_update_payload(
        &self,
        model: &CapabilityModel,
        version: &ServerVersion,
    ) -> ProviderResult<CapabilityDto> {
        let id = model
            .id
            .clone()
            .ok_or_else(|| ProviderError::programming("update payload built without an id"))?;
        Ok(CapabilityDto {
            id: Some(id),
            ..self.to_create_payload(model, version)?
        })
    }

    /// Overwrite `model` with the server's view; `last_updated` is untouched.
    fn from_server_dto(&self, model: &mut CapabilityModel, dto: &CapabilityDto) -> ProviderResult<()> {
        if dto.type_id != self.kind().as_str() {
            return Err(ProviderError::programming(format!(
                "capability {} has type {:?}, expected {:?}",
                dto.id.as_deref().unwrap_or("<new>"),
                dto.type_id,
                self.kind().as_str()
            )));
        }
        if dto.id.is_some() {
            model.id.clone_from(&dto.id);
        }
        model.notes = dto.notes.clone().filter(|n| !n.is_empty());
        model.enabled = dto.enabled;
        model.properties = self.properties_from_api(&dto.properties)?;
        Ok(())
    }

    fn stamp_plan_for_state(&self, plan: &mut CapabilityModel) {
        plan.last_updated = Some(timestamp::advance(plan.last_updated.as_deref()));
    }

    /// Reconcile `state` with a server response.
    ///
    /// A state that already carries `last_updated` keeps it (reads do not
    /// advance the stamp); a fresh state (import) is stamped.
    fn merge_api_into_state(&self, state: &mut CapabilityModel, dto: &CapabilityDto) -> ProviderResult<()> {
        self.from_server_dto(state, dto)?;
        if state.last_updated.is_none() {
            self.stamp_plan_for_state(state);
        }
        Ok(())
    }

    /// Carry `id` (and the prior stamp, so it only moves forward) from state onto plan.
    fn merge_plan_for_update(&self, plan: &mut CapabilityModel, state: &CapabilityModel) {
        plan.id.clone_from(&state.id);
        plan.last_updated = match (&plan.last_updated, &state.last_updated) {
            (Some(p), Some(s)) => Some(timestamp::later(p, s).to_string()),
            (p, s) => p.clone().or_else(|| s.clone()),
        };
        self.stamp_plan_for_state(plan);
    }
}

fn model_from_value<H>(handler: &H, value: &Value, mode: Resolve) -> ProviderResult<CapabilityModel>
where
    H: CapabilityHandler + ?Sized,
{
    let object = value.as_object().ok_or_else(|| {
        ProviderError::programming(format!("{}: expected an object", handler.resource_name()))
    })?;

    let mut common = object.clone();
    let properties = common.remove("properties");
    let common = common_attributes().resolve("", &common, mode)?;

    let properties = match properties {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ProviderError::programming(format!(
                "properties: expected an object, got {other}"
            )))
        }
    };
    let mut properties = handler
        .properties_schema()
        .resolve("properties", &properties, mode)?;
    if mode == Resolve::State {
        // Partial state: absent properties fall back to the struct defaults.
        properties.retain(|_, value| !value.is_null());
    }

    Ok(CapabilityModel {
        id: string_field(&common, "id"),
        notes: string_field(&common, "notes").filter(|n| !n.is_empty()),
        enabled: common.get("enabled").and_then(Value::as_bool).unwrap_or(false),
        last_updated: string_field(&common, "last_updated"),
        properties: handler.decode_properties(properties)?,
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// Decode a resolved `properties` object into a typed struct.
pub(crate) fn decode<T: DeserializeOwned>(properties: Map<String, Value>) -> ProviderResult<T> {
    serde_json::from_value(Value::Object(properties))
        .map_err(|e| ProviderError::programming(format!("properties: {e}")))
}

/// Encode a typed struct as a `properties` object.
pub(crate) fn encode<T: Serialize>(properties: &T) -> ProviderResult<Map<String, Value>> {
    match serde_json::to_value(properties) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::programming(format!(
            "properties encoded as {other}, expected an object"
        ))),
        Err(e) => Err(ProviderError::programming(format!("properties: {e}"))),
    }
}

/// Error for a handler handed another kind's properties.
pub(crate) fn wrong_variant(kind: CapabilityKind, got: &CapabilityProperties) -> ProviderError {
    ProviderError::programming(format!(
        "{kind} handler received {} properties",
        got.variant_name()
    ))
}
