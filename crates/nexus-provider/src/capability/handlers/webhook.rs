//! `webhook.global` and `webhook.repository`: event notifications over HTTP.
//!
//! Both kinds share one schema shape. The server never returns `secret`, so
//! the handler carries it over from the plan after every operation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{WireReader, WireWriter, SECRET_PLACEHOLDER, URL_PATTERN};
use crate::capability::{
    decode, encode, wrong_variant, CapabilityHandler, CapabilityKind, CapabilityModel, CapabilityProperties,
};
use crate::error::ProviderResult;
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, PlanModifier, Validator};
use crate::version::ServerVersion;

/// Event types for `webhook.global`.
pub const GLOBAL_EVENTS: [&str; 2] = ["audit", "repository"];
/// Event types for `webhook.repository`.
pub const REPOSITORY_EVENTS: [&str; 2] = ["asset", "component"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookScope {
    Global,
    Repository,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookProperties {
    pub url: String,
    pub events: BTreeSet<String>,
    pub secret: Option<String>,
    /// Only for `webhook.repository`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug)]
pub struct WebhookHandler {
    scope: WebhookScope,
    schema: AttributeMap,
}

impl WebhookHandler {
    pub fn new(scope: WebhookScope) -> Self {
        let events = match scope {
            WebhookScope::Global => GLOBAL_EVENTS,
            WebhookScope::Repository => REPOSITORY_EVENTS,
        };

        let mut schema = AttributeMap::new()
            .attribute(
                "url",
                AttributeSchema::required(AttributeType::String)
                    .validator(Validator::regex(URL_PATTERN))
                    .describe("Endpoint that receives the webhook POST requests."),
            )
            .attribute(
                "events",
                AttributeSchema::required(AttributeType::StringSet)
                    .validator(Validator::MinSetSize { min: 1 })
                    .validator(Validator::SetMembers {
                        values: events.to_vec(),
                    })
                    .describe(format!("Event types to send: {}.", events.join(", "))),
            )
            .attribute(
                "secret",
                AttributeSchema::optional(AttributeType::String)
                    .sensitive()
                    .describe("Key for the HMAC-SHA1 `X-Nexus-Webhook-Signature` header. Never returned by the server."),
            );

        if scope == WebhookScope::Repository {
            schema = schema.attribute(
                "repository",
                AttributeSchema::required(AttributeType::String)
                    .plan_modifier(PlanModifier::RequiresReplace)
                    .describe("Repository whose events are sent."),
            );
        }

        Self { scope, schema }
    }

    pub fn scope(&self) -> WebhookScope {
        self.scope
    }
}

impl CapabilityHandler for WebhookHandler {
    fn kind(&self) -> CapabilityKind {
        match self.scope {
            WebhookScope::Global => CapabilityKind::WebhookGlobal,
            WebhookScope::Repository => CapabilityKind::WebhookRepository,
        }
    }

    fn public_name(&self) -> &'static str {
        match self.scope {
            WebhookScope::Global => "Webhook Global",
            WebhookScope::Repository => "Webhook Repository",
        }
    }

    fn description(&self) -> &'static str {
        match self.scope {
            WebhookScope::Global => {
                "Sends global `audit` and `repository` events to an HTTP endpoint.\n\n\
                 `secret` is write-only: Nexus never returns it, so drift in the secret \
                 cannot be detected."
            }
            WebhookScope::Repository => {
                "Sends `asset` and `component` events of one repository to an HTTP endpoint.\n\n\
                 `secret` is write-only: Nexus never returns it, so drift in the secret \
                 cannot be detected."
            }
        }
    }

    fn properties_schema(&self) -> &AttributeMap {
        &self.schema
    }

    fn decode_properties(&self, properties: Map<String, Value>) -> ProviderResult<CapabilityProperties> {
        decode(properties).map(CapabilityProperties::Webhook)
    }

    fn encode_properties(&self, properties: &CapabilityProperties) -> ProviderResult<Map<String, Value>> {
        match properties {
            CapabilityProperties::Webhook(p) => encode(p),
            other => Err(wrong_variant(self.kind(), other)),
        }
    }

    fn properties_to_api(
        &self,
        properties: &CapabilityProperties,
        _version: &ServerVersion,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let CapabilityProperties::Webhook(p) = properties else {
            return Err(wrong_variant(self.kind(), properties));
        };
        let mut wire = WireWriter::new()
            .string("url", &p.url)
            .set("names", &p.events)
            .optional_string("secret", p.secret.as_deref());
        if self.scope == WebhookScope::Repository {
            wire = wire.optional_string("repository", p.repository.as_deref());
        }
        Ok(wire.finish())
    }

    fn properties_from_api(&self, api: &BTreeMap<String, String>) -> ProviderResult<CapabilityProperties> {
        let r = WireReader::new(self.kind(), api);
        let repository = match self.scope {
            WebhookScope::Global => None,
            WebhookScope::Repository => Some(r.string("repository")?),
        };
        Ok(CapabilityProperties::Webhook(WebhookProperties {
            url: r.string("url")?,
            events: r.set("names"),
            secret: r
                .optional_string("secret")
                .filter(|s| s != SECRET_PLACEHOLDER),
            repository,
        }))
    }

    fn preserve_sensitive(&self, plan: &CapabilityModel, state: &mut CapabilityModel) {
        if let (CapabilityProperties::Webhook(planned), CapabilityProperties::Webhook(current)) =
            (&plan.properties, &mut state.properties)
        {
            current.secret.clone_from(&planned.secret);
        }
    }
}
