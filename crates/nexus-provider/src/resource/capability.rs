//! Generic capability resource, parameterised by a [`CapabilityHandler`].

use serde_json::Value;
use tracing::{debug, warn};

use super::{respond, string_attr, ResourceResponse};
use crate::capability::{CapabilityHandler, CapabilityModel};
use crate::client::NexusClient;
use crate::context::CallContext;
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{PlanModifier, ResourceSchema};
use crate::version::ServerVersion;

/// One `capability_*` resource type.
#[derive(Debug, Clone)]
pub struct CapabilityResource {
    handler: &'static dyn CapabilityHandler,
    client: NexusClient,
}

impl CapabilityResource {
    pub fn new(handler: &'static dyn CapabilityHandler, client: NexusClient) -> Self {
        Self { handler, client }
    }

    pub fn handler(&self) -> &'static dyn CapabilityHandler {
        self.handler
    }

    pub fn type_name(&self) -> String {
        self.handler.resource_name()
    }

    pub fn schema(&self) -> ResourceSchema {
        self.handler.resource_schema()
    }

    /// Check a plan without contacting the server.
    pub fn validate(&self, plan: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if let Err(err) = self.handler.plan_as_model(plan) {
            diagnostics.add_provider_error(&self.action("validating"), &err);
        }
        diagnostics
    }

    pub async fn create(&self, ctx: &CallContext, plan: &Value) -> ResourceResponse {
        respond(self.try_create(ctx, plan).await, None, &self.action("creating"))
    }

    pub async fn read(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self.try_read(ctx, state).await {
            Ok(state) => ResourceResponse::with_state(state),
            Err(ProviderError::NotFound { what }) => {
                warn!(resource = %self.type_name(), %what, "capability no longer exists, removing from state");
                let mut response = ResourceResponse::removed();
                response.diagnostics.add_warning(
                    format!("{} not found", self.type_name()),
                    format!(
                        "Capability {} no longer exists on the server and was removed from state.",
                        string_attr(state, "id").unwrap_or("<unknown>")
                    ),
                );
                response
            }
            Err(err) => ResourceResponse::failed(Some(state.clone()), &self.action("reading"), &err),
        }
    }

    pub async fn update(&self, ctx: &CallContext, plan: &Value, state: &Value) -> ResourceResponse {
        respond(
            self.try_update(ctx, plan, state).await,
            Some(state),
            &self.action("updating"),
        )
    }

    pub async fn delete(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self.try_delete(ctx, state).await {
            Ok(()) => ResourceResponse::removed(),
            Err(err) => ResourceResponse::failed(Some(state.clone()), &self.action("deleting"), &err),
        }
    }

    /// Reconstruct state for an existing capability by id.
    pub async fn import(&self, ctx: &CallContext, id: &str) -> ResourceResponse {
        respond(self.try_import(ctx, id).await, None, &self.action("importing"))
    }

    fn action(&self, verb: &str) -> String {
        format!("{verb} {}", self.type_name())
    }

    async fn supported_version(&self, ctx: &CallContext) -> ProviderResult<ServerVersion> {
        let version = self.client.server_version(ctx).await?;
        if !version.supports_capabilities() {
            return Err(ProviderError::validation(
                "server_version",
                format!(
                    "Nexus {version} does not support the capabilities API (3.84.0 or newer required). \
                     If the server hides its version header, set NEXUS_VERSION."
                ),
            ));
        }
        Ok(version)
    }

    async fn try_create(&self, ctx: &CallContext, plan: &Value) -> ProviderResult<Value> {
        let mut model = self.handler.plan_as_model(plan)?;
        let version = self.supported_version(ctx).await?;
        let payload = self.handler.to_create_payload(&model, &version)?;

        let created = self.client.create_capability(ctx, &payload).await?;
        let id = created.id.ok_or_else(|| ProviderError::InvalidResponse {
            message: format!("created {} capability has no id", payload.type_id),
        })?;
        debug!(resource = %self.type_name(), %id, "capability created");

        model.id = Some(id);
        self.handler.stamp_plan_for_state(&mut model);
        self.handler.model_to_value(&model)
    }

    async fn try_read(&self, ctx: &CallContext, state: &Value) -> ProviderResult<Value> {
        let prior = self.handler.state_as_model(state)?;
        let id = require_id(&prior)?;
        self.supported_version(ctx).await?;

        let dto = self.client.get_capability(ctx, id).await?;
        let mut model = prior.clone();
        self.handler.merge_api_into_state(&mut model, &dto)?;
        self.handler.preserve_sensitive(&prior, &mut model);
        self.handler.model_to_value(&model)
    }

    async fn try_update(&self, ctx: &CallContext, plan: &Value, state: &Value) -> ProviderResult<Value> {
        let mut model = self.handler.plan_as_model(plan)?;
        let prior = self.handler.state_as_model(state)?;
        require_id(&prior)?;
        self.reject_replacement(&model, &prior, state)?;
        self.handler.merge_plan_for_update(&mut model, &prior);

        let version = self.supported_version(ctx).await?;
        let payload = self.handler.to_update_payload(&model, &version)?;
        let id = require_id(&model)?;
        self.client.update_capability(ctx, id, &payload).await?;
        debug!(resource = %self.type_name(), %id, "capability updated");

        self.handler.model_to_value(&model)
    }

    /// Changing a requires-replace property in place is a validation error.
    fn reject_replacement(
        &self,
        plan: &CapabilityModel,
        prior: &CapabilityModel,
        state: &Value,
    ) -> ProviderResult<()> {
        let schema = self.handler.properties_schema();
        let planned = self.handler.encode_properties(&plan.properties)?;
        let current = self.handler.encode_properties(&prior.properties)?;

        for name in schema.names() {
            let replaces = schema
                .get(name)
                .is_some_and(|attr| attr.plan_modifiers.contains(&PlanModifier::RequiresReplace));
            let known = state
                .get("properties")
                .and_then(|p| p.get(name))
                .is_some_and(|v| !v.is_null());
            if !replaces || !known {
                continue;
            }

            let from = current.get(name).unwrap_or(&Value::Null);
            let to = planned.get(name).unwrap_or(&Value::Null);
            if from != to {
                return Err(ProviderError::validation(
                    format!("properties.{name}"),
                    format!("changing {name} from {from} to {to} requires replacing the capability"),
                ));
            }
        }
        Ok(())
    }

    async fn try_delete(&self, ctx: &CallContext, state: &Value) -> ProviderResult<()> {
        let prior = self.handler.state_as_model(state)?;
        let id = require_id(&prior)?;
        self.supported_version(ctx).await?;

        match self.client.delete_capability(ctx, id).await {
            Err(err) if err.is_not_found() => {
                debug!(resource = %self.type_name(), %id, "capability already deleted");
                Ok(())
            }
            other => other,
        }
    }

    async fn try_import(&self, ctx: &CallContext, id: &str) -> ProviderResult<Value> {
        self.supported_version(ctx).await?;
        let dto = self.client.get_capability(ctx, id).await?;

        let mut model = CapabilityModel {
            id: Some(id.to_string()),
            notes: None,
            enabled: dto.enabled,
            last_updated: None,
            properties: self.handler.properties_from_api(&dto.properties)?,
        };
        self.handler.merge_api_into_state(&mut model, &dto)?;
        self.handler.model_to_value(&model)
    }
}

fn require_id(model: &CapabilityModel) -> ProviderResult<&str> {
    model
        .id
        .as_deref()
        .ok_or_else(|| ProviderError::programming("state has no capability id"))
}
