//! `content_selector` resource: CSEL expressions stored under a unique name.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{respond, string_attr, ResourceResponse};
use crate::capability::timestamp;
use crate::client::NexusClient;
use crate::context::CallContext;
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, PlanModifier, Resolve, ResourceSchema, Validator};
use crate::types::ContentSelectorDto;

pub const TYPE_NAME: &str = "content_selector";

/// Allowed content selector names.
pub const NAME_PATTERN: &str = r"^[A-Za-z0-9-][A-Za-z0-9_\-.]*$";

pub(crate) fn selector_attributes() -> AttributeMap {
    AttributeMap::new()
        .attribute(
            "name",
            AttributeSchema::required(AttributeType::String)
                .validator(Validator::regex(NAME_PATTERN))
                .plan_modifier(PlanModifier::RequiresReplace)
                .describe("Unique name. Changing it replaces the selector."),
        )
        .attribute(
            "description",
            AttributeSchema::required(AttributeType::String).describe("Description of the selector."),
        )
        .attribute(
            "expression",
            AttributeSchema::required(AttributeType::String)
                .describe("CSEL expression, e.g. `format == \"raw\" and path =^ \"/org/\"`."),
        )
}

pub(crate) fn selector_schema() -> ResourceSchema {
    ResourceSchema {
        description: "Manages a content selector: a CSEL expression that matches \
                      repository content and can be referenced by privileges."
            .to_string(),
        attributes: selector_attributes().attribute(
            "last_updated",
            AttributeSchema::computed(AttributeType::String)
                .describe("Time of the last successful apply."),
        ),
        properties: None,
    }
}

/// Content selector as held in plan and state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorModel {
    name: String,
    description: String,
    expression: String,
    last_updated: Option<String>,
}

impl SelectorModel {
    fn from_value(attributes: &AttributeMap, value: &Value, mode: Resolve) -> ProviderResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ProviderError::programming(format!("{TYPE_NAME}: expected an object")))?;
        let mut input = object.clone();
        let last_updated = input
            .remove("last_updated")
            .and_then(|v| v.as_str().map(String::from));
        let resolved = attributes.resolve("", &input, mode)?;

        let field = |key: &str| resolved.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        Ok(Self {
            name: field("name"),
            description: field("description"),
            expression: field("expression"),
            last_updated,
        })
    }

    fn from_dto(dto: ContentSelectorDto, last_updated: Option<String>) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            expression: dto.expression,
            last_updated,
        }
    }

    fn to_dto(&self) -> ContentSelectorDto {
        ContentSelectorDto {
            name: self.name.clone(),
            description: self.description.clone(),
            expression: self.expression.clone(),
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "expression": self.expression,
            "last_updated": self.last_updated,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ContentSelectorResource {
    client: NexusClient,
    attributes: AttributeMap,
}

impl ContentSelectorResource {
    pub fn new(client: NexusClient) -> Self {
        Self {
            client,
            attributes: selector_attributes(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    pub fn schema(&self) -> ResourceSchema {
        selector_schema()
    }

    pub fn validate(&self, plan: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if let Err(err) = self.plan(plan) {
            diagnostics.add_provider_error("validating content_selector", &err);
        }
        diagnostics
    }

    /// POST (204), then read the selector back.
    pub async fn create(&self, ctx: &CallContext, plan: &Value) -> ResourceResponse {
        respond(self.try_create(ctx, plan).await, None, "creating content_selector")
    }

    pub async fn read(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self.try_read(ctx, state).await {
            Ok(state) => ResourceResponse::with_state(state),
            Err(ProviderError::NotFound { what }) => {
                let name = string_attr(state, "name").unwrap_or("<unknown>");
                warn!(%name, %what, "content selector no longer exists, removing from state");
                let mut response = ResourceResponse::removed();
                response.diagnostics.add_warning(
                    "content_selector not found",
                    format!("Content selector {name} no longer exists on the server and was removed from state."),
                );
                response
            }
            Err(err) => ResourceResponse::failed(Some(state.clone()), "reading content_selector", &err),
        }
    }

    pub async fn update(&self, ctx: &CallContext, plan: &Value, state: &Value) -> ResourceResponse {
        respond(
            self.try_update(ctx, plan, state).await,
            Some(state),
            "updating content_selector",
        )
    }

    pub async fn delete(&self, ctx: &CallContext, state: &Value) -> ResourceResponse {
        match self.try_delete(ctx, state).await {
            Ok(()) => ResourceResponse::removed(),
            Err(err) => ResourceResponse::failed(Some(state.clone()), "deleting content_selector", &err),
        }
    }

    /// Reconstruct state for an existing selector by name.
    pub async fn import(&self, ctx: &CallContext, name: &str) -> ResourceResponse {
        respond(self.try_import(ctx, name).await, None, "importing content_selector")
    }

    fn plan(&self, plan: &Value) -> ProviderResult<SelectorModel> {
        SelectorModel::from_value(&self.attributes, plan, Resolve::Plan)
    }

    fn state(&self, state: &Value) -> ProviderResult<SelectorModel> {
        let model = SelectorModel::from_value(&self.attributes, state, Resolve::State)?;
        if model.name.is_empty() {
            return Err(ProviderError::programming("state has no content selector name"));
        }
        Ok(model)
    }

    async fn try_create(&self, ctx: &CallContext, plan: &Value) -> ProviderResult<Value> {
        let model = self.plan(plan)?;
        self.client.create_content_selector(ctx, &model.to_dto()).await?;
        debug!(name = %model.name, "content selector created");

        let dto = self.client.get_content_selector(ctx, &model.name).await?;
        Ok(SelectorModel::from_dto(dto, Some(timestamp::advance(None))).to_value())
    }

    async fn try_read(&self, ctx: &CallContext, state: &Value) -> ProviderResult<Value> {
        let prior = self.state(state)?;
        let dto = self.client.get_content_selector(ctx, &prior.name).await?;
        let last_updated = prior
            .last_updated
            .clone()
            .or_else(|| Some(timestamp::advance(None)));
        Ok(SelectorModel::from_dto(dto, last_updated).to_value())
    }

    async fn try_update(&self, ctx: &CallContext, plan: &Value, state: &Value) -> ProviderResult<Value> {
        let mut model = self.plan(plan)?;
        let prior = self.state(state)?;
        if model.name != prior.name {
            return Err(ProviderError::validation(
                "name",
                format!(
                    "renaming {:?} to {:?} requires replacing the content selector",
                    prior.name, model.name
                ),
            ));
        }

        self.client.update_content_selector(ctx, &model.to_dto()).await?;
        debug!(name = %model.name, "content selector updated");
        model.last_updated = Some(timestamp::advance(prior.last_updated.as_deref()));
        Ok(model.to_value())
    }

    async fn try_import(&self, ctx: &CallContext, name: &str) -> ProviderResult<Value> {
        let dto = self.client.get_content_selector(ctx, name).await?;
        Ok(SelectorModel::from_dto(dto, Some(timestamp::advance(None))).to_value())
    }

    async fn try_delete(&self, ctx: &CallContext, state: &Value) -> ProviderResult<()> {
        let prior = self.state(state)?;
        match self.client.delete_content_selector(ctx, &prior.name).await {
            Err(err) if err.is_not_found() => {
                debug!(name = %prior.name, "content selector already deleted");
                Ok(())
            }
            other => other,
        }
    }
}

/// Selector as a plain JSON object (no `last_updated`), for data sources.
pub(crate) fn selector_value(dto: &ContentSelectorDto) -> Value {
    let mut map = Map::new();
    map.insert("name".into(), Value::String(dto.name.clone()));
    map.insert("description".into(), Value::String(dto.description.clone()));
    map.insert("expression".into(), Value::String(dto.expression.clone()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeMap {
        selector_attributes()
    }

    #[test]
    fn test_name_pattern() {
        for ok in ["raw-only", "a.b_c-d", "-leading-dash", "X1"] {
            let plan = json!({"name": ok, "description": "", "expression": "true"});
            assert!(SelectorModel::from_value(&attrs(), &plan, Resolve::Plan).is_ok(), "{ok}");
        }
        for bad in ["_leading", ".dot", "has space", ""] {
            let plan = json!({"name": bad, "description": "", "expression": "true"});
            let err = SelectorModel::from_value(&attrs(), &plan, Resolve::Plan).unwrap_err();
            assert!(matches!(err, ProviderError::Validation { ref attribute, .. } if attribute == "name"), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_last_updated_is_carried_not_resolved() {
        let state = json!({
            "name": "raw",
            "description": "d",
            "expression": "format == \"raw\"",
            "last_updated": "Monday, 01-Jan-24 00:00:00 UTC"
        });
        let model = SelectorModel::from_value(&attrs(), &state, Resolve::State).unwrap();
        assert_eq!(model.last_updated.as_deref(), Some("Monday, 01-Jan-24 00:00:00 UTC"));
        assert_eq!(model.to_value()["last_updated"], state["last_updated"]);
    }

    #[test]
    fn test_missing_expression_is_validation_error() {
        let plan = json!({"name": "raw", "description": "d"});
        let err = SelectorModel::from_value(&attrs(), &plan, Resolve::Plan).unwrap_err();
        assert!(matches!(err, ProviderError::Validation { ref attribute, .. } if attribute == "expression"));
    }
}
