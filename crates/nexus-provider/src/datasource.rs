//! Read-only data sources over content selectors.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::NexusClient;
use crate::context::CallContext;
use crate::error::{ProviderError, ProviderResult};
use crate::resource::content_selector::{selector_attributes, selector_value};
use crate::resource::{respond, string_attr, ResourceResponse};
use crate::schema::{AttributeMap, AttributeSchema, AttributeType, ResourceSchema};

/// A read-only lookup exposed to the host.
#[async_trait]
pub trait DataSource: Send + Sync + std::fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    /// Resolve `config` against the server. The result goes into `state`.
    async fn read(&self, ctx: &CallContext, config: &Value) -> ResourceResponse;
}

/// `content_selector`: one selector by name.
#[derive(Debug, Clone)]
pub struct ContentSelectorDataSource {
    client: NexusClient,
}

impl ContentSelectorDataSource {
    pub fn new(client: NexusClient) -> Self {
        Self { client }
    }

    async fn lookup(&self, ctx: &CallContext, config: &Value) -> ProviderResult<Value> {
        let name = string_attr(config, "name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProviderError::validation("name", "attribute is required"))?;
        let dto = self.client.get_content_selector(ctx, name).await?;
        Ok(selector_value(&dto))
    }
}

#[async_trait]
impl DataSource for ContentSelectorDataSource {
    fn type_name(&self) -> &'static str {
        "content_selector"
    }

    fn schema(&self) -> ResourceSchema {
        let mut attributes = AttributeMap::new();
        for name in selector_attributes().names() {
            let attr = if name == "name" {
                AttributeSchema::required(AttributeType::String).describe("Name of the selector to look up.")
            } else {
                AttributeSchema::computed(AttributeType::String)
            };
            attributes = attributes.attribute(name, attr);
        }
        ResourceSchema {
            description: "Reads one content selector by name.".to_string(),
            attributes,
            properties: None,
        }
    }

    async fn read(&self, ctx: &CallContext, config: &Value) -> ResourceResponse {
        respond(
            self.lookup(ctx, config).await,
            None,
            "reading content_selector data source",
        )
    }
}

/// `content_selectors`: every selector on the server.
#[derive(Debug, Clone)]
pub struct ContentSelectorsDataSource {
    client: NexusClient,
}

impl ContentSelectorsDataSource {
    pub fn new(client: NexusClient) -> Self {
        Self { client }
    }

    async fn list(&self, ctx: &CallContext) -> ProviderResult<Value> {
        let selectors = self.client.list_content_selectors(ctx).await?;
        Ok(json!({
            "content_selectors": selectors.iter().map(selector_value).collect::<Vec<_>>(),
        }))
    }
}

#[async_trait]
impl DataSource for ContentSelectorsDataSource {
    fn type_name(&self) -> &'static str {
        "content_selectors"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema {
            description: "Lists every content selector.".to_string(),
            attributes: AttributeMap::new().attribute(
                "content_selectors",
                AttributeSchema::computed(AttributeType::ObjectList)
                    .describe("Selectors with `name`, `description` and `expression`."),
            ),
            properties: None,
        }
    }

    async fn read(&self, ctx: &CallContext, _config: &Value) -> ResourceResponse {
        respond(self.list(ctx).await, None, "reading content_selectors data source")
    }
}
