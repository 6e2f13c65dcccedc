//! Provider facade: configuration, advertised type names and dispatch.

use tracing::info;

use crate::capability::{registry, RESOURCE_PREFIX};
use crate::client::NexusClient;
use crate::datasource::{ContentSelectorDataSource, ContentSelectorsDataSource, DataSource};
use crate::error::{ProviderError, ProviderResult};
use crate::resource::content_selector::{selector_schema, TYPE_NAME as CONTENT_SELECTOR};
use crate::resource::{CapabilityResource, ContentSelectorResource};
use crate::schema::ResourceSchema;
use crate::types::ProviderConfig;

const DATA_SOURCES: [&str; 2] = ["content_selector", "content_selectors"];

/// Entry point for the host. Starts unconfigured.
#[derive(Debug, Clone, Default)]
pub struct NexusProvider {
    client: Option<NexusClient>,
}

impl NexusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and build the shared client.
    pub fn configure(&mut self, config: ProviderConfig) -> ProviderResult<()> {
        info!(url = %config.url, username = %config.username, "configuring nexus provider");
        self.client = Some(NexusClient::new(config)?);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> ProviderResult<&NexusClient> {
        self.client.as_ref().ok_or_else(|| ProviderError::Config {
            message: "the provider has not been configured".to_string(),
        })
    }

    /// `content_selector` followed by every `capability_*` type, sorted.
    pub fn resource_type_names(&self) -> Vec<String> {
        std::iter::once(CONTENT_SELECTOR.to_string())
            .chain(registry().resource_names().map(String::from))
            .collect()
    }

    pub fn data_source_names(&self) -> Vec<String> {
        DATA_SOURCES.iter().map(|s| s.to_string()).collect()
    }

    /// Schema of a resource type; available without configuration.
    pub fn resource_schema(&self, type_name: &str) -> ProviderResult<ResourceSchema> {
        if type_name == CONTENT_SELECTOR {
            return Ok(selector_schema());
        }
        registry()
            .by_resource_name(type_name)
            .map(|handler| handler.resource_schema())
            .ok_or_else(|| unknown_type(type_name))
    }

    pub fn capability_resource(&self, type_name: &str) -> ProviderResult<CapabilityResource> {
        let handler = registry()
            .by_resource_name(type_name)
            .ok_or_else(|| unknown_type(type_name))?;
        Ok(CapabilityResource::new(handler, self.client()?.clone()))
    }

    pub fn content_selector_resource(&self) -> ProviderResult<ContentSelectorResource> {
        Ok(ContentSelectorResource::new(self.client()?.clone()))
    }

    pub fn data_sources(&self) -> ProviderResult<Vec<Box<dyn DataSource>>> {
        let client = self.client()?;
        Ok(vec![
            Box::new(ContentSelectorDataSource::new(client.clone())),
            Box::new(ContentSelectorsDataSource::new(client.clone())),
        ])
    }

    pub fn data_source(&self, type_name: &str) -> ProviderResult<Box<dyn DataSource>> {
        self.data_sources()?
            .into_iter()
            .find(|ds| ds.type_name() == type_name)
            .ok_or_else(|| ProviderError::programming(format!("unknown data source {type_name:?}")))
    }
}

fn unknown_type(type_name: &str) -> ProviderError {
    let hint = if type_name.starts_with(RESOURCE_PREFIX) {
        " (not a known capability)"
    } else {
        ""
    };
    ProviderError::programming(format!("unknown resource type {type_name:?}{hint}"))
}
