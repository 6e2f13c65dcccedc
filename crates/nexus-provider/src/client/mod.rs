//! Nexus REST client used by every resource and data source.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Method;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use crate::context::CallContext;
use crate::error::{ProviderError, ProviderResult};
use crate::types::{CapabilityDto, ContentSelectorDto, ContentSelectorUpdateDto, ProviderConfig};
use crate::version::ServerVersion;

mod helpers;
mod http;

use helpers::parse_version_hint;
use http::HttpBackend;

pub const USER_AGENT_VALUE: &str = concat!("nexus-provider/", env!("CARGO_PKG_VERSION"));

const STATUS_WRITABLE: [&str; 3] = ["v1", "status", "writable"];
const CAPABILITIES: [&str; 2] = ["v1", "capabilities"];
const CONTENT_SELECTORS: [&str; 3] = ["v1", "security", "content-selectors"];

/// Authenticated Nexus client. Cheap to clone; clones share the HTTP pool and
/// the probed server version.
#[derive(Debug, Clone)]
pub struct NexusClient {
    http: HttpBackend,
    version: Arc<OnceCell<ServerVersion>>,
}

impl NexusClient {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| ProviderError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = Url::parse(&config.url).map_err(|e| ProviderError::Config {
            message: format!("invalid url {:?}: {}", config.url, e),
        })?;

        let version = match config.server_version.as_deref() {
            Some(hint) => {
                let parsed = parse_version_hint(hint);
                debug!(hint = %hint, version = %parsed, "using configured server version");
                OnceCell::new_with(Some(parsed))
            }
            None => OnceCell::new(),
        };

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                username: config.username,
                password: config.password,
            },
            version: Arc::new(version),
        })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ProviderConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url.as_str()
    }

    /// Server version, probed once from the `Server` header of the writable
    /// status endpoint unless a version hint was configured.
    pub async fn server_version(&self, ctx: &CallContext) -> ProviderResult<ServerVersion> {
        self.version
            .get_or_try_init(|| async {
                let header = self.http.server_header(ctx, &STATUS_WRITABLE).await?;
                let version = header
                    .as_deref()
                    .map(ServerVersion::parse)
                    .unwrap_or_default();
                info!(server = ?header, version = %version, "probed nexus server version");
                Ok(version)
            })
            .await
            .copied()
    }

    pub async fn create_capability(
        &self,
        ctx: &CallContext,
        dto: &CapabilityDto,
    ) -> ProviderResult<CapabilityDto> {
        debug!(type_id = %dto.type_id, "creating capability");
        self.http
            .json(ctx, Method::POST, &CAPABILITIES, Some(dto))
            .await
    }

    pub async fn get_capability(&self, ctx: &CallContext, id: &str) -> ProviderResult<CapabilityDto> {
        self.http
            .json::<(), _>(ctx, Method::GET, &capability_path(id), None)
            .await
    }

    pub async fn update_capability(
        &self,
        ctx: &CallContext,
        id: &str,
        dto: &CapabilityDto,
    ) -> ProviderResult<()> {
        debug!(id = %id, type_id = %dto.type_id, "updating capability");
        self.http
            .no_content(ctx, Method::PUT, &capability_path(id), Some(dto))
            .await
    }

    pub async fn delete_capability(&self, ctx: &CallContext, id: &str) -> ProviderResult<()> {
        debug!(id = %id, "deleting capability");
        self.http
            .no_content::<()>(ctx, Method::DELETE, &capability_path(id), None)
            .await
    }

    pub async fn list_content_selectors(
        &self,
        ctx: &CallContext,
    ) -> ProviderResult<Vec<ContentSelectorDto>> {
        self.http
            .json::<(), _>(ctx, Method::GET, &CONTENT_SELECTORS, None)
            .await
    }

    pub async fn get_content_selector(
        &self,
        ctx: &CallContext,
        name: &str,
    ) -> ProviderResult<ContentSelectorDto> {
        self.http
            .json::<(), _>(ctx, Method::GET, &content_selector_path(name), None)
            .await
    }

    pub async fn create_content_selector(
        &self,
        ctx: &CallContext,
        dto: &ContentSelectorDto,
    ) -> ProviderResult<()> {
        debug!(name = %dto.name, "creating content selector");
        self.http
            .no_content(ctx, Method::POST, &CONTENT_SELECTORS, Some(dto))
            .await
    }

    pub async fn update_content_selector(
        &self,
        ctx: &CallContext,
        dto: &ContentSelectorDto,
    ) -> ProviderResult<()> {
        debug!(name = %dto.name, "updating content selector");
        let body = ContentSelectorUpdateDto {
            description: &dto.description,
            expression: &dto.expression,
        };
        self.http
            .no_content(ctx, Method::PUT, &content_selector_path(&dto.name), Some(&body))
            .await
    }

    pub async fn delete_content_selector(&self, ctx: &CallContext, name: &str) -> ProviderResult<()> {
        debug!(name = %name, "deleting content selector");
        self.http
            .no_content::<()>(ctx, Method::DELETE, &content_selector_path(name), None)
            .await
    }
}

fn capability_path(id: &str) -> [&str; 3] {
    [CAPABILITIES[0], CAPABILITIES[1], id]
}

fn content_selector_path(name: &str) -> [&str; 4] {
    [
        CONTENT_SELECTORS[0],
        CONTENT_SELECTORS[1],
        CONTENT_SELECTORS[2],
        name,
    ]
}
