//! Infrastructure-as-code provider for Sonatype Nexus Repository.
//!
//! This crate turns declared plans for Nexus server objects into the REST
//! calls that realise them, and reports the observed state back:
//!
//! - Capabilities (`capability_*`), one resource type per capability kind,
//!   all served by a single generic resource plus a per-kind handler
//! - Content selectors (`content_selector`) and their data sources
//! - Server version probe (`Server` header of `/v1/status/writable`)
//! - Error classification into user-visible diagnostics
//!
//! # Quick Start
//!
//! ```no_run
//! use nexus_provider::{CallContext, NexusProvider, ProviderConfig};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut provider = NexusProvider::new();
//! provider.configure(ProviderConfig::from_env())?;
//!
//! let base_url = provider.capability_resource("capability_base_url")?;
//! let plan = json!({"enabled": true, "properties": {"url": "https://nexus.example.com/"}});
//! let response = base_url.create(&CallContext::new(), &plan).await;
//! for diagnostic in response.diagnostics.iter() {
//!     eprintln!("{}: {}", diagnostic.summary, diagnostic.detail);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `NEXUS_URL` | Server base URL (default: `http://localhost:8081`) |
//! | `NEXUS_USERNAME` | Basic auth user |
//! | `NEXUS_PASSWORD` | Basic auth password |
//! | `NEXUS_VERSION` | Server version hint, skips the probe (e.g. `3.84.0-01 (PRO)`) |
//! | `NEXUS_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `NEXUS_INSECURE` | Skip TLS certificate verification |

pub mod capability;
pub mod client;
pub mod context;
pub mod datasource;
pub mod diagnostics;
pub mod error;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod types;
pub mod version;

// Re-export main types
pub use capability::{
    registry, CapabilityHandler, CapabilityKind, CapabilityModel, CapabilityProperties,
    CapabilityRegistry,
};
pub use client::NexusClient;
pub use context::CallContext;
pub use datasource::{ContentSelectorDataSource, ContentSelectorsDataSource, DataSource};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, ProviderResult, TransportCause};
pub use provider::NexusProvider;
pub use resource::{CapabilityResource, ContentSelectorResource, ResourceResponse};
pub use schema::{AttributeMap, AttributeSchema, AttributeType, ResourceSchema};
pub use types::{CapabilityDto, ContentSelectorDto, ProviderConfig};
pub use version::ServerVersion;
