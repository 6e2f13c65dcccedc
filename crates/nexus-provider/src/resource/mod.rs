//! Resources: the generic capability resource and the content selector.
//!
//! Operations never return `Err`. Failures are reported as diagnostics and
//! `state` holds what the host should persist afterwards (`None` = removed).

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};

pub mod capability;
pub mod content_selector;

pub use capability::CapabilityResource;
pub use content_selector::ContentSelectorResource;

/// Outcome of one resource operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceResponse {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn with_state(state: Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn removed() -> Self {
        Self::default()
    }

    /// Keep `state` (possibly none) and report `err`.
    pub fn failed(state: Option<Value>, action: &str, err: &ProviderError) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_provider_error(action, err);
        Self { state, diagnostics }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Fold an operation result into a response; on error the prior state stays.
pub(crate) fn respond(result: ProviderResult<Value>, prior: Option<&Value>, action: &str) -> ResourceResponse {
    match result {
        Ok(state) => ResourceResponse::with_state(state),
        Err(err) => ResourceResponse::failed(prior.cloned(), action, &err),
    }
}

/// String attribute of a state/plan object, if present and non-null.
pub(crate) fn string_attr<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}
