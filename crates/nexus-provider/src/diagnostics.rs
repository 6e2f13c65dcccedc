//! User-visible diagnostics and the error classifier that produces them.

use serde::Serialize;

use crate::error::ProviderError;

/// Upper bound for response bodies copied into a diagnostic detail.
pub const MAX_DETAIL_BODY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single message surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

/// Ordered, additive diagnostic list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    /// Classify `err` and append the resulting diagnostic.
    pub fn add_provider_error(&mut self, action: &str, err: &ProviderError) {
        self.push(classify(action, err));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Turn an error into an error diagnostic for `action` (e.g. "creating capability_audit").
///
/// Transport failures name the cause and carry no body. Server-protocol
/// failures carry the status line and the response body verbatim, truncated
/// to [`MAX_DETAIL_BODY`] bytes.
pub fn classify(action: &str, err: &ProviderError) -> Diagnostic {
    match err {
        ProviderError::Transport { cause, message } => Diagnostic::error(
            format!("Error {action}: {cause}"),
            format!("No response received from the server: {message}"),
        ),
        ProviderError::Cancelled => Diagnostic::error(
            format!("Error {action}: operation cancelled"),
            "The request was cancelled before the server answered. The next read is authoritative.",
        ),
        ProviderError::ServerProtocol { status, body } => Diagnostic::error(
            format!("Error {action}: unexpected response status"),
            format!("{}\n{}", status_line(*status), truncate(body, MAX_DETAIL_BODY)),
        ),
        ProviderError::NotFound { what } => Diagnostic::error(
            format!("Error {action}: not found"),
            format!("{}\n{what} does not exist", status_line(404)),
        ),
        ProviderError::Validation { attribute, message } => Diagnostic::error(
            format!("Invalid attribute value: {attribute}"),
            message.clone(),
        ),
        ProviderError::Programming { message } => Diagnostic::error(
            format!("Unexpected provider error {action}"),
            format!("{message}. This is a bug in the provider."),
        ),
        ProviderError::Config { message } => {
            Diagnostic::error("Provider not configured", message.clone())
        }
        ProviderError::InvalidResponse { message } => Diagnostic::error(
            format!("Error {action}: invalid response"),
            message.clone(),
        ),
    }
}

fn status_line(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status) {
        Ok(code) => match code.canonical_reason() {
            Some(reason) => format!("{status} {reason}"),
            None => status.to_string(),
        },
        Err(_) => status.to_string(),
    }
}

fn truncate(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportCause;

    #[test]
    fn test_server_protocol_has_status_line_and_body() {
        let err = ProviderError::ServerProtocol {
            status: 400,
            body: "{\"message\":\"bad\"}".to_string(),
        };
        let diag = classify("creating capability_base_url", &err);
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.detail.starts_with("400 Bad Request\n"));
        assert!(diag.detail.ends_with("{\"message\":\"bad\"}"));
    }

    #[test]
    fn test_transport_names_cause() {
        let err = ProviderError::Transport {
            cause: TransportCause::Timeout,
            message: "operation timed out".to_string(),
        };
        let diag = classify("reading capability_audit", &err);
        assert_eq!(
            diag.summary,
            "Error reading capability_audit: deadline exceeded"
        );
    }

    #[test]
    fn test_body_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_DETAIL_BODY);
        let err = ProviderError::ServerProtocol { status: 500, body };
        let diag = classify("x", &err);
        let detail_body = diag.detail.split_once('\n').unwrap().1;
        assert!(detail_body.len() <= MAX_DETAIL_BODY);
    }

    #[test]
    fn test_warnings_do_not_count_as_errors() {
        let mut diags = Diagnostics::new();
        diags.add_warning("Resource removed", "gone");
        assert!(!diags.has_errors());
        assert!(diags.has_warnings());
        diags.add_provider_error("x", &ProviderError::Cancelled);
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 2);
    }
}
