//! Process-wide lookup from capability kind (or resource type name) to handler.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::{handlers, CapabilityHandler, CapabilityKind};
use crate::error::{ProviderError, ProviderResult};

static REGISTRY: Lazy<CapabilityRegistry> = Lazy::new(|| init_registry(handlers::builtin()));

/// Body of the process-wide registry. Duplicate handlers panic here.
fn init_registry(handlers: Vec<Box<dyn CapabilityHandler>>) -> CapabilityRegistry {
    match CapabilityRegistry::new(handlers) {
        Ok(registry) => registry,
        Err(err) => panic!("built-in capability handlers are not unique: {err}"),
    }
}

/// The built-in registry, created on first use.
pub fn registry() -> &'static CapabilityRegistry {
    &REGISTRY
}

/// Immutable set of handlers, unique by kind and by resource type name.
#[derive(Debug)]
pub struct CapabilityRegistry {
    by_kind: BTreeMap<CapabilityKind, Box<dyn CapabilityHandler>>,
    by_resource: BTreeMap<String, CapabilityKind>,
}

impl CapabilityRegistry {
    pub fn new(handlers: Vec<Box<dyn CapabilityHandler>>) -> ProviderResult<Self> {
        let mut by_kind = BTreeMap::new();
        let mut by_resource = BTreeMap::new();

        for handler in handlers {
            let kind = handler.kind();
            let resource = handler.resource_name();
            if by_resource.insert(resource.clone(), kind).is_some() {
                return Err(ProviderError::programming(format!(
                    "duplicate capability resource type {resource}"
                )));
            }
            if by_kind.insert(kind, handler).is_some() {
                return Err(ProviderError::programming(format!(
                    "duplicate capability handler for {kind}"
                )));
            }
        }

        Ok(Self {
            by_kind,
            by_resource,
        })
    }

    pub fn builtin() -> ProviderResult<Self> {
        Self::new(handlers::builtin())
    }

    pub fn get(&self, kind: CapabilityKind) -> Option<&dyn CapabilityHandler> {
        self.by_kind.get(&kind).map(|h| h.as_ref())
    }

    pub fn by_resource_name(&self, name: &str) -> Option<&dyn CapabilityHandler> {
        self.by_resource.get(name).and_then(|kind| self.get(*kind))
    }

    /// Advertised resource type names, sorted.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_resource.keys().map(String::as_str)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn CapabilityHandler> + '_ {
        self.by_kind.values().map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::handlers::{AuditHandler, BaseUrlHandler, WebhookHandler, WebhookScope};

    #[test]
    fn test_builtin_registry_lists_every_kind() {
        let registry = registry();
        assert_eq!(registry.len(), CapabilityKind::ALL.len());
        for kind in CapabilityKind::ALL {
            let handler = registry.get(kind).expect("handler registered");
            assert_eq!(handler.kind(), kind);
            let by_name = registry
                .by_resource_name(&handler.resource_name())
                .expect("resource name registered");
            assert_eq!(by_name.kind(), kind);
        }
    }

    #[test]
    fn test_resource_names() {
        let names: Vec<&str> = registry().resource_names().collect();
        assert!(names.contains(&"capability_audit"));
        assert!(names.contains(&"capability_base_url"));
        assert!(names.contains(&"capability_firewall_audit_and_quarantine"));
        assert!(names.contains(&"capability_webhook_repository"));
        assert!(names.iter().all(|n| n.starts_with("capability_")));
        assert!(registry().by_resource_name("capability_nope").is_none());
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = CapabilityRegistry::new(vec![
            Box::new(AuditHandler::new()),
            Box::new(BaseUrlHandler::new()),
            Box::new(AuditHandler::new()),
        ])
        .unwrap_err();
        assert!(matches!(err, ProviderError::Programming { .. }));
        assert!(err.to_string().contains("capability_audit"), "{err}");
    }

    #[test]
    fn test_webhook_scopes_are_distinct() {
        let registry = CapabilityRegistry::new(vec![
            Box::new(WebhookHandler::new(WebhookScope::Global)),
            Box::new(WebhookHandler::new(WebhookScope::Repository)),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    #[should_panic(expected = "built-in capability handlers are not unique")]
    fn test_duplicate_panics_at_initialisation() {
        init_registry(vec![
            Box::new(AuditHandler::new()),
            Box::new(AuditHandler::new()),
        ]);
    }

    #[test]
    fn test_initialisation_accepts_builtin_handlers() {
        assert_eq!(init_registry(handlers::builtin()).len(), CapabilityKind::ALL.len());
    }
}
