use super::{create_provider, Provider, ProviderKind, RoutingPolicy};
use crate::error::ProviderError;
use postloom_core::AppConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Providers by kind, plus the routing policy that chooses between them
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
    routing: RoutingPolicy,
}

impl ProviderRegistry {
    /// Empty registry with the default routing policy
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            routing: RoutingPolicy::default(),
        }
    }

    /// Registry with one provider per kind, each using its own credentials
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            if let Some(provider) = config
                .provider(kind.as_str())
                .and_then(|settings| create_provider(kind.as_str(), settings))
            {
                registry.register(provider);
            }
        }
        info!("Provider registry ready: {} providers", registry.providers.len());
        registry
    }

    /// Replace the routing policy
    pub fn with_routing(mut self, routing: RoutingPolicy) -> Self {
        self.routing = routing;
        self
    }

    /// Register a provider, replacing any previous one of the same kind
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn has(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Registered kinds, in a stable order
    pub fn providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    pub fn routing(&self) -> &RoutingPolicy {
        &self.routing
    }

    /// Provider that would serve `model`
    pub fn route(&self, model: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        let kind = self.routing.route(model);
        self.get(kind)
            .ok_or_else(|| ProviderError::unavailable(kind))
    }

    /// Route `model` and generate a completion
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let provider = self.route(model)?;
        debug!("Routing model '{}' to {}", model, provider.kind());
        provider.generate(model, prompt).await
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
