use super::ProviderKind;
use crate::error::ProviderError;
use async_trait::async_trait;

/// A text-generation backend
///
/// Implementations are stateless apart from credentials and an HTTP client,
/// so one instance serves any number of concurrent calls.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider family
    fn kind(&self) -> ProviderKind;

    /// Model used when the caller passes a blank identifier
    fn default_model(&self) -> &'static str;

    /// Generate a completion for `prompt` with `model`
    ///
    /// The returned text is trimmed.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;

    /// Map a requested model to the identifier actually sent upstream
    fn resolve_model(&self, model: &str) -> String {
        let model = model.trim();
        if model.is_empty() {
            self.default_model().to_string()
        } else {
            model.to_string()
        }
    }

    /// Models known to work with this provider
    fn supported_models(&self) -> Vec<&'static str> {
        vec![self.default_model()]
    }

    fn supports_streaming(&self) -> bool {
        false
    }
}
