use super::ProviderKind;

/// Send models whose identifier contains `pattern` to `kind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub pattern: String,
    pub kind: ProviderKind,
}

impl RoutingRule {
    pub fn new(pattern: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    fn matches(&self, model: &str) -> bool {
        model.contains(self.pattern.as_str())
    }
}

/// Ordered model-to-provider routing table
///
/// Rules are tried first to last; the first match wins. Blank models and
/// models matching no rule go to the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    rules: Vec<RoutingRule>,
    fallback: ProviderKind,
}

impl RoutingPolicy {
    /// Empty policy routing everything to `fallback`
    pub fn new(fallback: ProviderKind) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule
    pub fn rule(mut self, pattern: impl Into<String>, kind: ProviderKind) -> Self {
        self.rules.push(RoutingRule::new(pattern, kind));
        self
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn fallback(&self) -> ProviderKind {
        self.fallback
    }

    /// Provider for `model`
    pub fn route(&self, model: &str) -> ProviderKind {
        let model = model.trim();
        if model.is_empty() {
            return self.fallback;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(model))
            .map(|rule| rule.kind)
            .unwrap_or(self.fallback)
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::new(ProviderKind::Groq)
            .rule("gpt-", ProviderKind::OpenAI)
            .rule("gpt3", ProviderKind::OpenAI)
            .rule("gpt4", ProviderKind::OpenAI)
            .rule("gemini", ProviderKind::Google)
    }
}
