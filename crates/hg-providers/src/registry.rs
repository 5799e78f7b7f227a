//! Provider registry.
//!
//! The gateway talks to exactly one LLM endpoint (`LLM_BASE_URL`/`LLM_API_KEY`)
//! but distinguishes two roles against it: [`ModelRole::Main`] drives the
//! function-calling orchestrator, [`ModelRole::Detect`] is used once per
//! session for language detection and may name a cheaper model.

use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::LlmProvider;
use hg_domain::capability::ModelRole;
use hg_domain::config::Config;
use hg_domain::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ProviderRegistry {
    provider: Arc<dyn LlmProvider>,
    models: HashMap<ModelRole, String>,
}

impl ProviderRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.llm_api_key.is_none() {
            tracing::warn!("LLM_API_KEY not set; LLM calls will fail until configured");
        }

        let provider = OpenAiCompatProvider::new(
            config.llm_base_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model_main.clone(),
        )?;

        let mut models = HashMap::new();
        models.insert(ModelRole::Main, config.llm_model_main.clone());
        models.insert(ModelRole::Detect, config.llm_model_detect.clone());

        Ok(Self {
            provider: Arc::new(provider),
            models,
        })
    }

    /// The single configured provider. Every role resolves to this adapter;
    /// only the model name selected per request differs.
    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }

    pub fn model_for_role(&self, role: ModelRole) -> Result<&str> {
        self.models
            .get(&role)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::Config(format!("no model configured for role {role:?}")))
    }
}
