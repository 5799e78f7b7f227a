use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hg_backend::{BackendClient, ToolRegistry};
use hg_domain::config::{AppEnv, Config, ConfigSeverity};
use hg_providers::ProviderRegistry;
use hg_sessions::{RateLimiter, SessionStore};
use hg_tts::{OpenAiCompatTts, TtsRenderer};

mod api;
mod runtime;
mod state;

use runtime::language::LanguageDetector;
use runtime::TurnController;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env());
    init_tracing(&config);

    tracing::info!("hotel gateway starting");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    let sessions = Arc::new(
        SessionStore::connect(&config.redis_url, config.session_ttl_min)
            .await
            .context("connecting to session store")?,
    );
    tracing::info!("session store ready");

    let limiter = Arc::new(RateLimiter::new(config.rate_limit_per_min));
    tracing::info!(limit_per_min = config.rate_limit_per_min, "rate limiter ready");

    let registry = Arc::new(ToolRegistry::new());
    tracing::info!(tools = registry.definitions().len(), "tool registry ready");

    let backend = Arc::new(
        BackendClient::new(config.backend_url.clone(), config.backend_timeout_sec)
            .context("building backend client")?,
    );
    tracing::info!(url = %config.backend_url, "backend client ready");

    let providers = Arc::new(ProviderRegistry::from_config(&config).context("building LLM provider registry")?);
    tracing::info!(model_main = %config.llm_model_main, model_detect = %config.llm_model_detect, "LLM provider registry ready");

    let tts: Option<Arc<dyn TtsRenderer>> = match (&config.tts_base_url, &config.tts_api_key) {
        (Some(base_url), Some(api_key)) => {
            let voice = config.tts_voice_id.clone().unwrap_or_else(|| "alloy".into());
            let renderer = OpenAiCompatTts::new(base_url.clone(), api_key.clone(), voice).context("building TTS renderer")?;
            tracing::info!(url = %base_url, "TTS renderer ready");
            Some(Arc::new(renderer))
        }
        _ => {
            tracing::info!("TTS not configured — voice replies will be text-only");
            None
        }
    };

    let turns = Arc::new(TurnController {
        config: config.clone(),
        sessions,
        limiter,
        providers,
        registry,
        backend,
        tts,
        language_detector: LanguageDetector::new(),
    });

    let state = AppState { turns };

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "hotel gateway listening");

    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}

/// JSON logs in production, compact pretty logs in development — matching
/// how operators actually read each environment's output.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("info,hg_gateway={}", config.log_level)));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match config.app_env {
        AppEnv::Production => subscriber.json().init(),
        AppEnv::Development => subscriber.init(),
    }
}
