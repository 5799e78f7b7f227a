//! Process configuration, read entirely from the environment at startup.
//!
//! There is no config file in this service — the environment-variable
//! surface below is exhaustive. [`Config::validate`] runs once at startup
//! and returns a list of issues; `Error`-severity issues abort startup,
//! `Warning`-severity issues are logged and startup continues.

use std::fmt;

#[derive(Debug, Clone)]
pub struct Config {
    pub session_ttl_min: u64,
    pub session_max_messages: usize,
    pub rate_limit_per_min: u32,
    pub max_fc_rounds: u32,
    pub turn_deadline_sec: u64,

    pub backend_url: String,
    pub backend_timeout_sec: u64,

    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model_main: String,
    pub llm_model_detect: String,

    pub tts_base_url: Option<String>,
    pub tts_api_key: Option<String>,
    pub tts_voice_id: Option<String>,

    pub redis_url: String,

    pub server_host: String,
    pub server_port: u16,

    pub log_level: String,
    pub app_env: AppEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl Config {
    /// Build from `std::env`, applying the documented defaults for any
    /// variable that is unset or fails to parse.
    pub fn from_env() -> Self {
        Self {
            session_ttl_min: env_u64("SESSION_TTL_MIN", 60),
            session_max_messages: env_u64("SESSION_MAX_MESSAGES", 20) as usize,
            rate_limit_per_min: env_u64("RATE_LIMIT_PER_MIN", 30) as u32,
            max_fc_rounds: env_u64("MAX_FC_ROUNDS", 6) as u32,
            turn_deadline_sec: env_u64("TURN_DEADLINE_SEC", 60),

            backend_url: std::env::var("BACKEND_URL").unwrap_or_default(),
            backend_timeout_sec: env_u64("BACKEND_TIMEOUT_SEC", 10),

            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            llm_api_key: std::env::var("LLM_API_KEY").ok(),
            llm_model_main: std::env::var("LLM_MODEL_MAIN").unwrap_or_else(|_| "gpt-4o".into()),
            llm_model_detect: std::env::var("LLM_MODEL_DETECT")
                .unwrap_or_else(|_| "gpt-4o-mini".into()),

            tts_base_url: std::env::var("TTS_BASE_URL").ok(),
            tts_api_key: std::env::var("TTS_API_KEY").ok(),
            tts_voice_id: std::env::var("TTS_VOICE_ID").ok(),

            redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),

            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env_u64("SERVER_PORT", 8080) as u16,

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            app_env: match std::env::var("APP_ENV").as_deref() {
                Ok("production") => AppEnv::Production,
                _ => AppEnv::Development,
            },
        }
    }

    /// Validate the configuration. Does not panic or abort; the caller
    /// decides what to do with `Error`-severity issues.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        if self.backend_url.is_empty() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "BACKEND_URL".into(),
                message: "must be set".into(),
            });
        } else if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "BACKEND_URL".into(),
                message: "must be an http(s) URL".into(),
            });
        }

        if self.redis_url.is_empty() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "REDIS_URL".into(),
                message: "must be set".into(),
            });
        }

        if self.llm_api_key.is_none() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "LLM_API_KEY".into(),
                message: "not set — LLM calls will fail until configured".into(),
            });
        }

        if self.rate_limit_per_min == 0 {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "RATE_LIMIT_PER_MIN".into(),
                message: "must be > 0".into(),
            });
        }

        if self.max_fc_rounds == 0 {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "MAX_FC_ROUNDS".into(),
                message: "must be > 0".into(),
            });
        }

        if self.session_max_messages == 0 {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "SESSION_MAX_MESSAGES".into(),
                message: "must be > 0".into(),
            });
        }

        if self.backend_timeout_sec == 0 {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "BACKEND_TIMEOUT_SEC".into(),
                message: "must be > 0".into(),
            });
        }

        if self.turn_deadline_sec < self.backend_timeout_sec {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "TURN_DEADLINE_SEC".into(),
                message: "shorter than BACKEND_TIMEOUT_SEC — a single slow backend call could exceed the turn deadline".into(),
            });
        }

        if self.tts_api_key.is_some() && self.tts_base_url.is_none() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "TTS_BASE_URL".into(),
                message: "TTS_API_KEY is set but TTS_BASE_URL is not — voice replies will fall back to text-only".into(),
            });
        }

        issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            session_ttl_min: 60,
            session_max_messages: 20,
            rate_limit_per_min: 30,
            max_fc_rounds: 6,
            turn_deadline_sec: 60,
            backend_url: "https://hotel.example.com".into(),
            backend_timeout_sec: 10,
            llm_base_url: "https://api.openai.com/v1".into(),
            llm_api_key: Some("sk-test".into()),
            llm_model_main: "gpt-4o".into(),
            llm_model_detect: "gpt-4o-mini".into(),
            tts_base_url: None,
            tts_api_key: None,
            tts_voice_id: None,
            redis_url: "redis://127.0.0.1:6379".into(),
            server_host: "0.0.0.0".into(),
            server_port: 8080,
            log_level: "info".into(),
            app_env: AppEnv::Development,
        }
    }

    fn find_issue<'a>(issues: &'a [ConfigError], field: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|i| i.field == field)
    }

    #[test]
    fn valid_config_has_no_error_severity_issues() {
        let issues = valid_config().validate();
        assert!(!issues.iter().any(|i| i.severity == ConfigSeverity::Error));
    }

    #[test]
    fn empty_backend_url_is_an_error() {
        let mut c = valid_config();
        c.backend_url = String::new();
        let issues = c.validate();
        let issue = find_issue(&issues, "BACKEND_URL").expect("issue expected");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn non_http_backend_url_is_an_error() {
        let mut c = valid_config();
        c.backend_url = "ftp://hotel.example.com".into();
        let issues = c.validate();
        assert!(find_issue(&issues, "BACKEND_URL").is_some());
    }

    #[test]
    fn missing_llm_api_key_is_a_warning_not_an_error() {
        let mut c = valid_config();
        c.llm_api_key = None;
        let issues = c.validate();
        let issue = find_issue(&issues, "LLM_API_KEY").expect("issue expected");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn zero_rate_limit_is_an_error() {
        let mut c = valid_config();
        c.rate_limit_per_min = 0;
        let issues = c.validate();
        assert!(find_issue(&issues, "RATE_LIMIT_PER_MIN").is_some());
    }

    #[test]
    fn zero_max_fc_rounds_is_an_error() {
        let mut c = valid_config();
        c.max_fc_rounds = 0;
        let issues = c.validate();
        assert!(find_issue(&issues, "MAX_FC_ROUNDS").is_some());
    }

    #[test]
    fn turn_deadline_shorter_than_backend_timeout_is_a_warning() {
        let mut c = valid_config();
        c.turn_deadline_sec = 5;
        c.backend_timeout_sec = 10;
        let issues = c.validate();
        let issue = find_issue(&issues, "TURN_DEADLINE_SEC").expect("issue expected");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn config_error_display_format() {
        let e = ConfigError {
            severity: ConfigSeverity::Error,
            field: "BACKEND_URL".into(),
            message: "must be set".into(),
        };
        assert_eq!(e.to_string(), "[ERROR] BACKEND_URL: must be set");
    }
}
