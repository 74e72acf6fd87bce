// backend/src/config.rs

use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Config {
    // Server Config
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bcrypt hash gating the login endpoint. Login is impossible without it.
    pub app_password_hash: Option<String>,
    pub cookie_signing_key: Option<String>,
    #[serde(default = "default_session_cookie_secure")]
    pub session_cookie_secure: bool,
    #[serde(default = "default_app_env")]
    pub app_env: String,

    // LLM Config
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_review_model")]
    pub review_model: String,

    // Pipeline Config
    #[serde(default = "default_pipeline_ceiling_secs")]
    pub pipeline_ceiling_secs: u64,
    #[serde(default = "default_artifact_root")]
    pub artifact_root: String,

    // Email Configuration
    pub sender_email: Option<String>,
    pub email_password: Option<String>,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    // Calendar Configuration
    pub google_calendar_token_json: Option<String>,

    // Web Search Configuration
    pub tavily_api_key: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field(
                "app_password_hash",
                &self.app_password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "cookie_signing_key",
                &self.cookie_signing_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("app_env", &self.app_env)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("review_model", &self.review_model)
            .field("pipeline_ceiling_secs", &self.pipeline_ceiling_secs)
            .field("artifact_root", &self.artifact_root)
            .field("sender_email", &self.sender_email)
            .field(
                "email_password",
                &self.email_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field(
                "google_calendar_token_json",
                &self.google_calendar_token_json.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "tavily_api_key",
                &self.tavily_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// Default value functions for serde
const fn default_port() -> u16 {
    8080
}
const fn default_session_cookie_secure() -> bool {
    true
}
fn default_app_env() -> String {
    "development".to_string()
}
fn default_review_model() -> String {
    "gemini-2.5-flash".to_string()
}
const fn default_pipeline_ceiling_secs() -> u64 {
    900 // 15 minutes
}
fn default_artifact_root() -> String {
    "./artifacts".to_string()
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
const fn default_smtp_port() -> u16 {
    465
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `anyhow::Error` if environment variable parsing fails,
    /// such as when variables have invalid formats.
    pub fn load() -> Result<Self, anyhow::Error> {
        envy::from_env::<Self>().map_err(anyhow::Error::from)
    }

    /// Wall-clock ceiling for one pipeline run.
    pub const fn pipeline_ceiling(&self) -> Duration {
        Duration::from_secs(self.pipeline_ceiling_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            app_password_hash: None,
            cookie_signing_key: None,
            session_cookie_secure: default_session_cookie_secure(),
            app_env: default_app_env(),
            gemini_api_key: None,
            review_model: default_review_model(),
            pipeline_ceiling_secs: default_pipeline_ceiling_secs(),
            artifact_root: default_artifact_root(),
            sender_email: None,
            email_password: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            google_calendar_token_json: None,
            tavily_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pipeline_ceiling_secs, 900);
        assert_eq!(config.pipeline_ceiling(), Duration::from_secs(900));
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.app_env, "development");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config {
            app_password_hash: Some("$2b$12$secret".to_string()),
            email_password: Some("hunter2".to_string()),
            gemini_api_key: Some("AIza-secret".to_string()),
            tavily_api_key: Some("tvly-secret".to_string()),
            google_calendar_token_json: Some("{\"refresh_token\":\"abc\"}".to_string()),
            ..Config::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
