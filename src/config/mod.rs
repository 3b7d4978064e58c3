use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Upper bound on pooled Postgres connections
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    // SMTP relay used to e-mail invoices and quotes
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_from")]
    pub smtp_from: String,

    // Chat-completion endpoint used for milestone generation
    pub llm_api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    // Image host for uploaded media
    pub image_host_api_key: Option<String>,
    #[serde(default = "default_image_host_url")]
    pub image_host_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Where rendered invoice/quote documents are written before mailing
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_smtp_from() -> String {
    "billing@ledgerly.local".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_host_url() -> String {
    "https://api.imgbb.com/1/upload".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_document_dir() -> String {
    "documents".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        envy::from_env::<Config>().map_err(|e| Error::Config(e.to_string()))
    }

    /// Build a configuration from an explicit key/value list.
    ///
    /// Keys are matched case-insensitively; the process environment is not
    /// consulted.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into().to_uppercase(), v.into()));
        envy::from_iter::<_, Config>(vars).map_err(|e| Error::Config(e.to_string()))
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_settings() {
        let config = Config::from_pairs([("database_url", "postgres://localhost/ledgerly")]).unwrap();

        assert_eq!(config.database_url(), "postgres://localhost/ledgerly");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.llm_model, "gpt-4o-mini");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(config.llm_api_key.is_none());
        assert!(config.smtp_host.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_pairs([
            ("database_url", "postgres://db/app"),
            ("bind_addr", "127.0.0.1:8080"),
            ("db_max_connections", "12"),
            ("llm_api_key", "sk-test"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn missing_database_url_is_a_config_error() {
        let err = Config::from_pairs(Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
