use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

/// Config, from a TOML file with a few env var overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Feed API, e.g. `http://localhost:8080/api`
    pub api_base: String,

    /// Directory that holds the persisted session
    pub storage_dir: PathBuf,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    #[serde(default)]
    pub human_logs: bool,

    /// Most verbose level that gets logged
    #[serde(default = "log_level")]
    pub log_level: String,

    /// Seconds before any single HTTP request is abandoned
    #[serde(default = "request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Max HTTP body size the client will read from a response
    #[serde(default = "max_body_size")]
    pub max_body_size: usize,

    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the Firebase project
    pub api_key: String,

    /// Identity Toolkit host. Only overridden in tests or against the auth emulator.
    #[serde(default = "identity_endpoint")]
    pub endpoint: String,
}

impl Config {
    pub fn from_file(filepath: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(filepath)
            .with_context(|| format!("couldn't read config file {}", filepath))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("couldn't parse config file")
    }

    /// `FEEDSYNC_API_BASE` and `FEEDSYNC_IDENTITY_API_KEY` win over the file.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = var("FEEDSYNC_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(api_key) = var("FEEDSYNC_IDENTITY_API_KEY") {
            self.identity.api_key = api_key;
        }
    }
}

fn log_level() -> String {
    "info".to_owned()
}

fn request_timeout_secs() -> u64 {
    30
}

fn max_body_size() -> usize {
    1 << 20
}

fn identity_endpoint() -> String {
    "https://identitytoolkit.googleapis.com".to_owned()
}
