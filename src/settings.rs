use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::scrap::comments::DEFAULT_KEYWORD;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Runtime settings: built-in defaults, then an optional `folio_extract.{toml,json,yaml}`
/// in the working directory, then `FOLIO_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub keyword: String,
    pub user_agent: String,
    pub concurrency: usize,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub timeout_secs: u64,
    pub log_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            keyword: DEFAULT_KEYWORD.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 4,
            max_retries: 3,
            backoff_ms: 500,
            timeout_secs: 20,
            log_capacity: 20,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_sources(Environment::with_prefix("FOLIO"))
    }

    fn from_sources(env: Environment) -> Result<Self, config::ConfigError> {
        let d = Settings::default();
        Config::builder()
            .set_default("keyword", d.keyword)?
            .set_default("user_agent", d.user_agent)?
            .set_default("concurrency", d.concurrency as i64)?
            .set_default("max_retries", i64::from(d.max_retries))?
            .set_default("backoff_ms", d.backoff_ms as i64)?
            .set_default("timeout_secs", d.timeout_secs as i64)?
            .set_default("log_capacity", d.log_capacity as i64)?
            .add_source(File::with_name("folio_extract").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}
