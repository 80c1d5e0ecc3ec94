use std::{env, fs};

use anyhow::{anyhow, Result};
use serde::Deserialize;

const DEFAULT_RECENT_DAYS: u32 = 5;
const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub recent_days: u32,
    pub pool_size: u32,
}

/// Optional YAML file pointed at by `TIMETRIALS_CONFIG`. Every key is optional
/// and the environment overrides whatever is in here.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigYaml {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub recent_days: Option<u32>,
    #[serde(default)]
    pub pool_size: Option<u32>,
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| anyhow!("{} must be a whole number: {}", key, e)),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Reads the environment (call `dotenv()` first) and the optional YAML file.
    pub fn load() -> Result<Self> {
        let yaml = match env::var("TIMETRIALS_CONFIG") {
            Ok(path) => Some(
                fs::read_to_string(&path)
                    .map_err(|e| anyhow!("Couldn't read config file {}: {}", path, e))?,
            ),
            Err(_) => None,
        };

        Self::from_sources(yaml.as_deref(), |key| env::var(key).ok())
    }

    pub fn from_sources<F>(yaml: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigYaml = match yaml {
            Some(text) => serde_yaml::from_str(text)?,
            None => ConfigYaml::default(),
        };

        let config = AppConfig {
            database_url: lookup("DATABASE_URL").or(file.database_url),
            recent_days: parse_var(&lookup, "TIMETRIALS_RECENT_DAYS")?
                .or(file.recent_days)
                .unwrap_or(DEFAULT_RECENT_DAYS),
            pool_size: parse_var(&lookup, "TIMETRIALS_POOL_SIZE")?
                .or(file.pool_size)
                .unwrap_or(DEFAULT_POOL_SIZE),
        };
        debug!(
            "Loaded config: recent_days={} pool_size={} database_url set={}",
            config.recent_days,
            config.pool_size,
            config.database_url.is_some()
        );

        Ok(config)
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))
    }
}
