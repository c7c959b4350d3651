use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::models::DEFAULT_TTL;

pub const DEFAULT_API_BASE_URL: &str = "http://www.phillipian.net/mobile";
pub const DEFAULT_COMMENTS_BASE_URL: &str = "http://phillipian.net";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;
pub const DEFAULT_CACHE_FILE: &str = ".phillipian-cache.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is set but empty")]
    Empty { key: &'static str },
    #[error("{key} must be {expected}: {value}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub cache_appended_pages: bool,
    pub file_path: PathBuf,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub timezone: Tz,
    pub comments_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: None,
            },
            cache: CacheConfig {
                ttl: DEFAULT_TTL,
                cache_appended_pages: false,
                file_path: PathBuf::from(DEFAULT_CACHE_FILE),
                redis_url: None,
            },
            timezone: DEFAULT_TIMEZONE,
            comments_base_url: DEFAULT_COMMENTS_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment (call `dotenv` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) => {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        Err(ConfigError::Empty { key })
                    } else {
                        Ok(Some(trimmed.to_string()))
                    }
                }
            }
        };
        let read_u64 = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            read(key)?
                .map(|v| {
                    v.parse::<u64>().map_err(|_| ConfigError::Invalid {
                        key,
                        expected: "a whole number",
                        value: v,
                    })
                })
                .transpose()
        };

        let mut config = Self::default();

        if let Some(url) = read("NEWS_API_BASE_URL")? {
            config.source.base_url = url;
        }
        config.source.timeout_secs = read_u64("NEWS_HTTP_TIMEOUT_SECS")?;

        if let Some(secs) = read_u64("NEWS_CACHE_TTL_SECS")? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(flag) = read("NEWS_CACHE_APPENDED_PAGES")? {
            config.cache.cache_appended_pages = parse_flag("NEWS_CACHE_APPENDED_PAGES", flag)?;
        }
        if let Some(path) = read("NEWS_CACHE_FILE")? {
            config.cache.file_path = PathBuf::from(path);
        }
        config.cache.redis_url = read("REDIS_URL")?;

        if let Some(name) = read("NEWS_TIMEZONE")? {
            config.timezone = name.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                key: "NEWS_TIMEZONE",
                expected: "an IANA time zone name",
                value: name,
            })?;
        }
        if let Some(url) = read("NEWS_COMMENTS_BASE_URL")? {
            config.comments_base_url = url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            expected: "true or false",
            value,
        }),
    }
}
