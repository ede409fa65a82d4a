use crate::errors::ConfigError;
use chrono::FixedOffset;
use std::{env, time::Duration};

pub const DEFAULT_TABLE: &str = "supplement_products_search";
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UTC_OFFSET: &str = "+09:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Rest(StoreConfig),
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source: StoreSource,
    pub port: u16,
    pub utc_offset: FixedOffset,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let demo = read("DASHBOARD_DEMO")
            .map(|raw| parse_bool("DASHBOARD_DEMO", &raw))
            .transpose()?
            .unwrap_or(false);

        let source = if demo {
            StoreSource::Demo
        } else {
            let base_url =
                read("SNAPSHOT_STORE_URL").ok_or(ConfigError::Missing("SNAPSHOT_STORE_URL"))?;
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "SNAPSHOT_STORE_URL",
                    value: base_url,
                });
            }
            let timeout_secs = match read("SNAPSHOT_STORE_TIMEOUT_SECS") {
                Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: "SNAPSHOT_STORE_TIMEOUT_SECS",
                    value: raw,
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            };

            StoreSource::Rest(StoreConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: read("SNAPSHOT_STORE_KEY").unwrap_or_default(),
                table: read("SNAPSHOT_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            })
        };

        let port = match read("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let offset_raw =
            read("DASHBOARD_UTC_OFFSET").unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());
        let utc_offset = parse_offset(&offset_raw).ok_or(ConfigError::Invalid {
            key: "DASHBOARD_UTC_OFFSET",
            value: offset_raw,
        })?;

        Ok(Self {
            source,
            port,
            utc_offset,
        })
    }
}

/// Parses `+09:00`, `-05:30`, `+0900` or `Z`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match *raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|ch| *ch != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}
