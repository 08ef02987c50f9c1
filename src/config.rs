//! Settings loaded from the environment

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, Local};

use crate::db;
use crate::watering::{EngineOptions, SkewPolicy};

pub const ENV_DB_PATH: &str = "RIEGO_DB_PATH";
pub const ENV_SEED_DEMO: &str = "RIEGO_SEED_DEMO";
pub const ENV_UTC_OFFSET_MINUTES: &str = "RIEGO_UTC_OFFSET_MINUTES";
pub const ENV_SKEW_POLICY: &str = "RIEGO_SKEW_POLICY";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    /// Seed the demo garden when the database holds nothing yet
    pub seed_demo: bool,
    pub engine: EngineOptions,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value source. Unset keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(db::default_database_path);

        let seed_demo = match lookup(ENV_SEED_DEMO) {
            Some(value) => parse_bool(&value).with_context(|| format!("invalid {}", ENV_SEED_DEMO))?,
            None => true,
        };

        let utc_offset = match lookup(ENV_UTC_OFFSET_MINUTES) {
            Some(value) => parse_offset(&value)
                .with_context(|| format!("invalid {}", ENV_UTC_OFFSET_MINUTES))?,
            None => *Local::now().offset(),
        };

        let skew_policy = match lookup(ENV_SKEW_POLICY) {
            Some(value) => value
                .parse::<SkewPolicy>()
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("invalid {}", ENV_SKEW_POLICY))?,
            None => SkewPolicy::default(),
        };

        Ok(Self {
            database_path,
            seed_demo,
            engine: EngineOptions {
                skew_policy,
                utc_offset,
            },
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{}'", other)),
    }
}

fn parse_offset(value: &str) -> Result<FixedOffset> {
    let minutes: i32 = value
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a whole number of minutes", value))?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("offset of {} minutes is out of range", minutes))
}
