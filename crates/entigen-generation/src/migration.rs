//! Migration timestamp tokens
//!
//! Relational migrations are named `<stamp>_create_<plural>.{up,down}.sql` where the
//! stamp is a 14-digit `YYYYMMDDHHMMSS` token. Migration runners order files by that
//! prefix, so a newly generated stamp must sort after every existing one.

use std::{fmt, sync::OnceLock};

use chrono::{Duration, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn stamp_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^(\d{14})_").expect("static regex"))
}

/// A validated 14-digit migration timestamp token
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationStamp(String);

impl MigrationStamp {
    /// Stamp for the current UTC time
    pub fn now() -> Self {
        Self(Utc::now().format(STAMP_FORMAT).to_string())
    }

    /// Parse and validate a stamp
    pub fn parse(value: &str) -> Result<Self, ConfigurationError> {
        if value.len() == 14 && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(ConfigurationError::InvalidMigrationStamp(value.to_string()))
        }
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Highest stamp found among migration file names
    pub fn latest_in<'a>(file_names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        file_names
            .into_iter()
            .filter_map(|name| stamp_prefix().captures(name))
            .map(|caps| Self(caps[1].to_string()))
            .max()
    }

    /// This stamp if it sorts after `existing`, otherwise the next stamp after it
    pub fn next_after(self, existing: &MigrationStamp) -> Self {
        if self > *existing {
            return self;
        }

        match NaiveDateTime::parse_from_str(existing.as_str(), STAMP_FORMAT) {
            Ok(at) => Self((at + Duration::seconds(1)).format(STAMP_FORMAT).to_string()),
            // Not a calendar time; fall back to numeric ordering
            Err(_) => {
                let next = existing
                    .as_str()
                    .parse::<u64>()
                    .map(|n| n.saturating_add(1))
                    .unwrap_or(u64::MAX);
                Self(format!("{:014}", next.min(99_999_999_999_999)))
            }
        }
    }
}

impl fmt::Display for MigrationStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MigrationStamp {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MigrationStamp> for String {
    fn from(stamp: MigrationStamp) -> Self {
        stamp.0
    }
}
