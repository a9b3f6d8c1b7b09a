//! 客户端配置：区域、语言以及限流与并发参数。
//!
//! Client configuration: region, locale, credential and dispatch knobs.
//!
//! An [`ApiConfig`] is a plain value. The client snapshots it when a batch is
//! sent, so changes made after `send()` starts never affect that batch.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOCALE: &str = "en_US";

/// Battle.net API region. Data returned by the API is scoped to the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    #[default]
    Us,
    Europe,
    Korea,
    Taiwan,
    China,
    SouthEastAsia,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Us,
        Region::Europe,
        Region::Korea,
        Region::Taiwan,
        Region::China,
        Region::SouthEastAsia,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Europe => "Europe",
            Region::Korea => "Korea",
            Region::Taiwan => "Taiwan",
            Region::China => "China",
            Region::SouthEastAsia => "South East Asia",
        }
    }

    /// Protocol, sub-domain and domain of the API for this region.
    pub fn host(&self) -> &'static str {
        match self {
            Region::Us => "https://us.api.battle.net",
            Region::Europe => "https://eu.api.battle.net",
            Region::Korea => "https://kr.api.battle.net",
            Region::Taiwan => "https://tw.api.battle.net",
            Region::China => "https://api.battlenet.com.cn",
            Region::SouthEastAsia => "https://sea.api.battle.net",
        }
    }

    /// Locales available in this region. The first entry is the region default.
    pub fn locales(&self) -> &'static [&'static str] {
        match self {
            Region::Us => &["en_US", "es_MX", "pt_BR"],
            Region::Europe => &["en_GB", "es_ES", "fr_FR", "ru_RU", "de_DE", "pt_PT", "it_IT"],
            Region::Korea => &["ko_KR"],
            Region::Taiwan => &["zh_TW"],
            Region::China => &["zh_CN"],
            Region::SouthEastAsia => &["en_US"],
        }
    }

    pub fn supports_locale(&self, locale: &str) -> bool {
        self.locales().contains(&locale)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        let region = match normalized.as_str() {
            "us" => Region::Us,
            "europe" | "eu" => Region::Europe,
            "korea" | "kr" => Region::Korea,
            "taiwan" | "tw" => Region::Taiwan,
            "china" | "cn" => Region::China,
            "south east asia" | "southeast asia" | "sea" => Region::SouthEastAsia,
            _ => {
                let names: Vec<&str> = Region::ALL.iter().map(|r| r.name()).collect();
                return Err(Error::configuration_with_context(
                    format!("Invalid region \"{}\"", s),
                    ErrorContext::new()
                        .with_field_path("region")
                        .with_details(format!("must be one of: {}", names.join(", "))),
                ));
            }
        };
        Ok(region)
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.name().to_string()
    }
}

/// Complete client configuration.
///
/// Throttle ceilings of `0` disable the corresponding window.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub region: Region,
    pub locale: String,
    pub max_connections: usize,
    pub throttle_per_second: u32,
    pub throttle_per_hour: u32,
    pub timeout_secs: u64,
    /// Replaces the region host (mock servers, proxies).
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: Region::default(),
            locale: DEFAULT_LOCALE.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            throttle_per_second: 0,
            throttle_per_hour: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("locale", &self.locale)
            .field("max_connections", &self.max_connections)
            .field("throttle_per_second", &self.throttle_per_second)
            .field("throttle_per_hour", &self.throttle_per_hour)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `BATTLENET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ApiConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("BATTLENET_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(region) = lookup("BATTLENET_REGION") {
            self.set_region(region.parse()?);
        }
        if let Some(locale) = lookup("BATTLENET_LOCALE") {
            self.set_locale(&locale)?;
        }
        if let Some(v) = lookup("BATTLENET_MAX_CONNECTIONS") {
            self.max_connections = parse_number("BATTLENET_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("BATTLENET_THROTTLE_PER_SECOND") {
            self.throttle_per_second = parse_number("BATTLENET_THROTTLE_PER_SECOND", &v)?;
        }
        if let Some(v) = lookup("BATTLENET_THROTTLE_PER_HOUR") {
            self.throttle_per_hour = parse_number("BATTLENET_THROTTLE_PER_HOUR", &v)?;
        }
        if let Some(v) = lookup("BATTLENET_HTTP_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("BATTLENET_HTTP_TIMEOUT_SECS", &v)?;
        }
        self.validate()
    }

    /// Switch region. A locale the new region does not offer falls back to
    /// the region default.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        if !region.supports_locale(&self.locale) {
            self.locale = region.locales()[0].to_string();
        }
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        if !self.region.supports_locale(locale) {
            return Err(Error::configuration_with_context(
                format!(
                    "The locale \"{}\" is not available in the \"{}\" region",
                    locale, self.region
                ),
                ErrorContext::new()
                    .with_field_path("locale")
                    .with_details(format!("must be one of: {}", self.region.locales().join(", "))),
            ));
        }
        self.locale = locale.to_string();
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.region.supports_locale(&self.locale) {
            return Err(Error::configuration_with_context(
                format!(
                    "The locale \"{}\" is not available in the \"{}\" region",
                    self.locale, self.region
                ),
                ErrorContext::new()
                    .with_field_path("locale")
                    .with_details(format!("must be one of: {}", self.region.locales().join(", "))),
            ));
        }
        if self.max_connections == 0 {
            return Err(Error::configuration_with_context(
                "max connections must be at least 1",
                ErrorContext::new().with_field_path("max_connections"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be at least 1 second",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        Ok(())
    }

    /// Host requests are built against.
    pub fn host(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or_else(|| self.region.host())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        Error::configuration_with_context(
            format!("{} expects a non-negative integer", key),
            ErrorContext::new()
                .with_field_path(key)
                .with_details(format!("got \"{}\"", raw))
                .with_source("config_env"),
        )
    })
}
