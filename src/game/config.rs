// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const HOST_VAR: &str = "AI_SERVER_HOST";
pub const INTELLIGENCE_VAR: &str = "AI_INTELLIGENCE_LEVEL";
pub const TIMEOUT_VAR: &str = "AI_REQUEST_TIMEOUT_SECS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{value:?} is not a usable engine address: {reason}")]
    BadHost { value: String, reason: String },
    #[error("Intelligence level {0:?} is outside 0..=4")]
    BadIntelligence(String),
    #[error("Request timeout {0:?} is not a whole number of seconds")]
    BadTimeout(String),
}

use ConfigError::*;

/// How hard the engine thinks before replying, `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntelligenceLevel(u8);

impl IntelligenceLevel {
    pub const MAX: u8 = 4;

    pub fn try_new(level: u8) -> Result<Self> {
        if level > Self::MAX {
            return Err(BadIntelligence(level.to_string()).into());
        }
        Ok(Self(level))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for IntelligenceLevel {
    fn default() -> Self {
        Self(2)
    }
}

impl fmt::Display for IntelligenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IntelligenceLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let level: u8 = s.trim().parse().map_err(|_| BadIntelligence(s.to_string()))?;
        Self::try_new(level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the engine service; always ends in `/`.
    pub host: Url,
    pub intelligence: IntelligenceLevel,
    /// `None` waits for the engine indefinitely.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self {
            host: parse_host(host)?,
            intelligence: IntelligenceLevel::default(),
            timeout: None,
        })
    }

    /// Reads the environment, after loading `.env` if there is one. A
    /// `host` given here is used instead of `AI_SERVER_HOST`.
    pub fn from_env(host: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| match host {
            Some(host) if key == HOST_VAR => Some(host.to_string()),
            _ => std::env::var(key).ok(),
        })
    }

    /// Builds a config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_VAR).ok_or(Missing(HOST_VAR))?;
        let mut config = Self::new(&host)?;
        if let Some(level) = lookup(INTELLIGENCE_VAR) {
            config.intelligence = level.parse()?;
        }
        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| BadTimeout(secs.clone()))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn parse_host(value: &str) -> Result<Url> {
    let value = value.trim();
    let bad = |reason: String| BadHost {
        value: value.to_string(),
        reason,
    };
    let mut url = Url::parse(value).map_err(|e| bad(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(bad("expecting an http(s) URL".to_string()).into());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
