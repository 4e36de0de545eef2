// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration loaded from a TOML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;
use tokio::fs;

use crate::types::{AssetId, ProjectId, Resolution, ValueType};

pub mod defaults {
    pub const fn hourly_step_secs() -> u64 {
        3600
    }

    pub const fn six_hourly_step_secs() -> u64 {
        6 * 3600
    }

    pub const fn daily_step_secs() -> u64 {
        24 * 3600
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} resolution has a zero step")]
    ZeroStep(Resolution),

    #[error("{0} resolution window is not a multiple of its step")]
    MisalignedWindow(Resolution),

    #[error("{0} resolution must have a bounded window")]
    UnboundedWindow(Resolution),

    #[error("Token {0} has {1} decimals, at most 77 are supported")]
    TooManyDecimals(AssetId, u8),

    #[error("Token {0} on chain {1} is configured twice")]
    DuplicateToken(AssetId, u64),
}

/// Step and retention window of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolutionSettings {
    pub step_secs: u64,
    /// How far back from the latest slot the series reaches, `None` when unbounded
    #[serde(default)]
    pub window_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolutionsConfig {
    pub hourly: ResolutionSettings,
    pub six_hourly: ResolutionSettings,
    pub daily: ResolutionSettings,
}

impl ResolutionsConfig {
    pub fn get(&self, resolution: Resolution) -> &ResolutionSettings {
        match resolution {
            Resolution::Hourly => &self.hourly,
            Resolution::SixHourly => &self.six_hourly,
            Resolution::Daily => &self.daily,
        }
    }

    /// Standard steps with the given windows for the bounded resolutions.
    pub fn with_windows(hourly_window_secs: u64, six_hourly_window_secs: u64) -> Self {
        Self {
            hourly: ResolutionSettings {
                step_secs: defaults::hourly_step_secs(),
                window_secs: Some(hourly_window_secs),
            },
            six_hourly: ResolutionSettings {
                step_secs: defaults::six_hourly_step_secs(),
                window_secs: Some(six_hourly_window_secs),
            },
            daily: ResolutionSettings { step_secs: defaults::daily_step_secs(), window_secs: None },
        }
    }
}

/// A token tracked by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfig {
    pub asset_id: AssetId,
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
    pub value_type: ValueType,
}

/// Top level config for the TVL engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TvlConfig {
    /// Reject every request while stored aggregates were computed under another config
    #[serde(default)]
    pub error_on_unsynced_detailed_tvl: bool,
    /// Oldest timestamp an unbounded resolution reaches back to
    #[serde(default)]
    pub genesis_timestamp: u64,
    pub resolutions: ResolutionsConfig,
    #[serde(default)]
    pub projects: Vec<ProjectId>,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl TvlConfig {
    /// Load the config from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .context(format!("Failed to read config file from {path:?}"))?;
        let config: Self =
            toml::from_str(&data).context(format!("Failed to parse toml file from {path:?}"))?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for resolution in [Resolution::Hourly, Resolution::SixHourly, Resolution::Daily] {
            let settings = self.resolutions.get(resolution);
            if settings.step_secs == 0 {
                return Err(ConfigError::ZeroStep(resolution));
            }
            match settings.window_secs {
                Some(window) if window % settings.step_secs != 0 => {
                    return Err(ConfigError::MisalignedWindow(resolution));
                }
                None if resolution != Resolution::Daily => {
                    return Err(ConfigError::UnboundedWindow(resolution));
                }
                _ => {}
            }
        }

        for (i, token) in self.tokens.iter().enumerate() {
            if token.decimals > 77 {
                return Err(ConfigError::TooManyDecimals(token.asset_id.clone(), token.decimals));
            }
            if self.tokens[..i]
                .iter()
                .any(|t| t.asset_id == token.asset_id && t.chain_id == token.chain_id)
            {
                return Err(ConfigError::DuplicateToken(token.asset_id.clone(), token.chain_id));
            }
        }
        Ok(())
    }

    pub fn has_project(&self, project: &ProjectId) -> bool {
        self.projects.contains(project)
    }

    pub fn find_token(&self, asset_id: &AssetId, chain_id: u64) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| &t.asset_id == asset_id && t.chain_id == chain_id)
    }

    /// Hex encoded SHA-256 of the parts of the config that shape stored aggregates.
    ///
    /// Project and token order does not change the fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut projects: Vec<&str> = self.projects.iter().map(|p| p.as_str()).collect();
        projects.sort_unstable();
        projects.dedup();

        let mut tokens: Vec<String> = self
            .tokens
            .iter()
            .map(|t| {
                format!("{}:{}:{}:{}:{}", t.chain_id, t.asset_id, t.symbol, t.decimals, t.value_type)
            })
            .collect();
        tokens.sort_unstable();

        let mut hasher = Sha256::new();
        for project in projects {
            hasher.update(b"project:");
            hasher.update(project.as_bytes());
            hasher.update(b"\n");
        }
        for token in tokens {
            hasher.update(b"token:");
            hasher.update(token.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
