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

//! Identifiers and row types shared by the storage layer and the reconciliation engine.

use std::{fmt, str::FromStr};

use alloy::primitives::U256;
use serde::{Deserialize, Serialize, Serializer};

/// Decimals of every USD value handled by the engine (values are stored in cents).
pub const USD_DECIMALS: u8 = 2;

/// Decimals of USD prices returned by the storage layer.
pub const PRICE_DECIMALS: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Rollups computed upstream across many projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AggregateKind {
    All,
    Bridges,
    Layer2s,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] =
        [AggregateKind::All, AggregateKind::Bridges, AggregateKind::Layer2s];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::All => "ALL",
            AggregateKind::Bridges => "BRIDGES",
            AggregateKind::Layer2s => "LAYER2S",
        }
    }
}

/// Key of an aggregated series: either a configured project or a synthetic rollup.
///
/// Aggregated rows store both variants in the same `project_id` column, the reserved
/// names `ALL`, `BRIDGES` and `LAYER2S` decode into [`ProjectKey::Aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectKey {
    Project(ProjectId),
    Aggregate(AggregateKind),
}

impl ProjectKey {
    pub fn project_id(&self) -> Option<&ProjectId> {
        match self {
            ProjectKey::Project(id) => Some(id),
            ProjectKey::Aggregate(_) => None,
        }
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKey::Project(id) => write!(f, "{id}"),
            ProjectKey::Aggregate(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl FromStr for ProjectKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ALL" => ProjectKey::Aggregate(AggregateKind::All),
            "BRIDGES" => ProjectKey::Aggregate(AggregateKind::Bridges),
            "LAYER2S" => ProjectKey::Aggregate(AggregateKind::Layer2s),
            id => ProjectKey::Project(ProjectId::new(id)),
        })
    }
}

impl From<ProjectId> for ProjectKey {
    fn from(id: ProjectId) -> Self {
        ProjectKey::Project(id)
    }
}

impl From<AggregateKind> for ProjectKey {
    fn from(kind: AggregateKind) -> Self {
        ProjectKey::Aggregate(kind)
    }
}

impl Serialize for ProjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Valuation category of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Canonically bridged value
    #[serde(rename = "CBV")]
    Cbv,
    /// Externally bridged value
    #[serde(rename = "EBV")]
    Ebv,
    /// Natively minted value
    #[serde(rename = "NMV")]
    Nmv,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Cbv => write!(f, "CBV"),
            ValueType::Ebv => write!(f, "EBV"),
            ValueType::Nmv => write!(f, "NMV"),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CBV" => Ok(ValueType::Cbv),
            "EBV" => Ok(ValueType::Ebv),
            "NMV" => Ok(ValueType::Nmv),
            _ => Err(format!("Invalid value type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    Hourly,
    SixHourly,
    Daily,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Hourly => write!(f, "hourly"),
            Resolution::SixHourly => write!(f, "six-hourly"),
            Resolution::Daily => write!(f, "daily"),
        }
    }
}

/// A single valuation of one asset held by one project on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub project_id: ProjectId,
    pub chain_id: u64,
    pub asset_id: AssetId,
    pub value_type: ValueType,
    pub timestamp: u64,
    /// Amount in the asset's smallest unit
    pub amount: U256,
    /// USD value with [`USD_DECIMALS`] decimals
    pub usd_value: U256,
}

/// Project-level (or rollup) value for one valuation category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedReport {
    pub project: ProjectKey,
    pub value_type: ValueType,
    pub timestamp: u64,
    pub usd_value: U256,
}

/// Raw token balance of an escrow contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub project_id: ProjectId,
    pub holder: String,
    pub chain_id: u64,
    pub asset_id: AssetId,
    pub timestamp: u64,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    pub asset_id: AssetId,
    pub timestamp: u64,
    /// USD price with [`PRICE_DECIMALS`] decimals
    pub price_usd: U256,
}
