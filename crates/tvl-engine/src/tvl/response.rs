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

//! Client facing chart structures built from filled series.

use std::collections::{BTreeMap, HashMap};

use alloy::primitives::{utils::format_units, U256};
use serde::{ser::SerializeSeq, Serialize, Serializer};

use super::{
    gap_filler::FilledSeries,
    grouping::{AssetValues, Grouped, SeriesRow, SlotValue, TvlValues},
};
use crate::{
    config::TokenConfig,
    types::{AssetId, ProjectId, ProjectKey, Report, USD_DECIMALS},
};

/// Column labels of project charts.
pub const PROJECT_CHART_TYPES: [&str; 5] = ["timestamp", "valueUsd", "cbv", "ebv", "nmv"];

/// Formats a fixed point integer with `decimals` decimals, keeping full precision.
pub fn format_fixed(value: U256, decimals: u8) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}

pub fn format_usd(value: U256) -> String {
    format_fixed(value, USD_DECIMALS)
}

/// A chart row, serialized as `[timestamp, value, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub timestamp: u64,
    pub values: Vec<String>,
}

impl Serialize for ChartPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len() + 1))?;
        seq.serialize_element(&self.timestamp)?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub types: Vec<String>,
    pub data: Vec<ChartPoint>,
}

impl Chart {
    fn new(types: Vec<String>, data: Vec<ChartPoint>) -> Self {
        Self { types, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlApiCharts {
    pub hourly: Chart,
    pub six_hourly: Chart,
    pub daily: Chart,
}

/// Latest value of one asset of a project on one chain, summed over value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTvl {
    pub asset_id: AssetId,
    pub chain_id: u64,
    pub symbol: String,
    pub amount: String,
    pub usd_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTvl {
    pub charts: TvlApiCharts,
    pub tokens: Vec<TokenTvl>,
}

pub type DetailedTvlApiResponse = BTreeMap<ProjectKey, ProjectTvl>;

fn project_chart(series: Option<&FilledSeries<TvlValues>>) -> Chart {
    let data = series
        .map(|series| {
            series
                .iter()
                .map(|point| ChartPoint {
                    timestamp: point.timestamp,
                    values: vec![
                        format_usd(point.value.usd),
                        format_usd(point.value.cbv),
                        format_usd(point.value.ebv),
                        format_usd(point.value.nmv),
                    ],
                })
                .collect()
        })
        .unwrap_or_default();
    Chart::new(PROJECT_CHART_TYPES.iter().map(|t| t.to_string()).collect(), data)
}

fn latest_tokens(
    assets: Option<&Grouped<AssetId, Vec<Report>>>,
    tokens: &[TokenConfig],
) -> Vec<TokenTvl> {
    let Some(assets) = assets else {
        return Vec::new();
    };

    // Keyed by position in `tokens`, each entry is one configured (asset, chain) pair
    let mut by_token: Grouped<usize, AssetValues> = Grouped::new();
    for report in assets.iter().flat_map(|(_, reports)| reports) {
        let Some(index) = tokens
            .iter()
            .position(|t| t.asset_id == report.asset_id && t.chain_id == report.chain_id)
        else {
            tracing::warn!(
                "Skipping {} report of unknown asset {} on chain {}",
                report.value_type,
                report.asset_id,
                report.chain_id
            );
            continue;
        };
        by_token.entry_or_default(index).accumulate(&report.value());
    }

    let mut summed: Vec<(&TokenConfig, AssetValues)> =
        by_token.into_vec().into_iter().map(|(index, value)| (&tokens[index], value)).collect();
    summed.sort_by(|a, b| {
        b.1.usd
            .cmp(&a.1.usd)
            .then_with(|| a.0.asset_id.cmp(&b.0.asset_id))
            .then_with(|| a.0.chain_id.cmp(&b.0.chain_id))
    });

    summed
        .into_iter()
        .map(|(token, value)| TokenTvl {
            asset_id: token.asset_id.clone(),
            chain_id: token.chain_id,
            symbol: token.symbol.clone(),
            amount: format_fixed(value.amount, token.decimals),
            usd_value: format_usd(value.usd),
        })
        .collect()
}

/// Builds the per-project charts and latest token values.
///
/// Only keys listed in `project_keys` appear in the response.
pub fn generate(
    hourly: &HashMap<ProjectKey, FilledSeries<TvlValues>>,
    six_hourly: &HashMap<ProjectKey, FilledSeries<TvlValues>>,
    daily: &HashMap<ProjectKey, FilledSeries<TvlValues>>,
    latest: &Grouped<ProjectId, Grouped<AssetId, Vec<Report>>>,
    project_keys: &[ProjectKey],
    tokens: &[TokenConfig],
) -> DetailedTvlApiResponse {
    project_keys
        .iter()
        .map(|key| {
            let charts = TvlApiCharts {
                hourly: project_chart(hourly.get(key)),
                six_hourly: project_chart(six_hourly.get(key)),
                daily: project_chart(daily.get(key)),
            };
            let tokens = match key.project_id() {
                Some(project_id) => latest_tokens(latest.get(project_id), tokens),
                None => Vec::new(),
            };
            (key.clone(), ProjectTvl { charts, tokens })
        })
        .collect()
}

/// Rows of a single asset chart: timestamp, amount at the asset's decimals, usd.
pub fn generate_asset_chart(series: &FilledSeries<AssetValues>, decimals: u8) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|point| ChartPoint {
            timestamp: point.timestamp,
            values: vec![format_fixed(point.value.amount, decimals), format_usd(point.value.usd)],
        })
        .collect()
}

pub fn asset_chart_types(symbol: &str) -> Vec<String> {
    vec!["timestamp".to_string(), symbol.to_lowercase(), "usd".to_string()]
}

pub fn generate_asset_charts(
    hourly: &FilledSeries<AssetValues>,
    six_hourly: &FilledSeries<AssetValues>,
    daily: &FilledSeries<AssetValues>,
    token: &TokenConfig,
) -> TvlApiCharts {
    let chart = |series: &FilledSeries<AssetValues>| {
        Chart::new(asset_chart_types(&token.symbol), generate_asset_chart(series, token.decimals))
    };
    TvlApiCharts { hourly: chart(hourly), six_hourly: chart(six_hourly), daily: chart(daily) }
}
