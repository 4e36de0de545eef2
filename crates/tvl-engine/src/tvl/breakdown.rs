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

//! Per-project asset breakdowns by backing category.
//!
//! Canonical entries are valued live from escrow balances and prices, native and
//! external entries come from the latest precomputed reports. Categories are kept as
//! parallel lists, the same asset may appear once in each.

use std::collections::{BTreeMap, HashMap};

use alloy::primitives::U256;
use serde::Serialize;

use super::{
    grouping::Grouped,
    response::{format_fixed, format_usd},
};
use crate::{
    config::TokenConfig,
    types::{
        AssetId, BalanceRecord, PriceRecord, ProjectId, Report, ValueType, PRICE_DECIMALS,
        USD_DECIMALS,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowBreakdown {
    pub escrow_address: String,
    pub amount: String,
    pub usd_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAssetBreakdown {
    pub asset_id: AssetId,
    pub chain_id: u64,
    pub amount: String,
    pub usd_value: String,
    pub usd_price: String,
    pub escrows: Vec<EscrowBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBreakdown {
    pub asset_id: AssetId,
    pub chain_id: u64,
    pub amount: String,
    pub usd_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectAssetsBreakdown {
    pub canonical: Vec<CanonicalAssetBreakdown>,
    pub native: Vec<AssetBreakdown>,
    pub external: Vec<AssetBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssetsBreakdownApiResponse {
    pub data_timestamp: u64,
    pub breakdowns: BTreeMap<ProjectId, ProjectAssetsBreakdown>,
}

/// Entries of one category, keyed by project.
pub type CategoryBreakdown<T> = HashMap<ProjectId, Vec<T>>;

/// The three independently computed inputs of [`merge`].
#[derive(Debug, Clone, Default)]
pub struct BreakdownSources {
    pub canonical: CategoryBreakdown<CanonicalAssetBreakdown>,
    pub native: CategoryBreakdown<AssetBreakdown>,
    pub external: CategoryBreakdown<AssetBreakdown>,
}

#[derive(Debug, Default)]
struct AssetTotal {
    decimals: u8,
    amount: U256,
    usd: U256,
    price: Option<U256>,
    escrows: Vec<(String, U256, U256)>,
}

/// USD value (with [`USD_DECIMALS`]) of `amount` raw units priced at `price_usd`.
pub fn usd_value_of(amount: U256, decimals: u8, price_usd: U256) -> U256 {
    let exponent = u64::from(decimals) + u64::from(PRICE_DECIMALS) - u64::from(USD_DECIMALS);
    match U256::from(10u64).checked_pow(U256::from(exponent)) {
        Some(divisor) => amount.saturating_mul(price_usd) / divisor,
        None => U256::ZERO,
    }
}

fn price_lookup(prices: &[PriceRecord]) -> HashMap<&AssetId, U256> {
    prices.iter().map(|p| (&p.asset_id, p.price_usd)).collect()
}

fn sorted_by_usd<T>(
    mut totals: Vec<((AssetId, u64), T)>,
    usd: impl Fn(&T) -> U256,
) -> Vec<((AssetId, u64), T)> {
    totals.sort_by(|a, b| usd(&b.1).cmp(&usd(&a.1)).then_with(|| a.0.cmp(&b.0)));
    totals
}

/// Values canonically bridged assets from escrow balances and prices.
///
/// Balances of tokens that are not configured as canonical are ignored, balances
/// without a price are skipped.
pub fn compute_canonical(
    balances: &[BalanceRecord],
    prices: &[PriceRecord],
    tokens: &[TokenConfig],
) -> CategoryBreakdown<CanonicalAssetBreakdown> {
    let prices = price_lookup(prices);
    let mut projects: Grouped<ProjectId, Grouped<(AssetId, u64), AssetTotal>> = Grouped::new();

    for balance in balances {
        let Some(token) = tokens.iter().find(|t| {
            t.asset_id == balance.asset_id
                && t.chain_id == balance.chain_id
                && t.value_type == ValueType::Cbv
        }) else {
            tracing::debug!(
                "Ignoring balance of non canonical asset {} on chain {}",
                balance.asset_id,
                balance.chain_id
            );
            continue;
        };
        let Some(price) = prices.get(&balance.asset_id) else {
            tracing::warn!(
                "No price for {} at {}, skipping balance of {}",
                balance.asset_id,
                balance.timestamp,
                balance.holder
            );
            continue;
        };

        let usd = usd_value_of(balance.balance, token.decimals, *price);
        let total = projects
            .entry_or_default(balance.project_id.clone())
            .entry_or_default((balance.asset_id.clone(), balance.chain_id));
        total.decimals = token.decimals;
        total.price = Some(*price);
        total.amount = total.amount.saturating_add(balance.balance);
        total.usd = total.usd.saturating_add(usd);
        total.escrows.push((balance.holder.clone(), balance.balance, usd));
    }

    projects
        .into_vec()
        .into_iter()
        .map(|(project, assets)| {
            let entries = sorted_by_usd(assets.into_vec(), |t| t.usd)
                .into_iter()
                .map(|((asset_id, chain_id), mut total)| {
                    total.escrows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                    CanonicalAssetBreakdown {
                        asset_id,
                        chain_id,
                        amount: format_fixed(total.amount, total.decimals),
                        usd_value: format_usd(total.usd),
                        usd_price: format_fixed(total.price.unwrap_or_default(), PRICE_DECIMALS),
                        escrows: total
                            .escrows
                            .into_iter()
                            .map(|(escrow_address, amount, usd)| EscrowBreakdown {
                                escrow_address,
                                amount: format_fixed(amount, total.decimals),
                                usd_value: format_usd(usd),
                            })
                            .collect(),
                    }
                })
                .collect();
            (project, entries)
        })
        .collect()
}

/// Builds the native or external category from the latest reports of `value_type`.
pub fn breakdown_from_reports(
    reports: &[Report],
    value_type: ValueType,
    prices: &[PriceRecord],
    tokens: &[TokenConfig],
) -> CategoryBreakdown<AssetBreakdown> {
    let prices = price_lookup(prices);
    let mut projects: Grouped<ProjectId, Grouped<(AssetId, u64), AssetTotal>> = Grouped::new();

    for report in reports.iter().filter(|r| r.value_type == value_type) {
        let Some(token) =
            tokens.iter().find(|t| t.asset_id == report.asset_id && t.chain_id == report.chain_id)
        else {
            tracing::warn!(
                "Skipping {} report of unknown asset {} on chain {}",
                value_type,
                report.asset_id,
                report.chain_id
            );
            continue;
        };

        let total = projects
            .entry_or_default(report.project_id.clone())
            .entry_or_default((report.asset_id.clone(), report.chain_id));
        total.decimals = token.decimals;
        total.price = prices.get(&report.asset_id).copied();
        total.amount = total.amount.saturating_add(report.amount);
        total.usd = total.usd.saturating_add(report.usd_value);
    }

    projects
        .into_vec()
        .into_iter()
        .map(|(project, assets)| {
            let entries = sorted_by_usd(assets.into_vec(), |t| t.usd)
                .into_iter()
                .map(|((asset_id, chain_id), total)| AssetBreakdown {
                    asset_id,
                    chain_id,
                    amount: format_fixed(total.amount, total.decimals),
                    usd_value: format_usd(total.usd),
                    usd_price: total.price.map(|p| format_fixed(p, PRICE_DECIMALS)),
                })
                .collect();
            (project, entries)
        })
        .collect()
}

/// Merges the three categories into one record per requested project.
///
/// Every project of `projects` gets an entry, empty when no category mentions it.
/// Projects that only appear in the sources are left out.
pub fn merge(
    data_timestamp: u64,
    projects: &[ProjectId],
    sources: &BreakdownSources,
) -> ProjectAssetsBreakdownApiResponse {
    let breakdowns = projects
        .iter()
        .map(|project| {
            let breakdown = ProjectAssetsBreakdown {
                canonical: sources.canonical.get(project).cloned().unwrap_or_default(),
                native: sources.native.get(project).cloned().unwrap_or_default(),
                external: sources.external.get(project).cloned().unwrap_or_default(),
            };
            (project.clone(), breakdown)
        })
        .collect();

    ProjectAssetsBreakdownApiResponse { data_timestamp, breakdowns }
}
