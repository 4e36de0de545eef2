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

use std::time::Instant;

use thiserror::Error;

use super::{
    api::{ApiErrorCode, ApiResult},
    breakdown::{
        breakdown_from_reports, compute_canonical, merge, BreakdownSources,
        ProjectAssetsBreakdownApiResponse,
    },
    gap_filler::{fill, FilledSeries},
    grouping::group_by_key_and_asset,
    response::{generate, generate_asset_charts, DetailedTvlApiResponse, TvlApiCharts},
    time_boundaries::SlotRange,
    timings::resolve_timings,
};
use crate::{
    config::{ConfigError, TvlConfig},
    db::{DbError, DbObj},
    types::{AggregateKind, AssetId, ProjectId, ProjectKey, Report, ValueType},
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Answers TVL queries from the stored reports.
///
/// Holds no state besides the configuration; every call reads fresh rows.
#[derive(Clone)]
pub struct TvlService {
    db: DbObj,
    config: TvlConfig,
    fingerprint: String,
}

impl TvlService {
    pub fn new(db: DbObj, config: TvlConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let fingerprint = config.fingerprint();
        tracing::debug!("TVL config fingerprint {}", fingerprint);
        Ok(Self { db, config, fingerprint })
    }

    /// Configured projects followed by the synthetic rollups.
    pub fn project_keys(&self) -> Vec<ProjectKey> {
        self.config
            .projects
            .iter()
            .cloned()
            .map(ProjectKey::from)
            .chain(AggregateKind::ALL.into_iter().map(ProjectKey::from))
            .collect()
    }

    /// Latest timestamp to answer from, or the reason no answer can be given.
    async fn latest_usable_timestamp(&self) -> Result<Result<u64, ApiErrorCode>, ServiceError> {
        let timings = resolve_timings(self.db.as_ref(), &self.fingerprint).await?;

        let Some(latest) = timings.latest_timestamp else {
            tracing::info!("No aggregated data available");
            return Ok(Err(ApiErrorCode::NoData));
        };
        if !timings.is_synced && self.config.error_on_unsynced_detailed_tvl {
            tracing::info!("Refusing to serve unsynced data at {}", latest);
            return Ok(Err(ApiErrorCode::DataNotFullySynced));
        }
        Ok(Ok(latest))
    }

    fn ranges(&self, latest: u64) -> [SlotRange; 3] {
        let resolutions = &self.config.resolutions;
        let genesis = self.config.genesis_timestamp;
        [
            SlotRange::for_resolution(&resolutions.hourly, latest, genesis),
            SlotRange::for_resolution(&resolutions.six_hourly, latest, genesis),
            SlotRange::for_resolution(&resolutions.daily, latest, genesis),
        ]
    }

    /// Charts of every project and rollup at all three resolutions, plus the latest
    /// per-asset values.
    pub async fn get_detailed_tvl(
        &self,
    ) -> Result<ApiResult<DetailedTvlApiResponse>, ServiceError> {
        let start = Instant::now();
        let latest = match self.latest_usable_timestamp().await? {
            Ok(latest) => latest,
            Err(code) => return Ok(ApiResult::error(code)),
        };

        let resolutions = &self.config.resolutions;
        let [hourly_range, six_hourly_range, daily_range] = self.ranges(latest);

        let (hourly, six_hourly, daily, latest_reports) = tokio::try_join!(
            self.db.get_aggregated_reports(
                resolutions.hourly.step_secs,
                hourly_range.min_timestamp(&resolutions.hourly)
            ),
            self.db.get_aggregated_reports(
                resolutions.six_hourly.step_secs,
                six_hourly_range.min_timestamp(&resolutions.six_hourly)
            ),
            self.db.get_aggregated_reports(
                resolutions.daily.step_secs,
                daily_range.min_timestamp(&resolutions.daily)
            ),
            self.db.get_reports_at_timestamp(latest),
        )?;

        tracing::debug!(
            "Fetched {} hourly, {} six hourly, {} daily aggregates and {} reports at {}",
            hourly.len(),
            six_hourly.len(),
            daily.len(),
            latest_reports.len(),
            latest
        );

        let keys = self.project_keys();
        let hourly = fill(&hourly_range, hourly, &keys);
        let six_hourly = fill(&six_hourly_range, six_hourly, &keys);
        let daily = fill(&daily_range, daily, &keys);
        let latest_grouped = group_by_key_and_asset(latest_reports);

        let response = generate(
            &hourly,
            &six_hourly,
            &daily,
            &latest_grouped,
            &keys,
            &self.config.tokens,
        );

        tracing::info!("get_detailed_tvl completed in {:?}", start.elapsed());
        Ok(ApiResult::success(response))
    }

    /// Charts of a single asset of a project.
    ///
    /// Unknown projects or assets are rejected before any storage access.
    pub async fn get_project_asset_charts(
        &self,
        project_id: &ProjectId,
        chain_id: u64,
        asset_id: &AssetId,
    ) -> Result<ApiResult<TvlApiCharts>, ServiceError> {
        let start = Instant::now();
        let token = match self.config.find_token(asset_id, chain_id) {
            Some(token) if self.config.has_project(project_id) => token,
            _ => {
                tracing::debug!(
                    "Invalid asset chart request for {} / {} on chain {}",
                    project_id,
                    asset_id,
                    chain_id
                );
                return Ok(ApiResult::error(ApiErrorCode::InvalidProjectOrAsset));
            }
        };

        let latest = match self.latest_usable_timestamp().await? {
            Ok(latest) => latest,
            Err(code) => return Ok(ApiResult::error(code)),
        };

        let resolutions = &self.config.resolutions;
        let [hourly_range, six_hourly_range, daily_range] = self.ranges(latest);
        let (db, value_type) = (&self.db, token.value_type);
        let series = move |step_secs, min_timestamp| {
            db.get_asset_series(project_id, chain_id, asset_id, value_type, step_secs, min_timestamp)
        };

        let (hourly, six_hourly, daily) = tokio::try_join!(
            series(resolutions.hourly.step_secs, hourly_range.min_timestamp(&resolutions.hourly)),
            series(
                resolutions.six_hourly.step_secs,
                six_hourly_range.min_timestamp(&resolutions.six_hourly)
            ),
            series(resolutions.daily.step_secs, daily_range.min_timestamp(&resolutions.daily)),
        )?;

        let keys = [project_id.clone()];
        let fill_one = |range: &SlotRange, rows: Vec<Report>| {
            fill(range, rows, &keys)
                .remove(project_id)
                .unwrap_or(FilledSeries { points: Vec::new() })
        };
        let charts = generate_asset_charts(
            &fill_one(&hourly_range, hourly),
            &fill_one(&six_hourly_range, six_hourly),
            &fill_one(&daily_range, daily),
            token,
        );

        tracing::info!(
            "get_project_asset_charts for {} / {} completed in {:?}",
            project_id,
            asset_id,
            start.elapsed()
        );
        Ok(ApiResult::success(charts))
    }

    /// Canonical, native and external asset breakdowns of every project at the latest
    /// timestamp.
    pub async fn get_project_assets_breakdown(
        &self,
    ) -> Result<ApiResult<ProjectAssetsBreakdownApiResponse>, ServiceError> {
        let start = Instant::now();
        let latest = match self.latest_usable_timestamp().await? {
            Ok(latest) => latest,
            Err(code) => return Ok(ApiResult::error(code)),
        };

        let (balances, prices, reports) = tokio::try_join!(
            self.db.get_balances_at_timestamp(latest),
            self.db.get_prices_at_timestamp(latest),
            self.db.get_reports_at_timestamp(latest),
        )?;

        tracing::debug!(
            "Fetched {} balances, {} prices and {} reports at {}",
            balances.len(),
            prices.len(),
            reports.len(),
            latest
        );

        let tokens = &self.config.tokens;
        let sources = BreakdownSources {
            canonical: compute_canonical(&balances, &prices, tokens),
            native: breakdown_from_reports(&reports, ValueType::Nmv, &prices, tokens),
            external: breakdown_from_reports(&reports, ValueType::Ebv, &prices, tokens),
        };
        let response = merge(latest, &self.config.projects, &sources);

        tracing::info!("get_project_assets_breakdown completed in {:?}", start.elapsed());
        Ok(ApiResult::success(response))
    }
}
