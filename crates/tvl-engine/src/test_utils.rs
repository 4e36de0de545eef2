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

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use alloy::primitives::U256;
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{any::install_default_drivers, AnyPool};
use tempfile::NamedTempFile;

use crate::{
    config::{ResolutionsConfig, TokenConfig, TvlConfig},
    db::{DbError, DbObj, FingerprintCounts, SqlTvlDb, TvlDb},
    types::{
        AggregatedReport, AssetId, BalanceRecord, PriceRecord, ProjectId, ProjectKey, Report,
        ValueType,
    },
};

pub const HOUR: u64 = 3_600;
pub const DAY: u64 = 86_400;

/// Config with two projects, a canonical USDC, a native OP and an external WBTC.
///
/// Hourly charts span one day, six hourly charts span one week.
pub fn sample_config() -> TvlConfig {
    TvlConfig {
        error_on_unsynced_detailed_tvl: false,
        genesis_timestamp: 0,
        resolutions: ResolutionsConfig::with_windows(DAY, 7 * DAY),
        projects: vec![ProjectId::new("arbitrum"), ProjectId::new("optimism")],
        tokens: vec![
            TokenConfig {
                asset_id: AssetId::new("usdc"),
                chain_id: 1,
                symbol: "USDC".to_string(),
                decimals: 6,
                value_type: ValueType::Cbv,
            },
            TokenConfig {
                asset_id: AssetId::new("op"),
                chain_id: 10,
                symbol: "OP".to_string(),
                decimals: 18,
                value_type: ValueType::Nmv,
            },
            TokenConfig {
                asset_id: AssetId::new("wbtc"),
                chain_id: 42161,
                symbol: "WBTC".to_string(),
                decimals: 8,
                value_type: ValueType::Ebv,
            },
        ],
    }
}

pub fn report(
    project: &str,
    chain_id: u64,
    asset: &str,
    value_type: ValueType,
    timestamp: u64,
    amount: u64,
    usd_value: u64,
) -> Report {
    Report {
        project_id: ProjectId::new(project),
        chain_id,
        asset_id: AssetId::new(asset),
        value_type,
        timestamp,
        amount: U256::from(amount),
        usd_value: U256::from(usd_value),
    }
}

pub fn aggregated(
    project: impl Into<ProjectKey>,
    value_type: ValueType,
    timestamp: u64,
    usd_value: u64,
) -> AggregatedReport {
    AggregatedReport {
        project: project.into(),
        value_type,
        timestamp,
        usd_value: U256::from(usd_value),
    }
}

/// SQLite backed [`SqlTvlDb`] in a temporary file, with helpers to seed rows.
pub struct TestDb {
    pub db: Arc<SqlTvlDb>,
    pub db_url: String,
    pub pool: AnyPool,
    pub _temp_file: Option<NamedTempFile>,
}

impl TestDb {
    pub async fn new() -> Result<Self, DbError> {
        install_default_drivers();

        // Runs the DB tests against PostgreSQL when TVL_DATABASE_URL is set.
        // Only supported with --test-threads=1
        if let Ok(db_url) = std::env::var("TVL_DATABASE_URL") {
            if db_url.starts_with("postgres") {
                let pool = AnyPool::connect(&db_url).await?;
                let db = Arc::new(SqlTvlDb::new(&db_url, None, false).await?);
                let test_db = Self { db, db_url, pool, _temp_file: None };
                test_db.cleanup().await?;
                tracing::info!("Testing with Postgres. Must only run with --test-threads=1");
                return Ok(test_db);
            }
        }

        let temp_file = NamedTempFile::new().map_err(anyhow::Error::from)?;
        let db_url = format!("sqlite:{}", temp_file.path().display());
        let pool = AnyPool::connect(&db_url).await?;
        let db = Arc::new(SqlTvlDb::new(&db_url, None, false).await?);

        Ok(Self { db, db_url, pool, _temp_file: Some(temp_file) })
    }

    pub fn get_db(&self) -> DbObj {
        self.db.clone()
    }

    pub async fn cleanup(&self) -> Result<(), DbError> {
        if self.db_url.starts_with("postgres") {
            for table in
                ["aggregated_reports", "aggregated_report_status", "reports", "balances", "prices"]
            {
                sqlx::query(&format!("DELETE FROM {table}")).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    pub async fn insert_aggregated(&self, row: &AggregatedReport) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO aggregated_reports (project_id, report_type, timestamp, usd_value)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(row.project.to_string())
        .bind(row.value_type.to_string())
        .bind(row.timestamp as i64)
        .bind(row.usd_value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_status(&self, timestamp: u64, config_hash: &str) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO aggregated_report_status (timestamp, config_hash) VALUES ($1, $2)",
        )
        .bind(timestamp as i64)
        .bind(config_hash.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_report(&self, report: &Report) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO reports
                (project_id, chain_id, asset_id, report_type, timestamp, amount, usd_value)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(report.project_id.to_string())
        .bind(report.chain_id as i64)
        .bind(report.asset_id.to_string())
        .bind(report.value_type.to_string())
        .bind(report.timestamp as i64)
        .bind(report.amount.to_string())
        .bind(report.usd_value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_balance(&self, balance: &BalanceRecord) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO balances (project_id, holder, chain_id, asset_id, timestamp, balance)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(balance.project_id.to_string())
        .bind(balance.holder.clone())
        .bind(balance.chain_id as i64)
        .bind(balance.asset_id.to_string())
        .bind(balance.timestamp as i64)
        .bind(balance.balance.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_price(&self, price: &PriceRecord) -> Result<(), DbError> {
        sqlx::query("INSERT INTO prices (asset_id, timestamp, price_usd) VALUES ($1, $2, $3)")
            .bind(price.asset_id.to_string())
            .bind(price.timestamp as i64)
            .bind(price.price_usd.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory [`TvlDb`] that counts every call and can be switched to fail.
#[derive(Default)]
pub struct MemoryDb {
    pub aggregated: Vec<AggregatedReport>,
    /// (timestamp, config hash) status rows
    pub statuses: Vec<(u64, String)>,
    pub reports: Vec<Report>,
    pub balances: Vec<BalanceRecord>,
    pub prices: Vec<PriceRecord>,
    calls: AtomicUsize,
    failing: AtomicBool,
    failing_method: Mutex<Option<&'static str>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aggregated(mut self, rows: Vec<AggregatedReport>) -> Self {
        self.aggregated = rows;
        self
    }

    /// Marks every given timestamp as aggregated under `config_hash`.
    pub fn with_statuses(mut self, timestamps: &[u64], config_hash: &str) -> Self {
        self.statuses.extend(timestamps.iter().map(|ts| (*ts, config_hash.to_string())));
        self
    }

    pub fn with_reports(mut self, rows: Vec<Report>) -> Self {
        self.reports = rows;
        self
    }

    pub fn with_balances(mut self, rows: Vec<BalanceRecord>) -> Self {
        self.balances = rows;
        self
    }

    pub fn with_prices(mut self, rows: Vec<PriceRecord>) -> Self {
        self.prices = rows;
        self
    }

    /// Number of storage calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fails only calls to the named [`TvlDb`] method, every other method keeps working.
    pub fn set_failing_method(&self, method: &'static str) {
        *self.failing_method.lock().unwrap() = Some(method);
    }

    fn record_call(&self, method: &'static str) -> Result<(), DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let method_fails = *self.failing_method.lock().unwrap() == Some(method);
        if method_fails || self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Error(anyhow!("storage unavailable in {method}")));
        }
        Ok(())
    }
}

fn on_grid(timestamp: u64, step_secs: u64, min_timestamp: Option<u64>) -> bool {
    timestamp % step_secs == 0 && timestamp >= min_timestamp.unwrap_or(0)
}

#[async_trait]
impl TvlDb for MemoryDb {
    async fn get_aggregated_reports(
        &self,
        step_secs: u64,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<AggregatedReport>, DbError> {
        self.record_call("get_aggregated_reports")?;
        Ok(self
            .aggregated
            .iter()
            .filter(|r| on_grid(r.timestamp, step_secs, min_timestamp))
            .cloned()
            .collect())
    }

    async fn get_reports_at_timestamp(&self, timestamp: u64) -> Result<Vec<Report>, DbError> {
        self.record_call("get_reports_at_timestamp")?;
        Ok(self.reports.iter().filter(|r| r.timestamp == timestamp).cloned().collect())
    }

    async fn get_asset_series(
        &self,
        project_id: &ProjectId,
        chain_id: u64,
        asset_id: &AssetId,
        value_type: ValueType,
        step_secs: u64,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<Report>, DbError> {
        self.record_call("get_asset_series")?;
        Ok(self
            .reports
            .iter()
            .filter(|r| {
                &r.project_id == project_id
                    && r.chain_id == chain_id
                    && &r.asset_id == asset_id
                    && r.value_type == value_type
                    && on_grid(r.timestamp, step_secs, min_timestamp)
            })
            .cloned()
            .collect())
    }

    async fn get_balances_at_timestamp(
        &self,
        timestamp: u64,
    ) -> Result<Vec<BalanceRecord>, DbError> {
        self.record_call("get_balances_at_timestamp")?;
        Ok(self.balances.iter().filter(|b| b.timestamp == timestamp).cloned().collect())
    }

    async fn get_prices_at_timestamp(&self, timestamp: u64) -> Result<Vec<PriceRecord>, DbError> {
        self.record_call("get_prices_at_timestamp")?;
        Ok(self.prices.iter().filter(|p| p.timestamp == timestamp).cloned().collect())
    }

    async fn count_aggregated_matching_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<FingerprintCounts, DbError> {
        self.record_call("count_aggregated_matching_fingerprint")?;
        let matching = self.statuses.iter().filter(|(_, hash)| hash == fingerprint).count();
        Ok(FingerprintCounts {
            matching: matching as u64,
            different: (self.statuses.len() - matching) as u64,
        })
    }

    async fn latest_aggregated_timestamp(&self) -> Result<Option<u64>, DbError> {
        self.record_call("latest_aggregated_timestamp")?;
        Ok(self.aggregated.iter().map(|r| r.timestamp).max())
    }
}
