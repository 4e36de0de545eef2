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

//! Read-only access to the stored TVL rows.

use std::{str::FromStr, sync::Arc};

use alloy::primitives::U256;
use async_trait::async_trait;
use sqlx::{
    any::{install_default_drivers, AnyConnectOptions, AnyPoolOptions, AnyRow},
    AnyPool, Row,
};

use super::DbError;
use crate::types::{
    AggregatedReport, AssetId, BalanceRecord, PriceRecord, ProjectId, ProjectKey, Report,
    ValueType,
};

/// Number of aggregated status rows computed under the active config versus any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerprintCounts {
    pub matching: u64,
    pub different: u64,
}

/// Storage collaborator of the engine.
///
/// Rows belong to a resolution when their timestamp is a multiple of the resolution
/// step. Every method only reads.
#[async_trait]
pub trait TvlDb {
    /// Aggregated reports on the `step_secs` grid, at or after `min_timestamp` when given.
    async fn get_aggregated_reports(
        &self,
        step_secs: u64,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<AggregatedReport>, DbError>;

    async fn get_reports_at_timestamp(&self, timestamp: u64) -> Result<Vec<Report>, DbError>;

    /// Reports of a single (project, chain, asset, value type) tuple on the `step_secs` grid.
    async fn get_asset_series(
        &self,
        project_id: &ProjectId,
        chain_id: u64,
        asset_id: &AssetId,
        value_type: ValueType,
        step_secs: u64,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<Report>, DbError>;

    async fn get_balances_at_timestamp(
        &self,
        timestamp: u64,
    ) -> Result<Vec<BalanceRecord>, DbError>;

    async fn get_prices_at_timestamp(&self, timestamp: u64) -> Result<Vec<PriceRecord>, DbError>;

    async fn count_aggregated_matching_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<FingerprintCounts, DbError>;

    async fn latest_aggregated_timestamp(&self) -> Result<Option<u64>, DbError>;
}

pub type DbObj = Arc<dyn TvlDb + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SqlTvlDb {
    pool: AnyPool,
}

impl SqlTvlDb {
    /// For SQLite use a `sqlite:file_path` URL; for Postgres `postgres://`.
    ///
    /// Pass `skip_migrations` when connecting to a read replica.
    pub async fn new(
        conn_str: &str,
        pool_options: Option<AnyPoolOptions>,
        skip_migrations: bool,
    ) -> Result<Self, DbError> {
        install_default_drivers();
        let opts = AnyConnectOptions::from_str(conn_str)?;

        let pool = pool_options
            .unwrap_or_else(|| AnyPoolOptions::new().max_connections(7))
            .connect_with(opts)
            .await?;

        if !skip_migrations {
            sqlx::migrate!().run(&pool).await?;
        }

        Ok(Self { pool })
    }
}

fn parse_u256(row: &AnyRow, column: &'static str, table: &'static str) -> Result<U256, DbError> {
    let value: String = row.try_get(column)?;
    U256::from_str(&value)
        .map_err(|e| DbError::BadRow { table, reason: format!("{column} {value:?}: {e}") })
}

fn parse_timestamp(row: &AnyRow, table: &'static str) -> Result<u64, DbError> {
    let value: i64 = row.try_get("timestamp")?;
    u64::try_from(value)
        .map_err(|_| DbError::BadRow { table, reason: format!("negative timestamp {value}") })
}

fn parse_chain_id(row: &AnyRow, table: &'static str) -> Result<u64, DbError> {
    let value: i64 = row.try_get("chain_id")?;
    u64::try_from(value)
        .map_err(|_| DbError::BadRow { table, reason: format!("negative chain id {value}") })
}

fn parse_value_type(row: &AnyRow, table: &'static str) -> Result<ValueType, DbError> {
    let value: String = row.try_get("report_type")?;
    ValueType::from_str(&value).map_err(|reason| DbError::BadRow { table, reason })
}

fn report_from_row(row: &AnyRow) -> Result<Report, DbError> {
    Ok(Report {
        project_id: ProjectId::new(row.try_get::<String, _>("project_id")?),
        chain_id: parse_chain_id(row, "reports")?,
        asset_id: AssetId::new(row.try_get::<String, _>("asset_id")?),
        value_type: parse_value_type(row, "reports")?,
        timestamp: parse_timestamp(row, "reports")?,
        amount: parse_u256(row, "amount", "reports")?,
        usd_value: parse_u256(row, "usd_value", "reports")?,
    })
}

/// Storage integers are signed 64 bit, larger query parameters are rejected.
fn to_db_int(value: u64, name: &'static str) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::OutOfRange { name, value })
}

#[async_trait]
impl TvlDb for SqlTvlDb {
    async fn get_aggregated_reports(
        &self,
        step_secs: u64,
        min_timestamp: Option<u64>,
    ) -> Result<Vec<AggregatedReport>, DbError> {
        let rows = sqlx::query(
            "SELECT project_id, report_type, timestamp, usd_value
             FROM aggregated_reports
             WHERE timestamp >= $1 AND timestamp % $2 = 0
             ORDER BY timestamp ASC",
        )
        .bind(to_db_int(min_timestamp.unwrap_or(0), "min_timestamp")?)
        .bind(to_db_int(step_secs, "step_secs")?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let project_id: String = row.try_get("project_id")?;
                Ok(AggregatedReport {
                    project: ProjectKey::from_str(&project_id).unwrap_or_else(|e| match e {}),
                    value_type: parse_value_type(row, "aggregated_reports")?,
                    timestamp: parse_timestamp(row, "aggregated_reports")?,
                    usd_value: parse_u256(row, "usd_value", "aggregated_reports")?,
                })
            })
            .collect()
    }

    async fn get_reports_at_timestamp(&self, timestamp: u64) -> Result<Vec<Report>, DbError> {
        let rows = sqlx::query(
            "SELECT project_id, chain_id, asset_id, report_type, timestamp, amount, usd_value
             FROM reports
             WHERE timestamp = $1",
        )
        .bind(to_db_int(timestamp, "timestamp")?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
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
        let rows = sqlx::query(
            "SELECT project_id, chain_id, asset_id, report_type, timestamp, amount, usd_value
             FROM reports
             WHERE project_id = $1 AND chain_id = $2 AND asset_id = $3 AND report_type = $4
               AND timestamp >= $5 AND timestamp % $6 = 0
             ORDER BY timestamp ASC",
        )
        .bind(project_id.as_str())
        .bind(to_db_int(chain_id, "chain_id")?)
        .bind(asset_id.as_str())
        .bind(value_type.to_string())
        .bind(to_db_int(min_timestamp.unwrap_or(0), "min_timestamp")?)
        .bind(to_db_int(step_secs, "step_secs")?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }

    async fn get_balances_at_timestamp(
        &self,
        timestamp: u64,
    ) -> Result<Vec<BalanceRecord>, DbError> {
        let rows = sqlx::query(
            "SELECT project_id, holder, chain_id, asset_id, timestamp, balance
             FROM balances
             WHERE timestamp = $1",
        )
        .bind(to_db_int(timestamp, "timestamp")?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(BalanceRecord {
                    project_id: ProjectId::new(row.try_get::<String, _>("project_id")?),
                    holder: row.try_get("holder")?,
                    chain_id: parse_chain_id(row, "balances")?,
                    asset_id: AssetId::new(row.try_get::<String, _>("asset_id")?),
                    timestamp: parse_timestamp(row, "balances")?,
                    balance: parse_u256(row, "balance", "balances")?,
                })
            })
            .collect()
    }

    async fn get_prices_at_timestamp(&self, timestamp: u64) -> Result<Vec<PriceRecord>, DbError> {
        let rows = sqlx::query(
            "SELECT asset_id, timestamp, price_usd FROM prices WHERE timestamp = $1",
        )
        .bind(to_db_int(timestamp, "timestamp")?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PriceRecord {
                    asset_id: AssetId::new(row.try_get::<String, _>("asset_id")?),
                    timestamp: parse_timestamp(row, "prices")?,
                    price_usd: parse_u256(row, "price_usd", "prices")?,
                })
            })
            .collect()
    }

    async fn count_aggregated_matching_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<FingerprintCounts, DbError> {
        let row = sqlx::query(
            "SELECT
                COALESCE(SUM(CASE WHEN config_hash = $1 THEN 1 ELSE 0 END), 0) AS matching,
                COALESCE(SUM(CASE WHEN config_hash = $1 THEN 0 ELSE 1 END), 0) AS different
             FROM aggregated_report_status",
        )
        .bind(fingerprint)
        .fetch_one(&self.pool)
        .await?;

        let matching: i64 = row.try_get("matching")?;
        let different: i64 = row.try_get("different")?;
        Ok(FingerprintCounts {
            matching: matching.max(0) as u64,
            different: different.max(0) as u64,
        })
    }

    async fn latest_aggregated_timestamp(&self) -> Result<Option<u64>, DbError> {
        let row = sqlx::query("SELECT MAX(timestamp) AS latest FROM aggregated_reports")
            .fetch_one(&self.pool)
            .await?;

        let latest: Option<i64> = row.try_get("latest")?;
        latest
            .map(|value| {
                u64::try_from(value).map_err(|_| DbError::BadRow {
                    table: "aggregated_reports",
                    reason: format!("negative timestamp {value}"),
                })
            })
            .transpose()
    }
}
