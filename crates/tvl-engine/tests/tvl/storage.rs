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

use tracing_test::traced_test;
use tvl_engine::{
    db::{DbError, FingerprintCounts, TvlDb},
    test_utils::{TestDb, DAY, HOUR},
    types::{AggregateKind, AssetId, ProjectId, ProjectKey, ValueType},
};

use crate::common::{seed, LATEST};

#[tokio::test]
#[traced_test]
async fn test_empty_database() {
    let test_db = TestDb::new().await.unwrap();
    let db = test_db.get_db();

    assert_eq!(db.latest_aggregated_timestamp().await.unwrap(), None);
    assert_eq!(
        db.count_aggregated_matching_fingerprint("abc").await.unwrap(),
        FingerprintCounts { matching: 0, different: 0 }
    );
    assert!(db.get_aggregated_reports(HOUR, None).await.unwrap().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_aggregated_reports_follow_the_grid() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "abc").await;
    let db = test_db.get_db();

    let hourly = db.get_aggregated_reports(HOUR, Some(2 * DAY)).await.unwrap();
    assert_eq!(hourly.len(), 10);
    assert!(hourly.iter().all(|r| r.timestamp % HOUR == 0 && r.timestamp >= 2 * DAY));
    assert!(hourly.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let daily = db.get_aggregated_reports(DAY, None).await.unwrap();
    assert_eq!(daily.len(), 15);
    assert!(daily.iter().any(|r| r.project == ProjectKey::from(AggregateKind::Layer2s)));
    assert!(daily
        .iter()
        .any(|r| r.project == ProjectKey::from(ProjectId::new("optimism"))
            && r.value_type == ValueType::Nmv));
}

#[tokio::test]
#[traced_test]
async fn test_timings_queries() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "abc").await;
    let db = test_db.get_db();

    assert_eq!(db.latest_aggregated_timestamp().await.unwrap(), Some(LATEST));
    assert_eq!(
        db.count_aggregated_matching_fingerprint("abc").await.unwrap(),
        FingerprintCounts { matching: 3, different: 0 }
    );
    assert_eq!(
        db.count_aggregated_matching_fingerprint("other").await.unwrap(),
        FingerprintCounts { matching: 0, different: 3 }
    );
}

#[tokio::test]
#[traced_test]
async fn test_point_in_time_queries() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "abc").await;
    let db = test_db.get_db();

    let reports = db.get_reports_at_timestamp(LATEST).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.timestamp == LATEST));

    let balances = db.get_balances_at_timestamp(LATEST).await.unwrap();
    assert_eq!(balances.len(), 2);
    assert!(db.get_balances_at_timestamp(DAY).await.unwrap().is_empty());

    let prices = db.get_prices_at_timestamp(LATEST).await.unwrap();
    assert_eq!(prices.len(), 2);
}

#[tokio::test]
#[traced_test]
async fn test_asset_series() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "abc").await;
    let db = test_db.get_db();

    let arbitrum = ProjectId::new("arbitrum");
    let usdc = AssetId::new("usdc");
    let series =
        db.get_asset_series(&arbitrum, 1, &usdc, ValueType::Cbv, DAY, None).await.unwrap();
    let timestamps: Vec<u64> = series.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![DAY, 2 * DAY, LATEST]);

    let recent =
        db.get_asset_series(&arbitrum, 1, &usdc, ValueType::Cbv, DAY, Some(LATEST)).await.unwrap();
    assert_eq!(recent.len(), 1);

    // Other value type or chain
    assert!(db
        .get_asset_series(&arbitrum, 1, &usdc, ValueType::Ebv, DAY, None)
        .await
        .unwrap()
        .is_empty());
    assert!(db
        .get_asset_series(&arbitrum, 10, &usdc, ValueType::Cbv, DAY, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_malformed_amount_is_rejected() {
    let test_db = TestDb::new().await.unwrap();
    sqlx::query(
        "INSERT INTO aggregated_reports (project_id, report_type, timestamp, usd_value)
         VALUES ('arbitrum', 'CBV', 3600, 'lots')",
    )
    .execute(&test_db.pool)
    .await
    .unwrap();

    let err = test_db.get_db().get_aggregated_reports(HOUR, None).await.unwrap_err();
    assert!(matches!(err, DbError::BadRow { table: "aggregated_reports", .. }));
}

#[tokio::test]
#[traced_test]
async fn test_out_of_range_parameters_are_rejected() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "abc").await;
    let db = test_db.get_db();

    let err = db.get_reports_at_timestamp(u64::MAX).await.unwrap_err();
    assert!(matches!(err, DbError::OutOfRange { name: "timestamp", value: u64::MAX }));

    let err = db
        .get_asset_series(
            &ProjectId::new("arbitrum"),
            u64::MAX,
            &AssetId::new("usdc"),
            ValueType::Cbv,
            DAY,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::OutOfRange { name: "chain_id", .. }));
}
