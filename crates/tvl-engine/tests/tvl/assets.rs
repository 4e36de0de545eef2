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

use serde_json::json;
use tracing_test::traced_test;
use tvl_engine::{
    test_utils::{sample_config, TestDb, DAY},
    tvl::{ApiErrorCode, TvlService},
    types::{AssetId, ProjectId},
};

use crate::common::{seed, LATEST};

async fn seeded_service() -> (TestDb, TvlService) {
    let test_db = TestDb::new().await.unwrap();
    let config = sample_config();
    seed(&test_db, &config.fingerprint()).await;
    let service = TvlService::new(test_db.get_db(), config).unwrap();
    (test_db, service)
}

#[tokio::test]
#[traced_test]
async fn test_asset_charts_end_to_end() {
    let (_test_db, service) = seeded_service().await;
    let charts = service
        .get_project_asset_charts(&ProjectId::new("arbitrum"), 1, &AssetId::new("usdc"))
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(charts.daily.types, vec!["timestamp", "usdc", "usd"]);
    let daily: Vec<(u64, Vec<String>)> =
        charts.daily.data.iter().map(|p| (p.timestamp, p.values.clone())).collect();
    assert_eq!(
        daily,
        vec![
            (0, vec!["0.000000".to_string(), "0.00".to_string()]),
            (DAY, vec!["10.000000".to_string(), "10.00".to_string()]),
            (2 * DAY, vec!["20.000000".to_string(), "20.00".to_string()]),
            (LATEST, vec!["40.000000".to_string(), "40.00".to_string()]),
        ]
    );
    assert_eq!(charts.hourly.data.len(), 25);
    assert_eq!(charts.hourly.data[12].values, vec!["0.000000", "0.00"]);
}

#[tokio::test]
#[traced_test]
async fn test_unknown_asset_end_to_end() {
    let (_test_db, service) = seeded_service().await;
    let result = service
        .get_project_asset_charts(&ProjectId::new("arbitrum"), 1, &AssetId::new("doge"))
        .await
        .unwrap();

    assert_eq!(result.error_code(), Some(ApiErrorCode::InvalidProjectOrAsset));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "result": "error", "error": "INVALID_PROJECT_OR_ASSET" })
    );
}

#[tokio::test]
#[traced_test]
async fn test_assets_breakdown_end_to_end() {
    let (_test_db, service) = seeded_service().await;
    let response = service.get_project_assets_breakdown().await.unwrap().into_data().unwrap();

    assert_eq!(response.data_timestamp, LATEST);

    let arbitrum = &response.breakdowns[&ProjectId::new("arbitrum")];
    assert_eq!(arbitrum.canonical.len(), 1);
    let usdc = &arbitrum.canonical[0];
    assert_eq!(usdc.amount, "40.000000");
    assert_eq!(usdc.usd_value, "40.00");
    let escrows: Vec<&str> = usdc.escrows.iter().map(|e| e.escrow_address.as_str()).collect();
    assert_eq!(escrows, vec!["0xescrow1", "0xescrow2"]);
    assert!(arbitrum.native.is_empty());
    assert!(arbitrum.external.is_empty());

    let optimism = &response.breakdowns[&ProjectId::new("optimism")];
    assert!(optimism.canonical.is_empty());
    assert_eq!(optimism.native.len(), 1);
    assert_eq!(optimism.native[0].usd_value, "4.00");
    assert_eq!(optimism.native[0].usd_price.as_deref(), Some("2.00000000"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["breakdowns"]["arbitrum"]["canonical"][0]["escrows"][1]["usdValue"], "10.00");
}
