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
    types::{AggregateKind, ProjectId, ProjectKey},
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
async fn test_detailed_tvl_end_to_end() {
    let (_test_db, service) = seeded_service().await;
    let response = service.get_detailed_tvl().await.unwrap().into_data().unwrap();

    let keys: Vec<String> = response.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["arbitrum", "optimism", "ALL", "BRIDGES", "LAYER2S"]);

    let arbitrum = &response[&ProjectKey::from(ProjectId::new("arbitrum"))];
    let hourly = &arbitrum.charts.hourly.data;
    assert_eq!(hourly.len(), 25);
    assert_eq!(hourly[0].timestamp, 2 * DAY);
    assert_eq!(hourly[0].values[0], "20.00");
    assert_eq!(hourly[24].timestamp, LATEST);
    assert_eq!(hourly[24].values[0], "40.00");
    // The unaligned aggregate is never rendered
    assert!(hourly.iter().all(|p| p.values[0] != "999.99"));

    assert_eq!(arbitrum.charts.daily.data.len(), 4);
    assert_eq!(arbitrum.tokens.len(), 1);
    assert_eq!(arbitrum.tokens[0].amount, "40.000000");
    assert_eq!(arbitrum.tokens[0].usd_value, "40.00");

    let optimism = &response[&ProjectKey::from(ProjectId::new("optimism"))];
    assert_eq!(optimism.tokens[0].symbol, "OP");
    assert_eq!(optimism.tokens[0].amount, "2.000000000000000000");

    let all = &response[&ProjectKey::from(AggregateKind::All)];
    assert_eq!(all.charts.daily.data[3].values, vec!["44.00", "40.00", "0.00", "4.00"]);
    let bridges = &response[&ProjectKey::from(AggregateKind::Bridges)];
    assert!(bridges.charts.daily.data.iter().all(|p| p.values[0] == "0.00"));
}

#[tokio::test]
#[traced_test]
async fn test_detailed_tvl_wire_format() {
    let (_test_db, service) = seeded_service().await;
    let json = serde_json::to_value(service.get_detailed_tvl().await.unwrap()).unwrap();

    assert_eq!(json["result"], "success");
    let charts = &json["data"]["arbitrum"]["charts"];
    assert_eq!(charts["hourly"]["types"], json!(["timestamp", "valueUsd", "cbv", "ebv", "nmv"]));
    assert_eq!(charts["daily"]["data"][3], json!([LATEST, "40.00", "40.00", "0.00", "0.00"]));
    assert_eq!(charts["sixHourly"]["data"].as_array().unwrap().len(), 13);
    assert_eq!(json["data"]["arbitrum"]["tokens"][0]["assetId"], "usdc");
    assert_eq!(json["data"]["arbitrum"]["tokens"][0]["chainId"], 1);
    assert_eq!(json["data"]["ALL"]["tokens"], json!([]));
}

#[tokio::test]
#[traced_test]
async fn test_no_data_end_to_end() {
    let test_db = TestDb::new().await.unwrap();
    let service = TvlService::new(test_db.get_db(), sample_config()).unwrap();

    let json = serde_json::to_value(service.get_detailed_tvl().await.unwrap()).unwrap();
    assert_eq!(json, json!({ "result": "error", "error": "NO_DATA" }));
}

#[tokio::test]
#[traced_test]
async fn test_unsynced_end_to_end() {
    let test_db = TestDb::new().await.unwrap();
    seed(&test_db, "aggregated-under-an-older-config").await;

    let mut config = sample_config();
    config.error_on_unsynced_detailed_tvl = true;
    let strict = TvlService::new(test_db.get_db(), config).unwrap();
    assert_eq!(
        strict.get_detailed_tvl().await.unwrap().error_code(),
        Some(ApiErrorCode::DataNotFullySynced)
    );

    // Partial data is served when allowed
    let lenient = TvlService::new(test_db.get_db(), sample_config()).unwrap();
    let response = lenient.get_detailed_tvl().await.unwrap().into_data().unwrap();
    assert_eq!(response.len(), 5);
}
