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

use alloy::primitives::U256;
use tvl_engine::{
    test_utils::{aggregated, report, TestDb, DAY},
    types::{AggregateKind, AssetId, BalanceRecord, PriceRecord, ProjectId, ValueType},
};

pub const LATEST: u64 = 3 * DAY;

/// Seeds three days of data for arbitrum and optimism, aggregated under `fingerprint`.
pub async fn seed(test_db: &TestDb, fingerprint: &str) {
    let arbitrum = ProjectId::new("arbitrum");
    let optimism = ProjectId::new("optimism");

    for (day, usd) in [(DAY, 1_000u64), (2 * DAY, 2_000), (LATEST, 4_000)] {
        for row in [
            aggregated(arbitrum.clone(), ValueType::Cbv, day, usd),
            aggregated(optimism.clone(), ValueType::Nmv, day, usd / 10),
            aggregated(AggregateKind::All, ValueType::Cbv, day, usd),
            aggregated(AggregateKind::All, ValueType::Nmv, day, usd / 10),
            aggregated(AggregateKind::Layer2s, ValueType::Cbv, day, usd),
        ] {
            test_db.insert_aggregated(&row).await.unwrap();
        }
        test_db.insert_status(day, fingerprint).await.unwrap();

        let amount = usd * 10_000;
        test_db
            .insert_report(&report("arbitrum", 1, "usdc", ValueType::Cbv, day, amount, usd))
            .await
            .unwrap();
    }

    // Off the hourly grid, must never show up
    test_db
        .insert_aggregated(&aggregated(arbitrum.clone(), ValueType::Cbv, LATEST - 1_800, 99_999))
        .await
        .unwrap();

    test_db
        .insert_report(&report("optimism", 10, "op", ValueType::Nmv, LATEST, 2 * 10u64.pow(18), 400))
        .await
        .unwrap();

    for (holder, balance) in [("0xescrow1", 30_000_000u64), ("0xescrow2", 10_000_000)] {
        test_db
            .insert_balance(&BalanceRecord {
                project_id: arbitrum.clone(),
                holder: holder.to_string(),
                chain_id: 1,
                asset_id: AssetId::new("usdc"),
                timestamp: LATEST,
                balance: U256::from(balance),
            })
            .await
            .unwrap();
    }

    for (asset, price) in [("usdc", 100_000_000u64), ("op", 200_000_000)] {
        test_db
            .insert_price(&PriceRecord {
                asset_id: AssetId::new(asset),
                timestamp: LATEST,
                price_usd: U256::from(price),
            })
            .await
            .unwrap();
    }
}
