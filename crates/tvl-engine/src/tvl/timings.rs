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

use serde::Serialize;

use crate::db::{DbError, TvlDb};

/// Whether data exists and was aggregated under the active configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub latest_timestamp: Option<u64>,
    pub is_synced: bool,
}

impl SyncStatus {
    pub const NO_DATA: SyncStatus = SyncStatus { latest_timestamp: None, is_synced: false };
}

/// Resolves the latest aggregated timestamp and the sync state for `fingerprint`.
///
/// Without any aggregated row the status is [`SyncStatus::NO_DATA`], which is never
/// synced. Otherwise the data is synced when no status row differs from `fingerprint`.
pub async fn resolve_timings<D>(db: &D, fingerprint: &str) -> Result<SyncStatus, DbError>
where
    D: TvlDb + Send + Sync + ?Sized,
{
    let (counts, latest) = tokio::try_join!(
        db.count_aggregated_matching_fingerprint(fingerprint),
        db.latest_aggregated_timestamp(),
    )?;

    let Some(latest_timestamp) = latest else {
        return Ok(SyncStatus::NO_DATA);
    };

    if counts.different > 0 {
        tracing::warn!(
            "Aggregated data at {} is not synced: {} rows match the config, {} differ",
            latest_timestamp,
            counts.matching,
            counts.different
        );
    }

    Ok(SyncStatus { latest_timestamp: Some(latest_timestamp), is_synced: counts.different == 0 })
}
