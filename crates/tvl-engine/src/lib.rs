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

//! Read side of the TVL pipeline.
//!
//! Stored aggregates and reports are turned into gap free chart series at three
//! resolutions, per asset charts and per project asset breakdowns.

pub mod config;
pub mod db;
pub mod tvl;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{TokenConfig, TvlConfig};
pub use db::{DbError, DbObj, SqlTvlDb, TvlDb};
pub use tvl::{ApiErrorCode, ApiResult, ServiceError, TvlService};
pub use types::{AggregateKind, AssetId, ProjectId, ProjectKey, ValueType};
