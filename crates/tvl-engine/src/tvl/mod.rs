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

pub mod api;
pub mod breakdown;
pub mod gap_filler;
pub mod grouping;
pub mod response;
mod service;
pub mod time_boundaries;
pub mod timings;

pub use api::{ApiErrorCode, ApiResult};
pub use breakdown::ProjectAssetsBreakdownApiResponse;
pub use response::{DetailedTvlApiResponse, TvlApiCharts};
pub use service::{ServiceError, TvlService};
pub use timings::SyncStatus;
