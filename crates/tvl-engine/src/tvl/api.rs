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

//! Outcome types returned to callers of the engine.

use serde::Serialize;

/// Expected failures, reported as values rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    /// No aggregated data exists at all
    NoData,
    /// Data exists but was aggregated under another config and partial data is refused
    DataNotFullySynced,
    /// The requested project or asset is not configured
    InvalidProjectOrAsset,
}

impl ApiErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::NoData => "NO_DATA",
            ApiErrorCode::DataNotFullySynced => "DATA_NOT_FULLY_SYNCED",
            ApiErrorCode::InvalidProjectOrAsset => "INVALID_PROJECT_OR_ASSET",
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// `{"result": "success", "data": ..}` or `{"result": "error", "error": "<CODE>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ApiResult<T> {
    Success { data: T },
    Error { error: ApiErrorCode },
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        ApiResult::Success { data }
    }

    pub fn error(error: ApiErrorCode) -> Self {
        ApiResult::Error { error }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success { data } => Some(data),
            ApiResult::Error { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResult::Success { data } => Some(data),
            ApiResult::Error { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<ApiErrorCode> {
        match self {
            ApiResult::Success { .. } => None,
            ApiResult::Error { error } => Some(*error),
        }
    }
}
