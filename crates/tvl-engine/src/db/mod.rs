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

pub mod tvl;

use thiserror::Error;

pub use tvl::{DbObj, FingerprintCounts, SqlTvlDb, TvlDb};

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQL error {0:?}")]
    SqlErr(#[from] sqlx::Error),

    #[error("SQL Migration error {0:?}")]
    MigrateErr(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid row in {table}: {reason}")]
    BadRow { table: &'static str, reason: String },

    #[error("Query parameter {name} out of range: {value}")]
    OutOfRange { name: &'static str, value: u64 },

    #[error("Error: {0}")]
    Error(#[from] anyhow::Error),
}
