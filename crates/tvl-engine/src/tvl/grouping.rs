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

//! Reshaping of flat row lists and value-type deduplication.
//!
//! Several rows can share a (key, timestamp) slot, one per value type. They are always
//! summed into a single value, never overwritten.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use alloy::primitives::U256;

use crate::types::{AggregatedReport, AssetId, ProjectId, ProjectKey, Report, ValueType};

/// A numeric slot value. `Default` is the zero placeholder.
pub trait SlotValue: Default + Clone {
    fn accumulate(&mut self, other: &Self);
}

/// A row that belongs to a time series.
pub trait SeriesRow {
    type Key: Clone + Eq + Hash;
    type Value: SlotValue;

    fn series_key(&self) -> Self::Key;
    fn timestamp(&self) -> u64;
    fn value(&self) -> Self::Value;
}

/// USD totals of a project slot, overall and per value type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TvlValues {
    pub usd: U256,
    pub cbv: U256,
    pub ebv: U256,
    pub nmv: U256,
}

impl SlotValue for TvlValues {
    fn accumulate(&mut self, other: &Self) {
        self.usd = self.usd.saturating_add(other.usd);
        self.cbv = self.cbv.saturating_add(other.cbv);
        self.ebv = self.ebv.saturating_add(other.ebv);
        self.nmv = self.nmv.saturating_add(other.nmv);
    }
}

/// Amount and USD value of a single asset slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetValues {
    pub amount: U256,
    pub usd: U256,
}

impl SlotValue for AssetValues {
    fn accumulate(&mut self, other: &Self) {
        self.amount = self.amount.saturating_add(other.amount);
        self.usd = self.usd.saturating_add(other.usd);
    }
}

impl SeriesRow for AggregatedReport {
    type Key = ProjectKey;
    type Value = TvlValues;

    fn series_key(&self) -> ProjectKey {
        self.project.clone()
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn value(&self) -> TvlValues {
        let mut value = TvlValues { usd: self.usd_value, ..Default::default() };
        match self.value_type {
            ValueType::Cbv => value.cbv = self.usd_value,
            ValueType::Ebv => value.ebv = self.usd_value,
            ValueType::Nmv => value.nmv = self.usd_value,
        }
        value
    }
}

impl SeriesRow for Report {
    type Key = ProjectId;
    type Value = AssetValues;

    fn series_key(&self) -> ProjectId {
        self.project_id.clone()
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn value(&self) -> AssetValues {
        AssetValues { amount: self.amount, usd: self.usd_value }
    }
}

/// Map that iterates in first-insertion order of its keys.
#[derive(Debug, Clone)]
pub struct Grouped<K, V> {
    order: Vec<K>,
    groups: HashMap<K, V>,
}

impl<K: Clone + Eq + Hash, V> Grouped<K, V> {
    pub fn new() -> Self {
        Self { order: Vec::new(), groups: HashMap::new() }
    }

    pub fn entry_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        if !self.groups.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.groups.entry(key).or_default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.groups.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().filter_map(|key| self.groups.get(key).map(|value| (key, value)))
    }

    /// Consumes the map into its entries, in insertion order.
    pub fn into_vec(self) -> Vec<(K, V)> {
        let mut groups = self.groups;
        self.order
            .into_iter()
            .filter_map(|key| groups.remove(&key).map(|value| (key, value)))
            .collect()
    }

    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> Grouped<K, W> {
        let mut groups = self.groups;
        let mut mapped = HashMap::with_capacity(groups.len());
        for key in &self.order {
            if let Some(value) = groups.remove(key) {
                mapped.insert(key.clone(), f(value));
            }
        }
        Grouped { order: self.order, groups: mapped }
    }
}

impl<K: Clone + Eq + Hash, V> Default for Grouped<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups rows by series key, then by timestamp. No row is dropped.
pub fn group_by_key_and_timestamp<R: SeriesRow>(
    rows: impl IntoIterator<Item = R>,
) -> Grouped<R::Key, BTreeMap<u64, Vec<R>>> {
    let mut grouped: Grouped<R::Key, BTreeMap<u64, Vec<R>>> = Grouped::new();
    for row in rows {
        grouped.entry_or_default(row.series_key()).entry(row.timestamp()).or_default().push(row);
    }
    grouped
}

/// Groups reports by project, then by asset. No report is dropped.
pub fn group_by_key_and_asset(
    reports: impl IntoIterator<Item = Report>,
) -> Grouped<ProjectId, Grouped<AssetId, Vec<Report>>> {
    let mut grouped: Grouped<ProjectId, Grouped<AssetId, Vec<Report>>> = Grouped::new();
    for report in reports {
        grouped
            .entry_or_default(report.project_id.clone())
            .entry_or_default(report.asset_id.clone())
            .push(report);
    }
    grouped
}

/// Sums the values of rows sharing a slot. The result does not depend on row order.
pub fn reduce<R: SeriesRow>(rows: &[R]) -> R::Value {
    rows.iter().fold(R::Value::default(), |mut total, row| {
        total.accumulate(&row.value());
        total
    })
}

/// Groups rows and collapses every slot into a single summed value.
pub fn sum_by_key_and_timestamp<R: SeriesRow>(
    rows: impl IntoIterator<Item = R>,
) -> Grouped<R::Key, BTreeMap<u64, R::Value>> {
    group_by_key_and_timestamp(rows).map_values(|slots| {
        slots.into_iter().map(|(timestamp, rows)| (timestamp, reduce(&rows))).collect()
    })
}
