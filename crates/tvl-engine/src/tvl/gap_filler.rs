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

//! Dense per-key series over a resolution window.

use std::collections::HashMap;

use super::{
    grouping::{sum_by_key_and_timestamp, SeriesRow},
    time_boundaries::SlotRange,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledPoint<V> {
    pub timestamp: u64,
    pub value: V,
}

/// One point per slot of a [`SlotRange`], strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledSeries<V> {
    pub points: Vec<FilledPoint<V>>,
}

impl<V> FilledSeries<V> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilledPoint<V>> {
        self.points.iter()
    }
}

/// Fills the window of `range` for every expected key.
///
/// Rows outside the range or off the slot grid are dropped, rows sharing a slot are
/// summed and missing slots get a zero placeholder. Every returned series has exactly
/// `range.len()` points. Rows of keys that are not expected are ignored.
pub fn fill<R: SeriesRow>(
    range: &SlotRange,
    rows: impl IntoIterator<Item = R>,
    expected_keys: &[R::Key],
) -> HashMap<R::Key, FilledSeries<R::Value>> {
    let mut discarded = 0usize;
    let in_range = rows.into_iter().filter(|row| {
        let keep = range.contains(row.timestamp());
        if !keep {
            discarded += 1;
        }
        keep
    });
    let summed = sum_by_key_and_timestamp(in_range);
    if discarded > 0 {
        tracing::debug!(
            "Discarded {} rows outside slots {}..={} (step {})",
            discarded,
            range.start,
            range.end,
            range.step
        );
    }

    expected_keys
        .iter()
        .map(|key| {
            let slots = summed.get(key);
            let points = range
                .iter_slots()
                .map(|timestamp| FilledPoint {
                    timestamp,
                    value: slots.and_then(|s| s.get(&timestamp)).cloned().unwrap_or_default(),
                })
                .collect();
            (key.clone(), FilledSeries { points })
        })
        .collect()
}
