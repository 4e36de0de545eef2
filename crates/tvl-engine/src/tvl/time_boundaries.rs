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

//! Slot boundaries of the resolution windows.
//!
//! A slot is a timestamp on the resolution grid (a multiple of the step). The window
//! of a resolution ends at the slot holding the latest timestamp and reaches back by
//! the configured window, or to the genesis timestamp for unbounded resolutions.

use crate::config::ResolutionSettings;

/// Returns the start of the slot containing `timestamp`
pub fn get_slot_start(timestamp: u64, step: u64) -> u64 {
    (timestamp / step) * step
}

/// Returns the first slot at or after `timestamp`
pub fn get_next_slot_at_or_after(timestamp: u64, step: u64) -> u64 {
    let start = get_slot_start(timestamp, step);
    if start == timestamp {
        start
    } else {
        start.saturating_add(step)
    }
}

/// Inclusive range of aligned slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

impl SlotRange {
    /// Builds the range for one resolution.
    ///
    /// The range is empty (`start > end`) when `genesis` lies after the latest slot.
    pub fn for_resolution(settings: &ResolutionSettings, latest: u64, genesis: u64) -> Self {
        let step = settings.step_secs;
        let end = get_slot_start(latest, step);
        let first_slot = get_next_slot_at_or_after(genesis, step);
        let start = match settings.window_secs {
            Some(window) => end.saturating_sub(window).max(first_slot),
            None => first_slot,
        };
        Self { start, end, step }
    }

    /// Lower bound to pass to the storage layer, `None` when the window is unbounded.
    pub fn min_timestamp(&self, settings: &ResolutionSettings) -> Option<u64> {
        settings.window_secs.map(|_| self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of slots in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.end - self.start) / self.step + 1) as usize
        }
    }

    /// Whether `timestamp` is one of the slots of this range
    pub fn contains(&self, timestamp: u64) -> bool {
        !self.is_empty()
            && timestamp >= self.start
            && timestamp <= self.end
            && (timestamp - self.start) % self.step == 0
    }

    /// Returns an iterator over the slots in ascending order.
    pub fn iter_slots(&self) -> impl Iterator<Item = u64> {
        let (start, step) = (self.start, self.step);
        (0..self.len() as u64).map(move |i| start + i * step)
    }
}
