//! Scroll proxy sizing and two-phase height measurement.
//!
//! The renderer reports row heights as they are laid out. Reports are queued
//! with [`MeasurementQueue::record`] and applied together by
//! [`commit_measurements`] once per render cycle, which updates row heights,
//! cumulative offsets and the proxy height in one step.

use std::collections::HashMap;

use log::{debug, trace};

use crate::registry::RowRegistry;

/// Synthetic element sized to the full virtual content height.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollProxy {
    height: f64,
    base_row_height: f64,
    initialized: bool,
}

impl ScrollProxy {
    /// Create an unseeded proxy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the first measured row: every known row is assumed to share
    /// its height until measured.
    pub fn seed(&mut self, measured: f64, row_count: usize) {
        self.base_row_height = measured;
        self.height = measured * row_count as f64;
        self.initialized = true;
        debug!(
            "Scroll proxy seeded: {}px x {} rows = {}px",
            measured, row_count, self.height
        );
    }

    /// Apply a height change of one row.
    pub fn apply_delta(&mut self, previous: f64, current: f64) {
        self.height += current - previous;
    }

    /// Set the proxy height directly.
    pub fn resize_to(&mut self, height: f64) {
        self.height = height;
    }

    /// Current proxy height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Estimated height for rows that were never measured.
    pub fn base_row_height(&self) -> f64 {
        self.base_row_height
    }

    /// Whether a first measurement has been seen.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Pending height reports, keyed by row identifier.
///
/// A later report for the same row replaces the pending one.
#[derive(Debug, Clone, Default)]
pub struct MeasurementQueue {
    pending: HashMap<String, f64>,
}

impl MeasurementQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a measured height for a row.
    pub fn record(&mut self, identifier: impl Into<String>, height: f64) {
        self.pending.insert(identifier.into(), height);
    }

    /// Number of pending reports.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending height for a row.
    pub fn pending(&self, identifier: &str) -> Option<f64> {
        self.pending.get(identifier).copied()
    }

    fn take(&mut self) -> HashMap<String, f64> {
        std::mem::take(&mut self.pending)
    }
}

/// What a commit changed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementCommit {
    /// The proxy was seeded by this commit.
    pub seeded: bool,
    /// Earliest row whose height changed.
    pub first_changed_index: Option<usize>,
    /// Proxy height after the commit.
    pub total_height: f64,
}

impl MeasurementCommit {
    /// Whether offsets or the proxy height moved.
    pub fn changed(&self) -> bool {
        self.seeded || self.first_changed_index.is_some()
    }
}

/// Apply every pending measurement.
///
/// Reports for unknown rows and non-positive heights are dropped. An unseeded
/// proxy is seeded from the lowest-index measured row. Offsets are
/// recomputed from the earliest changed row, or from the top when this commit
/// seeded the proxy.
pub fn commit_measurements<T>(
    queue: &mut MeasurementQueue,
    registry: &mut RowRegistry<T>,
    proxy: &mut ScrollProxy,
) -> MeasurementCommit {
    let mut commit = MeasurementCommit {
        total_height: proxy.height(),
        ..Default::default()
    };
    let pending = queue.take();
    if pending.is_empty() {
        return commit;
    }

    let mut measured: Vec<(usize, String, f64)> = pending
        .into_iter()
        .filter_map(|(identifier, height)| {
            if height.is_nan() || height <= 0.0 {
                trace!("Skipping unmeasurable height {} for {}", height, identifier);
                return None;
            }
            match registry.get(&identifier) {
                Ok(record) => Some((record.row_index, identifier, height)),
                Err(_) => {
                    trace!("Skipping measurement for unloaded row {}", identifier);
                    None
                }
            }
        })
        .collect();
    measured.sort_by_key(|(row_index, _, _)| *row_index);

    // The topmost measured row sets the base height.
    if !proxy.is_initialized()
        && let Some((_, _, height)) = measured.first()
    {
        proxy.seed(*height, registry.len());
        commit.seeded = true;
    }

    for (_, identifier, height) in measured {
        let Ok(record) = registry.get_mut(&identifier) else {
            continue;
        };

        let previous = record.height_or(proxy.base_row_height());
        record.row_height = Some(height);
        if previous != height {
            proxy.apply_delta(previous, height);
            let index = record.row_index;
            commit.first_changed_index = Some(
                commit
                    .first_changed_index
                    .map_or(index, |earliest| earliest.min(index)),
            );
        }
    }

    if commit.seeded {
        registry.set_height_offsets(0, proxy.base_row_height());
    } else if let Some(index) = commit.first_changed_index {
        registry.set_height_offsets(index, proxy.base_row_height());
    }

    commit.total_height = proxy.height();
    if commit.changed() {
        debug!(
            "Committed measurements: proxy {}px, first changed {:?}",
            commit.total_height, commit.first_changed_index
        );
    }
    commit
}
