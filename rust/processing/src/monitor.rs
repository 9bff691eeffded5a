// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operation timing
//!
//! Completed measurements are kept per label (latest wins) and emitted as
//! `tracing` events, which is how they reach an observability sink.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;

/// A completed timing sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub label: String,
    pub duration_ms: f64,
    /// Bytes processed, when the operation has a natural size.
    pub bytes: Option<usize>,
}

#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    active: FxHashMap<String, Instant>,
    completed: Vec<Measurement>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) timing `label`.
    pub fn start(&mut self, label: impl Into<String>) {
        self.active.insert(label.into(), Instant::now());
    }

    /// Stop timing `label`; `None` if it was never started.
    pub fn finish(&mut self, label: &str, bytes: Option<usize>) -> Option<Measurement> {
        let started = self.active.remove(label)?;
        let measurement = Measurement {
            label: label.to_string(),
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            bytes,
        };

        tracing::info!(
            label = %measurement.label,
            duration_ms = measurement.duration_ms,
            bytes = measurement.bytes,
            "measurement"
        );

        match self.completed.iter_mut().find(|m| m.label == label) {
            Some(existing) => *existing = measurement.clone(),
            None => self.completed.push(measurement.clone()),
        }
        Some(measurement)
    }

    /// Drop an in-flight timing without recording it.
    pub fn cancel(&mut self, label: &str) {
        self.active.remove(label);
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.completed
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.completed.clear();
    }
}
