// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advisory progress notifications
//!
//! Long-running operations report a percentage through a caller-supplied
//! callback. Values are best-effort: consumers may only rely on them being
//! monotonic non-decreasing and ending at 100 on success.

/// Which operation a progress value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ProgressStage {
    Parse,
    Isolate,
}

/// Binary decoder cadence, in triangles
pub const BINARY_PROGRESS_STRIDE: usize = 10_000;

/// ASCII decoder cadence, in vertices
pub const ASCII_PROGRESS_STRIDE: usize = 30_000;

/// Isolator cadence, in faces
pub const ISOLATE_PROGRESS_STRIDE: usize = 50_000;

/// Wraps a progress callback and keeps emitted values in `[0, 100]` and
/// monotonic non-decreasing.
pub struct ProgressReporter<F: FnMut(f32)> {
    sink: F,
    last: f32,
}

impl<F: FnMut(f32)> ProgressReporter<F> {
    pub fn new(sink: F) -> Self {
        Self { sink, last: 0.0 }
    }

    /// Report a percentage; values below the last reported one are raised to it.
    pub fn report(&mut self, percent: f32) {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            self.last
        };
        let percent = percent.max(self.last);
        self.last = percent;
        (self.sink)(percent);
    }

    /// Report completion
    pub fn finish(&mut self) {
        self.report(100.0);
    }
}

/// Callback that ignores progress
#[inline]
pub fn no_progress(_: f32) {}
