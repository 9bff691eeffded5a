// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker configuration loaded from environment variables.

use wearscan_geometry::{DEFAULT_MAX_POOL_SIZE, DEFAULT_QUANTIZATION_BITS, DEFAULT_WELD_TOLERANCE};

const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Capacity of the inbound request channel.
    pub queue_depth: usize,
    /// Buffers retained per length in the session's pool.
    pub pool_max_per_size: usize,
    /// Classify `solid`-prefixed files as binary when their size matches the declared count.
    pub strict_detection: bool,
    /// Bit depth used when a quantize request omits one.
    pub quantization_bits: u8,
    /// Tolerance used when a weld request omits one.
    pub weld_tolerance: f32,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            queue_depth: std::env::var("WEARSCAN_QUEUE_DEPTH")
                .unwrap_or_else(|_| DEFAULT_QUEUE_DEPTH.to_string())
                .parse::<usize>()
                .unwrap_or(DEFAULT_QUEUE_DEPTH)
                .max(1),
            pool_max_per_size: std::env::var("WEARSCAN_POOL_MAX_PER_SIZE")
                .unwrap_or_else(|_| DEFAULT_MAX_POOL_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_POOL_SIZE),
            strict_detection: std::env::var("WEARSCAN_STRICT_DETECTION")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            quantization_bits: std::env::var("WEARSCAN_QUANTIZATION_BITS")
                .unwrap_or_else(|_| DEFAULT_QUANTIZATION_BITS.to_string())
                .parse()
                .unwrap_or(DEFAULT_QUANTIZATION_BITS),
            weld_tolerance: std::env::var("WEARSCAN_WELD_TOLERANCE")
                .unwrap_or_else(|_| DEFAULT_WELD_TOLERANCE.to_string())
                .parse()
                .unwrap_or(DEFAULT_WELD_TOLERANCE),
        }
    }
}

impl Default for WorkerConfig {
    /// Built-in defaults, ignoring the environment.
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            pool_max_per_size: DEFAULT_MAX_POOL_SIZE,
            strict_detection: false,
            quantization_bits: DEFAULT_QUANTIZATION_BITS,
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
