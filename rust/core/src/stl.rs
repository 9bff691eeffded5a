// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detect-then-decode entry point

use crate::ascii::decode_ascii_into;
use crate::binary::decode_binary_into;
use crate::detect::{detect_format, detect_format_strict, StlFormat};
use crate::error::Result;
use crate::record::GeometryRecord;

/// Output of [`StlDecoder::decode`]
#[derive(Debug, Clone)]
pub struct DecodedStl {
    pub format: StlFormat,
    pub record: GeometryRecord,
}

/// STL decoder with configurable format detection
#[derive(Debug, Clone, Copy, Default)]
pub struct StlDecoder {
    strict_detection: bool,
}

impl StlDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the size-checked detector instead of the plain 5-byte rule
    pub fn with_strict_detection(mut self, strict: bool) -> Self {
        self.strict_detection = strict;
        self
    }

    pub fn detect(&self, bytes: &[u8]) -> StlFormat {
        if self.strict_detection {
            detect_format_strict(bytes)
        } else {
            detect_format(bytes)
        }
    }

    /// Detect the encoding and decode.
    pub fn decode<F: FnMut(f32)>(&self, bytes: &[u8], progress: F) -> Result<DecodedStl> {
        self.decode_with_buffer(bytes, Vec::new(), progress)
    }

    /// Detect the encoding and decode into a recycled position buffer.
    pub fn decode_with_buffer<F: FnMut(f32)>(
        &self,
        bytes: &[u8],
        buffer: Vec<f32>,
        progress: F,
    ) -> Result<DecodedStl> {
        let format = self.detect(bytes);
        let record = match format {
            StlFormat::Ascii => decode_ascii_into(bytes, buffer, progress)?,
            StlFormat::Binary => decode_binary_into(bytes, buffer, progress)?,
        };
        Ok(DecodedStl { format, record })
    }
}
