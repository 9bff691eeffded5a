// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL encoding detection
//!
//! The plain rule looks at exactly the first 5 bytes: `solid` means ASCII,
//! anything else means binary. Binary exporters that write `solid` at the
//! start of their 80-byte header are misclassified by that rule;
//! [`detect_format_strict`] adds a size check for callers that need it.

use crate::binary::{binary_triangle_count, expected_binary_len};

const ASCII_MAGIC: &[u8; 5] = b"solid";

/// Encoding of an STL buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum StlFormat {
    Ascii,
    Binary,
}

impl StlFormat {
    pub fn name(&self) -> &'static str {
        match self {
            StlFormat::Ascii => "ascii",
            StlFormat::Binary => "binary",
        }
    }
}

/// Classify a buffer from its first 5 bytes only.
#[inline]
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    if bytes.get(..ASCII_MAGIC.len()) == Some(ASCII_MAGIC.as_slice()) {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    }
}

/// Like [`detect_format`], but a `solid`-prefixed buffer whose declared
/// triangle count matches its byte length exactly is treated as binary.
pub fn detect_format_strict(bytes: &[u8]) -> StlFormat {
    match detect_format(bytes) {
        StlFormat::Binary => StlFormat::Binary,
        StlFormat::Ascii => match binary_triangle_count(bytes) {
            Ok(declared) if expected_binary_len(declared) == bytes.len() as u64 => {
                tracing::debug!(
                    triangles = declared,
                    "'solid' header with matching binary length, treating as binary"
                );
                StlFormat::Binary
            }
            _ => StlFormat::Ascii,
        },
    }
}
