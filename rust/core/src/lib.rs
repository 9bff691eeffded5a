// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # WearScan Core
//!
//! STL ingestion: encoding detection, binary and ASCII decoding, and the
//! geometry record the rest of the workspace operates on.
//!
//! ## Overview
//!
//! - **Format detection**: first 5 bytes (`solid` → ASCII), with an opt-in
//!   size-checked variant for `solid`-prefixed binary files
//! - **Binary decoding**: fixed 50-byte records read straight from the input
//!   slice into a (possibly recycled) position buffer
//! - **ASCII decoding**: memchr keyword scan + nom record parser + fast-float
//! - **Bounds**: single-pass min/max; empty input is an error, not `±inf`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wearscan_core::{StlDecoder, StlFormat};
//!
//! let bytes = std::fs::read("part.stl")?;
//! let decoded = StlDecoder::new().decode(&bytes, |p| println!("{p:.0}%"))?;
//! println!(
//!     "{} vertices, {} faces",
//!     decoded.record.vertex_count(),
//!     decoded.record.face_count()
//! );
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for bounds and format types

pub mod ascii;
pub mod binary;
pub mod bounds;
pub mod detect;
pub mod error;
pub mod progress;
pub mod record;
pub mod stl;

pub use ascii::{decode_ascii, decode_ascii_into};
pub use binary::{binary_triangle_count, decode_binary, decode_binary_into, expected_binary_len};
pub use bounds::{BoundingBox, BoundsAccumulator, Vec3};
pub use detect::{detect_format, detect_format_strict, StlFormat};
pub use error::{Error, Result};
pub use progress::{no_progress, ProgressReporter, ProgressStage};
pub use record::{Face, GeometryRecord};
pub use stl::{DecodedStl, StlDecoder};
