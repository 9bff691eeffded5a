// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-readable rendering of worker responses.

use wearscan_processing::Response;

pub fn describe(response: &Response) -> String {
    match response {
        Response::ParseStl { result: Ok(s) } => {
            let b = &s.bounding_box;
            format!(
                "{} ({}): {} vertices, {} faces\n  min  [{:.4}, {:.4}, {:.4}]\n  max  [{:.4}, {:.4}, {:.4}]\n  size [{:.4}, {:.4}, {:.4}]",
                s.file_name,
                s.format.name(),
                s.vertex_count,
                s.face_count,
                b.min.x, b.min.y, b.min.z,
                b.max.x, b.max.y, b.max.z,
                b.size.x, b.size.y, b.size.z,
            )
        }
        Response::IsolateInnerSurface { result: Ok(s) } => format!(
            "inner surface: {} of {} faces selected (q1 {:.4}, q3 {:.4})",
            s.selected_face_count, s.total_face_count, s.first_quartile, s.third_quartile
        ),
        Response::QuantizeGeometry { result: Ok(s) } => format!(
            "quantized at {} bits: {} -> {} bytes ({:.2}x)",
            s.bits, s.info.original_bytes, s.info.compressed_bytes, s.info.compression_ratio
        ),
        Response::WeldVertices { result: Ok(s) } => format!(
            "welded at {}: {} -> {} vertices ({:.1}% reduction)",
            s.tolerance, s.original_vertex_count, s.unique_vertex_count, s.reduction_percent
        ),
        Response::DetectWearZones { result: Ok(s) } => format!(
            "wear zones: {} ({} faces processed)",
            s.wear_zones.len(),
            s.processed_faces
        ),
        Response::CalculateVolumetricWear { result: Ok(s) } => {
            format!("volumetric wear: {} over {} faces", s.volume, s.face_count)
        }
        Response::MemoryCleanup { result: Ok(s) } => {
            format!("released {} bytes", s.released_bytes)
        }
        Response::PerformanceReport { result: Ok(s) } => {
            let mut out = String::from("timings:");
            for m in &s.measurements {
                out.push_str(&format!("\n  {:<10} {:>10.2} ms", m.label, m.duration_ms));
            }
            out.push_str(&format!(
                "\npool: {} buffers in {} sizes, {:.2} MiB allocated",
                s.pool.total_buffers,
                s.pool.pool_count,
                s.pool.total_allocated_mib()
            ));
            out
        }
        other => match other.failure() {
            Some(f) => format!("{} failed [{}]: {}", other.kind(), f.code, f.message),
            None => other.kind().to_string(),
        },
    }
}
