// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use wearscan_core::ProgressStage;

use crate::messages::{ProgressMessage, Request, Response};
use crate::session::Session;

/// Handle one request against the session and build its response.
///
/// Errors never escape: they land in the response's failure slot. Progress
/// for long-running requests is passed to `emit` as it happens.
pub fn dispatch<E>(session: &mut Session, request: Request, mut emit: E) -> Response
where
    E: FnMut(ProgressMessage),
{
    let response = match request {
        Request::ParseStl { bytes, file_name } => Response::ParseStl {
            result: session
                .parse_stl(&bytes, &file_name, |p| {
                    emit(ProgressMessage::new(ProgressStage::Parse, p))
                })
                .map_err(Into::into),
        },

        Request::IsolateInnerSurface => Response::IsolateInnerSurface {
            result: session
                .isolate_inner_surface(|p| emit(ProgressMessage::new(ProgressStage::Isolate, p)))
                .map_err(Into::into),
        },

        Request::DetectWearZones {
            selected_face_indices,
        } => Response::DetectWearZones {
            result: Ok(session.detect_wear_zones(&selected_face_indices)),
        },

        Request::CalculateVolumetricWear { wear_face_indices } => {
            Response::CalculateVolumetricWear {
                result: Ok(session.calculate_volumetric_wear(&wear_face_indices)),
            }
        }

        Request::MemoryCleanup => Response::MemoryCleanup {
            result: Ok(session.memory_cleanup()),
        },

        Request::QuantizeGeometry { bits } => Response::QuantizeGeometry {
            result: session.quantize_geometry(bits).map_err(Into::into),
        },

        Request::WeldVertices { tolerance } => Response::WeldVertices {
            result: session.weld_vertices(tolerance).map_err(Into::into),
        },

        Request::PerformanceReport => Response::PerformanceReport {
            result: Ok(session.performance_report()),
        },
    };

    if let Some(failure) = response.failure() {
        tracing::warn!(
            request = response.kind(),
            code = %failure.code,
            message = %failure.message,
            "request failed"
        );
    }
    response
}
