//! Lync 12 status frame decoder.
//!
//! Responses are made of 14-byte status frames. A single frame answers a
//! zone query; longer responses (query-all) start with a 14-byte header
//! chunk that is skipped, followed by up to twelve zone frames.
//!
//! # Frame layout
//!
//! ```text
//! byte 2   zone number (1..=12)
//! byte 4   bit 0 = power, bit 1 = mute
//! byte 8   input - 1
//! byte 9   wire volume (see protocol::volume_from_wire)
//! ```

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::protocol::{hex, volume_from_wire};
use crate::store::ZoneStore;
use crate::types::{is_zone, ZoneId, FRAME_LEN, ZONE_COUNT};

const ZONE_BYTE: usize = 2;
const FLAGS_BYTE: usize = 4;
const SOURCE_BYTE: usize = 8;
const VOLUME_BYTE: usize = 9;

const POWER_BIT: u8 = 1 << 0;
const MUTE_BIT: u8 = 1 << 1;

/// One decoded zone status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    /// Zone number as reported, not necessarily valid
    pub zone: u8,
    pub power: bool,
    pub mute: bool,
    /// 1-based input number
    pub source: u8,
    /// Device volume, 0..=60
    pub volume: u8,
}

impl StatusFrame {
    /// Decode a 14-byte chunk; `None` for any other length
    pub fn decode(chunk: &[u8]) -> Option<Self> {
        if chunk.len() != FRAME_LEN {
            return None;
        }
        let flags = chunk[FLAGS_BYTE];
        Some(Self {
            zone: chunk[ZONE_BYTE],
            power: flags & POWER_BIT != 0,
            mute: flags & MUTE_BIT != 0,
            source: chunk[SOURCE_BYTE].saturating_add(1),
            volume: volume_from_wire(chunk[VOLUME_BYTE]),
        })
    }
}

/// What a response did to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParseReport {
    /// Zones updated, in response order
    pub updated: Vec<ZoneId>,
    /// Zone numbers that were reported but rejected
    pub rejected: Vec<u8>,
    /// Length was neither 14 nor more than 14
    pub malformed: bool,
}

/// Split a response into zone frames
///
/// Returns `None` for a malformed length.
fn zone_chunks(response: &[u8]) -> Option<Vec<&[u8]>> {
    if response.len() == FRAME_LEN {
        Some(vec![response])
    } else if response.len() > FRAME_LEN {
        Some(
            response[FRAME_LEN..]
                .chunks(FRAME_LEN)
                .take(usize::from(ZONE_COUNT))
                .collect(),
        )
    } else {
        None
    }
}

/// Decode `response` into `store`
///
/// `requested` is the zone the command targeted (`None` for the whole
/// device). Nothing here is fatal: rejected frames and malformed responses
/// are reported through `diagnostics` and otherwise ignored.
pub(crate) fn parse_response(
    store: &mut ZoneStore,
    diagnostics: &Diagnostics,
    command: &[u8],
    response: &[u8],
    requested: Option<ZoneId>,
) -> ParseReport {
    let mut report = ParseReport::default();

    let Some(chunks) = zone_chunks(response) else {
        tracing::warn!(
            zone = ?requested,
            command = %hex(command),
            response = %hex(response),
            len = response.len(),
            "Ignoring malformed response"
        );
        diagnostics.report(Diagnostic::MalformedResponse {
            requested,
            command: command.to_vec(),
            len: response.len(),
        });
        report.malformed = true;
        return report;
    };
    let multi = response.len() > FRAME_LEN;

    for chunk in chunks {
        // A trailing partial chunk carries no zone
        let Some(frame) = StatusFrame::decode(chunk) else {
            tracing::debug!(len = chunk.len(), "Skipping short trailing chunk");
            continue;
        };

        if !is_zone(frame.zone) {
            tracing::warn!(
                requested = ?requested,
                reported = frame.zone,
                command = %hex(command),
                frame = %hex(chunk),
                "Sent command for zone {:?} but got zone {}",
                requested,
                frame.zone
            );
            diagnostics.report(Diagnostic::ZoneMismatch {
                requested,
                reported: frame.zone,
                command: command.to_vec(),
                frame: chunk.to_vec(),
            });
            report.rejected.push(frame.zone);
            continue;
        }

        // The device sometimes answers a zone query with a different zone;
        // the frame is still valid state for that zone.
        if !multi && requested.is_some_and(|zone| zone != frame.zone) {
            tracing::warn!(
                requested = ?requested,
                reported = frame.zone,
                command = %hex(command),
                frame = %hex(chunk),
                "Response is for a different zone"
            );
            diagnostics.report(Diagnostic::ZoneMismatch {
                requested,
                reported: frame.zone,
                command: command.to_vec(),
                frame: chunk.to_vec(),
            });
        }

        store.apply(&frame);
        tracing::debug!(
            zone = frame.zone,
            requested = ?requested,
            command = %hex(command),
            frame = %hex(chunk),
            "Zone status decoded"
        );
        report.updated.push(frame.zone);
    }

    if multi && report.updated.is_empty() {
        tracing::warn!(zone = ?requested, command = %hex(command), "Update failed, no zone decoded");
        diagnostics.report(Diagnostic::NoZoneDecoded {
            requested,
            command: command.to_vec(),
        });
    }

    report
}
