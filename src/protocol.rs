//! Lync 12 binary command encoder.
//!
//! Every request is a 5-byte command followed by a checksum byte:
//!
//! ```text
//! 02 <secondary> <zone> <function> <parameter> <checksum>
//! ```
//!
//! The checksum is the low byte of the sum of the five preceding bytes.

use crate::error::{HtdError, Result};
use crate::types::{is_zone, ZoneId, MAX_VOLUME, SOURCE_COUNT, ZONE_COUNT};
use std::fmt::Write as _;

/// Leading byte of every command
pub const START: u8 = 0x02;

const SECONDARY_CONTROL: u8 = 0x00;
const SECONDARY_VOLUME: u8 = 0x01;

const FN_CONTROL: u8 = 0x04;
const FN_QUERY: u8 = 0x05;
const FN_VOLUME: u8 = 0x15;

const ZONE_POWER_ON: u8 = 0x57;
const ZONE_POWER_OFF: u8 = 0x58;
const ALL_POWER_ON: u8 = 0x55;
const ALL_POWER_OFF: u8 = 0x56;
const MUTE_ON: u8 = 0x1E;
const MUTE_OFF: u8 = 0x1F;

/// One 5-byte command, before the checksum is appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    bytes: [u8; 5],
}

impl Command {
    fn new(secondary: u8, zone: ZoneId, function: u8, parameter: u8) -> Self {
        Self {
            bytes: [START, secondary, zone, function, parameter],
        }
    }

    /// Query the state of one zone (1..=12)
    pub fn query_zone(zone: ZoneId) -> Result<Self> {
        check_zone(zone)?;
        Ok(Self::new(SECONDARY_CONTROL, zone, FN_QUERY, 0x00))
    }

    /// Query every zone
    pub fn query_all() -> Self {
        Self::new(SECONDARY_CONTROL, 0, FN_QUERY, 0x00)
    }

    /// Power a zone on or off; zone 0 addresses the whole device
    pub fn power(zone: ZoneId, on: bool) -> Result<Self> {
        check_zone_or_all(zone)?;
        let parameter = match (zone, on) {
            (0, true) => ALL_POWER_ON,
            (0, false) => ALL_POWER_OFF,
            (_, true) => ZONE_POWER_ON,
            (_, false) => ZONE_POWER_OFF,
        };
        Ok(Self::new(SECONDARY_CONTROL, zone, FN_CONTROL, parameter))
    }

    /// Select input 1..=18 on a zone
    pub fn source(zone: ZoneId, input: u8) -> Result<Self> {
        check_zone(zone)?;
        let parameter = match input {
            1..=12 => input + 15,
            13..=SOURCE_COUNT => input + 86,
            _ => return Err(HtdError::InvalidSource(input)),
        };
        Ok(Self::new(SECONDARY_CONTROL, zone, FN_CONTROL, parameter))
    }

    /// Set a zone's volume from a percentage (0..=100)
    pub fn volume(zone: ZoneId, percent: u8) -> Result<Self> {
        check_zone(zone)?;
        let raw = percent_to_volume(percent)?;
        Ok(Self::new(SECONDARY_VOLUME, zone, FN_VOLUME, volume_to_wire(raw)))
    }

    /// Mute a zone; zone 0 addresses the whole device
    pub fn mute_on(zone: ZoneId) -> Result<Self> {
        check_zone_or_all(zone)?;
        Ok(Self::new(SECONDARY_CONTROL, zone, FN_CONTROL, MUTE_ON))
    }

    /// Unmute a zone; zone 0 addresses the whole device
    pub fn mute_off(zone: ZoneId) -> Result<Self> {
        check_zone_or_all(zone)?;
        Ok(Self::new(SECONDARY_CONTROL, zone, FN_CONTROL, MUTE_OFF))
    }

    /// Zone byte of the command
    pub fn zone(&self) -> ZoneId {
        self.bytes[2]
    }

    /// The five command bytes without checksum
    pub fn bytes(&self) -> &[u8; 5] {
        &self.bytes
    }

    /// The 6-byte frame sent on the wire
    pub fn frame(&self) -> [u8; 6] {
        let [a, b, c, d, e] = self.bytes;
        [a, b, c, d, e, checksum(&self.bytes)]
    }
}

/// The four frames that make up a volume change
///
/// The device only applies a volume reliably when the zone is asserted on
/// around it, so the sequence is power-on, volume, power-on, volume.
pub fn volume_sequence(zone: ZoneId, percent: u8) -> Result<[Command; 4]> {
    let volume = Command::volume(zone, percent)?;
    let power = Command::power(zone, true)?;
    Ok([power, volume, power, volume])
}

/// Low byte of the sum of `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Convert a percentage (0..=100) to the device volume scale (0..=60)
pub fn percent_to_volume(percent: u8) -> Result<u8> {
    if percent > 100 {
        return Err(HtdError::InvalidVolume(percent));
    }
    let raw = u32::from(MAX_VOLUME) * u32::from(percent) / 100;
    Ok(raw.min(u32::from(MAX_VOLUME)) as u8)
}

/// Encode a device volume (0..=60) as the wire byte
///
/// Full volume is sent as `0x00`; everything else counts down from `0xFF`.
pub fn volume_to_wire(volume: u8) -> u8 {
    let volume = volume.min(MAX_VOLUME);
    if volume == MAX_VOLUME {
        0x00
    } else {
        0xFF - (MAX_VOLUME - 1 - volume)
    }
}

/// Decode a wire volume byte back to the device scale (0..=60)
pub fn volume_from_wire(byte: u8) -> u8 {
    if byte == 0x00 {
        MAX_VOLUME
    } else {
        byte.saturating_sub(196).min(MAX_VOLUME)
    }
}

/// Format bytes as space separated hex for logs
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn check_zone(zone: ZoneId) -> Result<()> {
    if is_zone(zone) {
        Ok(())
    } else {
        Err(HtdError::InvalidZone(zone))
    }
}

fn check_zone_or_all(zone: ZoneId) -> Result<()> {
    if zone <= ZONE_COUNT {
        Ok(())
    } else {
        Err(HtdError::InvalidZone(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command shapes
    // ---------------------------------------------------------------

    #[test]
    fn query_zone_frame() {
        let cmd = Command::query_zone(5).unwrap();
        assert_eq!(cmd.bytes(), &[0x02, 0x00, 0x05, 0x05, 0x00]);
        assert_eq!(cmd.frame(), [0x02, 0x00, 0x05, 0x05, 0x00, 0x0C]);
    }

    #[test]
    fn query_all_frame() {
        assert_eq!(
            Command::query_all().frame(),
            [0x02, 0x00, 0x00, 0x05, 0x00, 0x07]
        );
    }

    #[test]
    fn power_zone_and_device() {
        assert_eq!(Command::power(3, true).unwrap().bytes()[4], 0x57);
        assert_eq!(Command::power(3, false).unwrap().bytes()[4], 0x58);
        assert_eq!(Command::power(0, true).unwrap().bytes()[4], 0x55);
        assert_eq!(Command::power(0, false).unwrap().bytes()[4], 0x56);
        assert_eq!(Command::power(0, true).unwrap().bytes()[3], 0x04);
    }

    #[test]
    fn source_function_bytes() {
        assert_eq!(Command::source(1, 1).unwrap().bytes()[4], 16);
        assert_eq!(Command::source(1, 12).unwrap().bytes()[4], 27);
        assert_eq!(Command::source(1, 13).unwrap().bytes()[4], 99);
        assert_eq!(Command::source(1, 18).unwrap().bytes()[4], 104);
    }

    #[test]
    fn mute_frames() {
        assert_eq!(
            Command::mute_on(2).unwrap().bytes(),
            &[0x02, 0x00, 0x02, 0x04, 0x1E]
        );
        assert_eq!(
            Command::mute_off(0).unwrap().bytes(),
            &[0x02, 0x00, 0x00, 0x04, 0x1F]
        );
    }

    #[test]
    fn volume_frame() {
        let cmd = Command::volume(4, 50).unwrap();
        // 50% -> 30 -> 0xFF - 29 = 0xE2
        assert_eq!(cmd.bytes(), &[0x02, 0x01, 0x04, 0x15, 0xE2]);
    }

    #[test]
    fn volume_sequence_full_scale() {
        let seq = volume_sequence(6, 100).unwrap();
        let power = [0x02, 0x00, 0x06, 0x04, 0x57];
        let volume = [0x02, 0x01, 0x06, 0x15, 0x00];
        assert_eq!(seq[0].bytes(), &power);
        assert_eq!(seq[1].bytes(), &volume);
        assert_eq!(seq[2].bytes(), &power);
        assert_eq!(seq[3].bytes(), &volume);
        for cmd in &seq {
            assert_eq!(checksum(&cmd.frame()[..5]), cmd.frame()[5]);
        }
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    #[test]
    fn rejects_out_of_range_arguments() {
        assert!(matches!(Command::query_zone(0), Err(HtdError::InvalidZone(0))));
        assert!(matches!(Command::query_zone(13), Err(HtdError::InvalidZone(13))));
        assert!(matches!(Command::power(13, true), Err(HtdError::InvalidZone(13))));
        assert!(matches!(Command::mute_on(13), Err(HtdError::InvalidZone(13))));
        assert!(matches!(Command::source(0, 1), Err(HtdError::InvalidZone(0))));
        assert!(matches!(Command::source(1, 0), Err(HtdError::InvalidSource(0))));
        assert!(matches!(Command::source(1, 19), Err(HtdError::InvalidSource(19))));
        assert!(matches!(Command::volume(0, 10), Err(HtdError::InvalidZone(0))));
        assert!(matches!(Command::volume(1, 101), Err(HtdError::InvalidVolume(101))));
    }

    // ---------------------------------------------------------------
    // Checksum and volume mapping
    // ---------------------------------------------------------------

    #[test]
    fn checksum_zeroes_frame_sum() {
        for zone in 0..=ZONE_COUNT {
            for parameter in [0x00, 0x1E, 0x57, 0xC4, 0xFF] {
                let cmd = Command::new(SECONDARY_VOLUME, zone, FN_VOLUME, parameter);
                let frame = cmd.frame();
                let total = frame[..5].iter().map(|b| u32::from(*b)).sum::<u32>();
                assert_eq!(frame[5], (total % 256) as u8);
                assert_eq!(checksum(&frame[..5]).wrapping_sub(frame[5]), 0);
            }
        }
    }

    #[test]
    fn percent_mapping_floors() {
        assert_eq!(percent_to_volume(0).unwrap(), 0);
        assert_eq!(percent_to_volume(1).unwrap(), 0);
        assert_eq!(percent_to_volume(2).unwrap(), 1);
        assert_eq!(percent_to_volume(99).unwrap(), 59);
        assert_eq!(percent_to_volume(100).unwrap(), 60);
    }

    #[test]
    fn volume_wire_round_trip() {
        for percent in 0..=100u8 {
            let raw = percent_to_volume(percent).unwrap();
            assert_eq!(u32::from(raw), 60 * u32::from(percent) / 100);
            assert_eq!(volume_from_wire(volume_to_wire(raw)), raw);
        }
    }

    #[test]
    fn full_volume_is_wire_zero() {
        assert_eq!(volume_to_wire(60), 0x00);
        assert_eq!(volume_from_wire(0x00), 60);
        assert_eq!(volume_to_wire(0), 0xC4);
        assert_eq!(volume_to_wire(59), 0xFF);
        assert_eq!(volume_from_wire(0x10), 0);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex(&[0x02, 0x00, 0xff]), "02 00 ff");
        assert_eq!(hex(&[]), "");
    }
}
