use crate::parser::StatusFrame;
use crate::types::{is_zone, MuteState, PowerState, ZoneId, ZoneState, ZONE_COUNT};

/// Last known state of all twelve zones
///
/// Slots are created once and never removed; they only change through
/// [`apply`](ZoneStore::apply) and [`degrade_all`](ZoneStore::degrade_all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ZoneStore {
    zones: Vec<ZoneState>,
}

impl ZoneStore {
    pub(crate) fn new() -> Self {
        Self {
            zones: (1..=ZONE_COUNT).map(ZoneState::new).collect(),
        }
    }

    /// State of one zone, `None` outside 1..=12
    pub(crate) fn get(&self, zone: ZoneId) -> Option<&ZoneState> {
        if is_zone(zone) {
            self.zones.get(usize::from(zone - 1))
        } else {
            None
        }
    }

    /// Snapshot of every zone, ordered by zone number
    pub(crate) fn all(&self) -> Vec<ZoneState> {
        self.zones.clone()
    }

    /// Record a decoded status frame
    ///
    /// Returns `false` when the frame names a zone outside 1..=12.
    pub(crate) fn apply(&mut self, frame: &StatusFrame) -> bool {
        if !is_zone(frame.zone) {
            return false;
        }
        let slot = &mut self.zones[usize::from(frame.zone - 1)];
        slot.power = Some(PowerState::from_bool(frame.power));
        slot.mute = Some(if frame.mute { MuteState::On } else { MuteState::Off });
        slot.source = frame.source;
        slot.volume = frame.volume;
        true
    }

    /// Mark every zone unknown after a timeout
    pub(crate) fn degrade_all(&mut self) {
        for slot in &mut self.zones {
            slot.power = Some(PowerState::Unknown);
            slot.mute = Some(MuteState::Unknown);
            slot.source = 0;
            slot.volume = 0;
        }
    }
}
