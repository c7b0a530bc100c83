use serde::{Deserialize, Serialize};

/// Number of zones on a Lync 12 controller
pub const ZONE_COUNT: u8 = 12;

/// Number of selectable inputs
pub const SOURCE_COUNT: u8 = 18;

/// Maximum volume on the device-native scale
pub const MAX_VOLUME: u8 = 60;

/// Default TCP control port
pub const DEFAULT_PORT: u16 = 10006;

/// Length of one zone status frame in a response
pub const FRAME_LEN: usize = 14;

/// Zone number (1..=12, or 0 for the whole device where allowed)
pub type ZoneId = u8;

/// Zone power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    /// The last request timed out
    Unknown,
}

impl PowerState {
    /// Power command parameter: on or off
    pub fn from_bool(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

/// Zone mute state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuteState {
    On,
    Off,
    /// The last request timed out
    Unknown,
}

/// Last known state of one zone
///
/// `power` and `mute` are `None` until the zone has been reported by the
/// device (or degraded by a timeout). `source` is 1-based; `0` means the
/// input is not known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    pub zone: ZoneId,
    pub power: Option<PowerState>,
    pub source: u8,
    /// Volume on the device scale, 0..=60
    pub volume: u8,
    pub mute: Option<MuteState>,
}

impl ZoneState {
    /// Empty state for a zone that has never been reported
    pub fn new(zone: ZoneId) -> Self {
        Self {
            zone,
            power: None,
            source: 0,
            volume: 0,
            mute: None,
        }
    }

    /// Whether the zone is known to be powered on
    pub fn is_on(&self) -> bool {
        self.power == Some(PowerState::On)
    }

    /// Whether the zone is known to be muted
    pub fn is_muted(&self) -> bool {
        self.mute == Some(MuteState::On)
    }

    /// Whether the zone state was degraded by a timeout
    pub fn is_unknown(&self) -> bool {
        self.power == Some(PowerState::Unknown)
    }
}

/// State returned by an operation
///
/// Zone-scoped requests return the state of the targeted zone; requests
/// addressed to zone 0 (the whole device) return every zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Zone(ZoneState),
    Device(Vec<ZoneState>),
}

impl Reply {
    /// Get the state of one zone from the reply, if present
    pub fn zone(&self, zone: ZoneId) -> Option<&ZoneState> {
        match self {
            Reply::Zone(state) => (state.zone == zone).then_some(state),
            Reply::Device(states) => states.iter().find(|s| s.zone == zone),
        }
    }

    /// All zone states carried by the reply
    pub fn states(&self) -> &[ZoneState] {
        match self {
            Reply::Zone(state) => std::slice::from_ref(state),
            Reply::Device(states) => states,
        }
    }
}

/// Zone targeted by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Zone(ZoneId),
    Device,
}

impl Target {
    pub(crate) fn from_zone(zone: ZoneId) -> Self {
        if zone == 0 {
            Target::Device
        } else {
            Target::Zone(zone)
        }
    }

    pub(crate) fn zone(self) -> Option<ZoneId> {
        match self {
            Target::Zone(zone) => Some(zone),
            Target::Device => None,
        }
    }
}

/// Check that `zone` is a real zone (1..=12)
pub(crate) fn is_zone(zone: ZoneId) -> bool {
    (1..=ZONE_COUNT).contains(&zone)
}
