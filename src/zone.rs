use crate::client::HtdClient;
use crate::error::{HtdError, Result};
use crate::types::{PowerState, Reply, ZoneId, ZoneState, MAX_VOLUME};

/// Interface for controlling one zone
///
/// A `Zone` binds a client to a zone number together with the names the
/// user configured, and offers the controls a media player needs: power,
/// fractional volume, mute toggle and source selection by name.
#[derive(Clone)]
pub struct Zone {
    client: HtdClient,
    id: ZoneId,
    name: String,
    sources: Vec<String>,
}

/// Playback state as seen by a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    On,
    Off,
    Unknown,
}

impl Zone {
    pub fn new(client: HtdClient, id: ZoneId, name: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            client,
            id,
            name: name.into(),
            sources,
        }
    }

    /// Get the zone number
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Get the configured zone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configured source names
    pub fn source_list(&self) -> &[String] {
        &self.sources
    }

    /// Last known state, without contacting the device
    pub fn state(&self) -> ZoneState {
        self.client
            .zone(self.id)
            .unwrap_or_else(|| ZoneState::new(self.id))
    }

    /// Poll the device for this zone's state
    pub async fn refresh(&self) -> Result<ZoneState> {
        self.client.query_zone(self.id).await
    }

    /// Power state; zones never reported count as off
    pub fn playback(&self) -> Playback {
        match self.state().power {
            Some(PowerState::On) => Playback::On,
            Some(PowerState::Unknown) => Playback::Unknown,
            Some(PowerState::Off) | None => Playback::Off,
        }
    }

    pub fn is_on(&self) -> bool {
        self.playback() == Playback::On
    }

    pub fn is_muted(&self) -> bool {
        self.state().is_muted()
    }

    /// Volume as a fraction of the device maximum, 0.0..=1.0
    pub fn volume_level(&self) -> f64 {
        f64::from(self.state().volume) / f64::from(MAX_VOLUME)
    }

    /// Name of the selected source, if known
    pub fn source_name(&self) -> Option<&str> {
        let source = usize::from(self.state().source);
        source
            .checked_sub(1)
            .and_then(|i| self.sources.get(i))
            .map(String::as_str)
    }

    pub async fn turn_on(&self) -> Result<ZoneState> {
        let reply = self.client.set_power(self.id, true).await?;
        Ok(self.pick(reply))
    }

    pub async fn turn_off(&self) -> Result<ZoneState> {
        let reply = self.client.set_power(self.id, false).await?;
        Ok(self.pick(reply))
    }

    /// Set volume from a fraction 0.0..=1.0
    pub async fn set_volume_level(&self, level: f64) -> Result<ZoneState> {
        let percent = (100.0 * level).floor();
        if !(0.0..=100.0).contains(&percent) {
            return Err(HtdError::InvalidVolume(percent.clamp(0.0, 255.0) as u8));
        }
        self.client.set_volume(self.id, percent as u8).await
    }

    /// Unmute if currently muted, otherwise mute
    pub async fn toggle_mute(&self) -> Result<ZoneState> {
        let reply = if self.is_muted() {
            self.client.mute_off(self.id).await?
        } else {
            self.client.mute_on(self.id).await?
        };
        Ok(self.pick(reply))
    }

    /// Select a source by its configured name
    pub async fn select_source(&self, name: &str) -> Result<ZoneState> {
        let index = self
            .sources
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| HtdError::UnknownSource(name.to_string()))?;
        let input = u8::try_from(index + 1).map_err(|_| HtdError::UnknownSource(name.to_string()))?;
        self.client.set_source(self.id, input).await
    }

    fn pick(&self, reply: Reply) -> ZoneState {
        reply.zone(self.id).cloned().unwrap_or_else(|| self.state())
    }
}
