use crate::client::HtdClient;
use crate::error::Result;
use crate::types::{DEFAULT_PORT, SOURCE_COUNT, ZONE_COUNT};
use crate::zone::Zone;
use serde::{Deserialize, Serialize};

/// Configuration for one controller
///
/// Zone and source names are optional; missing entries are filled with
/// `"Zone N"` and `"Source N"` up to the device's 12 zones and 18 inputs.
///
/// ```
/// use htd_lync12::DeviceConfig;
///
/// let config: DeviceConfig = serde_json::from_str(
///     r#"{ "host": "192.168.1.50", "zones": ["Kitchen"] }"#,
/// ).unwrap();
/// assert_eq!(config.port, 10006);
/// assert_eq!(config.zone_names()[1], "Zone 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Names for zones 1.., in order
    #[serde(default)]
    pub zones: Vec<String>,

    /// Names for inputs 1.., in order
    #[serde(default)]
    pub sources: Vec<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            zones: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Parse a single device from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Exactly 12 zone names, configured names first
    pub fn zone_names(&self) -> Vec<String> {
        padded(&self.zones, ZONE_COUNT, "Zone")
    }

    /// Exactly 18 source names, configured names first
    pub fn source_names(&self) -> Vec<String> {
        padded(&self.sources, SOURCE_COUNT, "Source")
    }

    /// Client for this device
    pub fn client(&self) -> HtdClient {
        HtdClient::new(self.host.clone(), self.port)
    }

    /// One handle per zone, sharing a single client
    pub fn zone_handles(&self) -> Vec<Zone> {
        let client = self.client();
        let sources = self.source_names();
        self.zone_names()
            .into_iter()
            .zip(1..=ZONE_COUNT)
            .map(|(name, zone)| Zone::new(client.clone(), zone, name, sources.clone()))
            .collect()
    }
}

/// Parse a list of devices from JSON
pub fn load_devices(json: &str) -> Result<Vec<DeviceConfig>> {
    Ok(serde_json::from_str(json)?)
}

fn padded(names: &[String], count: u8, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = names.iter().take(usize::from(count)).cloned().collect();
    for n in names.len() + 1..=usize::from(count) {
        names.push(format!("{} {}", prefix, n));
    }
    names
}
