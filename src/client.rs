use crate::connection::Connection;
use crate::diagnostics::{Diagnostic, DiagnosticReceiver, Diagnostics};
use crate::error::{HtdError, Result};
use crate::parser::parse_response;
use crate::protocol::{hex, volume_sequence, Command};
use crate::store::ZoneStore;
use crate::types::{Reply, Target, ZoneId, ZoneState, DEFAULT_PORT};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Client for an HTD Lync 12 controller
///
/// Every operation opens a fresh TCP connection, sends one command and
/// decodes the reply into the client's zone state. Requests from clones of
/// the same client are serialized, matching the controller's one
/// outstanding command at a time.
///
/// A request that times out does not fail: every zone is marked unknown and
/// the degraded state is returned.
#[derive(Clone)]
pub struct HtdClient {
    connection: Connection,
    store: Arc<Mutex<ZoneStore>>,
    io_lock: Arc<tokio::sync::Mutex<()>>,
    diagnostics: Diagnostics,
}

impl HtdClient {
    /// Create a client for the controller at `host:port`
    ///
    /// No connection is made until the first operation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use htd_lync12::HtdClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = HtdClient::new("192.168.1.50", 10006);
    ///     let zone = client.query_zone(1).await?;
    ///     println!("Zone 1 volume: {}", zone.volume);
    ///     Ok(())
    /// }
    /// ```
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            connection: Connection::new(host, port),
            store: Arc::new(Mutex::new(ZoneStore::new())),
            io_lock: Arc::new(tokio::sync::Mutex::new(())),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Create a client on the default port (10006)
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    /// Replace the connect/receive timeout (default 500 ms)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connection = self.connection.with_timeout(timeout);
        self
    }

    /// Get the controller's host
    pub fn host(&self) -> &str {
        self.connection.host()
    }

    /// Get the controller's port
    pub fn port(&self) -> u16 {
        self.connection.port()
    }

    /// Last known state of one zone, without contacting the device
    pub fn zone(&self, zone: ZoneId) -> Option<ZoneState> {
        self.store().get(zone).cloned()
    }

    /// Last known state of every zone, without contacting the device
    pub fn zones(&self) -> Vec<ZoneState> {
        self.store().all()
    }

    /// Subscribe to responses the client ignored or degraded on
    pub fn subscribe_diagnostics(&self) -> DiagnosticReceiver {
        self.diagnostics.subscribe()
    }

    // ========== Queries ==========

    /// Query one zone (1..=12)
    pub async fn query_zone(&self, zone: ZoneId) -> Result<ZoneState> {
        let command = validated(Command::query_zone(zone))?;
        let reply = self.send(command).await?;
        Ok(into_zone(reply, zone))
    }

    /// Query every zone
    pub async fn query_all(&self) -> Result<Vec<ZoneState>> {
        tracing::debug!("Query all");
        let reply = self.send(Command::query_all()).await?;
        Ok(match reply {
            Reply::Device(states) => states,
            Reply::Zone(_) => self.zones(),
        })
    }

    // ========== Control ==========

    /// Power a zone on or off; zone 0 switches the whole device
    pub async fn set_power(&self, zone: ZoneId, on: bool) -> Result<Reply> {
        let command = validated(Command::power(zone, on))?;
        self.send(command).await
    }

    /// Set a zone's volume as a percentage (0..=100)
    ///
    /// Sends power-on, volume, power-on, volume; the controller does not
    /// reliably apply a volume otherwise. Returns the zone state after the
    /// last frame.
    pub async fn set_volume(&self, zone: ZoneId, percent: u8) -> Result<ZoneState> {
        let sequence = validated(volume_sequence(zone, percent))?;
        let mut state = None;
        for command in sequence {
            state = Some(into_zone(self.send(command).await?, zone));
        }
        Ok(state.unwrap_or_else(|| ZoneState::new(zone)))
    }

    /// Select input 1..=18 on a zone
    pub async fn set_source(&self, zone: ZoneId, input: u8) -> Result<ZoneState> {
        let command = validated(Command::source(zone, input))?;
        let reply = self.send(command).await?;
        Ok(into_zone(reply, zone))
    }

    /// Mute a zone; zone 0 mutes the whole device
    pub async fn mute_on(&self, zone: ZoneId) -> Result<Reply> {
        let command = validated(Command::mute_on(zone))?;
        self.send(command).await
    }

    /// Unmute a zone; zone 0 unmutes the whole device
    pub async fn mute_off(&self, zone: ZoneId) -> Result<Reply> {
        let command = validated(Command::mute_off(zone))?;
        self.send(command).await
    }

    /// Exchange one command and fold the response into the store
    async fn send(&self, command: Command) -> Result<Reply> {
        let target = Target::from_zone(command.zone());
        let frame = command.frame();

        let _io = self.io_lock.lock().await;
        match self.connection.exchange(&frame).await {
            Ok(response) => {
                let mut store = self.store();
                let report = parse_response(
                    &mut store,
                    &self.diagnostics,
                    &frame,
                    &response,
                    target.zone(),
                );
                tracing::debug!(
                    zone = ?target.zone(),
                    updated = ?report.updated,
                    rejected = ?report.rejected,
                    malformed = report.malformed,
                    "Response applied"
                );
                Ok(reply(&store, target))
            }
            Err(HtdError::Timeout) => {
                tracing::warn!(
                    zone = ?target.zone(),
                    command = %hex(&frame),
                    "No response from controller, marking all zones unknown"
                );
                self.diagnostics.report(Diagnostic::Timeout {
                    requested: target.zone(),
                    command: frame.to_vec(),
                });
                let mut store = self.store();
                store.degrade_all();
                Ok(reply(&store, target))
            }
            Err(e) => Err(e),
        }
    }

    fn store(&self) -> MutexGuard<'_, ZoneStore> {
        // The store is always left consistent, so a poisoned lock is usable
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn validated<T>(result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Rejected request");
    }
    result
}

fn reply(store: &ZoneStore, target: Target) -> Reply {
    match target {
        Target::Zone(zone) => Reply::Zone(
            store
                .get(zone)
                .cloned()
                .unwrap_or_else(|| ZoneState::new(zone)),
        ),
        Target::Device => Reply::Device(store.all()),
    }
}

fn into_zone(reply: Reply, zone: ZoneId) -> ZoneState {
    match reply {
        Reply::Zone(state) => state,
        Reply::Device(states) => states
            .into_iter()
            .find(|s| s.zone == zone)
            .unwrap_or_else(|| ZoneState::new(zone)),
    }
}
