use crate::types::ZoneId;
use tokio::sync::broadcast;

/// Non-fatal protocol condition observed by a client
///
/// None of these abort an operation; they are reported so that callers
/// (and tests) can see responses the client chose to ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A status frame named a different zone than the one requested, or a
    /// zone outside 1..=12. Out-of-range frames are not applied.
    ZoneMismatch {
        requested: Option<ZoneId>,
        reported: u8,
        command: Vec<u8>,
        frame: Vec<u8>,
    },

    /// Response length was neither 14 nor longer than 14; nothing was applied
    MalformedResponse {
        requested: Option<ZoneId>,
        command: Vec<u8>,
        len: usize,
    },

    /// A multi-frame response carried no decodable zone
    NoZoneDecoded {
        requested: Option<ZoneId>,
        command: Vec<u8>,
    },

    /// No response within the receive timeout; every zone was degraded
    Timeout {
        requested: Option<ZoneId>,
        command: Vec<u8>,
    },
}

/// Sending half kept by the client
#[derive(Debug, Clone)]
pub(crate) struct Diagnostics {
    tx: broadcast::Sender<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        // No receivers is the common case
        let _ = self.tx.send(diagnostic);
    }

    pub(crate) fn subscribe(&self) -> DiagnosticReceiver {
        DiagnosticReceiver::new(self.tx.subscribe())
    }
}

/// Receiver for diagnostics
pub struct DiagnosticReceiver {
    rx: broadcast::Receiver<Diagnostic>,
}

impl DiagnosticReceiver {
    fn new(rx: broadcast::Receiver<Diagnostic>) -> Self {
        Self { rx }
    }

    /// Receive the next diagnostic
    ///
    /// Returns `None` once the client has been dropped. Diagnostics missed
    /// by a slow receiver are skipped.
    pub async fn recv(&mut self) -> Option<Diagnostic> {
        loop {
            match self.rx.recv().await {
                Ok(diagnostic) => return Some(diagnostic),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Diagnostic receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to receive a diagnostic without blocking
    ///
    /// Returns `None` if no diagnostic is waiting.
    pub fn try_recv(&mut self) -> Option<Diagnostic> {
        loop {
            match self.rx.try_recv() {
                Ok(diagnostic) => return Some(diagnostic),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Diagnostic receiver lagged");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every waiting diagnostic
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
