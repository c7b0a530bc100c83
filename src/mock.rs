//! Scripted stand-in for a Lync 12 controller, for tests.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the mock answers one connection
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Reply with these bytes and close
    Reply(Vec<u8>),
    /// Read the command and never answer
    Silent,
}

/// Mock controller serving one scripted connection per command
pub(crate) struct MockDevice {
    port: u16,
    handle: JoinHandle<Vec<[u8; 6]>>,
}

impl MockDevice {
    pub(crate) async fn start(script: Vec<Script>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let mut frames = Vec::new();
            for step in script {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut frame = [0u8; 6];
                stream.read_exact(&mut frame).await.unwrap();
                frames.push(frame);
                match step {
                    Script::Reply(bytes) => {
                        stream.write_all(&bytes).await.unwrap();
                        stream.flush().await.unwrap();
                    }
                    Script::Silent => {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                }
            }
            frames
        });

        Self { port, handle }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the script to finish and return the frames received
    pub(crate) async fn frames(self) -> Vec<[u8; 6]> {
        self.handle.await.unwrap()
    }
}

/// Port with nothing listening on it
pub(crate) async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
