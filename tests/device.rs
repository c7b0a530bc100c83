//! End-to-end exchanges against a scripted controller on loopback.

use htd_lync12::{Diagnostic, HtdClient, MuteState, PowerState, FRAME_LEN};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn status(zone: u8, flags: u8, source: u8, volume: u8) -> Vec<u8> {
    let mut frame = vec![0u8; FRAME_LEN];
    frame[0] = 0x02;
    frame[2] = zone;
    frame[4] = flags;
    frame[8] = source;
    frame[9] = volume;
    frame
}

/// Serve one connection per entry; `None` keeps quiet until the client gives up
async fn controller(script: Vec<Option<Vec<u8>>>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        for reply in script {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut frame = vec![0u8; 6];
            stream.read_exact(&mut frame).await.unwrap();
            received.push(frame);
            match reply {
                Some(bytes) => stream.write_all(&bytes).await.unwrap(),
                None => tokio::time::sleep(Duration::from_millis(200)).await,
            }
        }
        received
    });
    (port, handle)
}

#[tokio::test]
async fn poll_control_and_degrade() {
    init_tracing();

    let mut all = vec![0u8; FRAME_LEN];
    all.extend(status(2, 0b01, 0, 0xC4 + 6));
    all.extend(status(7, 0b11, 17, 0xC4 + 48));

    let (port, server) = controller(vec![
        Some(all),
        Some(status(2, 0b01, 3, 0xC4 + 6)),
        None,
    ])
    .await;
    let client = HtdClient::new("127.0.0.1", port).with_timeout(Duration::from_millis(50));
    let mut diagnostics = client.subscribe_diagnostics();

    let zones = client.query_all().await.unwrap();
    assert_eq!(zones[1].power, Some(PowerState::On));
    assert_eq!(zones[1].volume, 6);
    assert_eq!(zones[6].mute, Some(MuteState::On));
    assert_eq!(zones[6].source, 18);
    assert_eq!(zones[6].volume, 48);
    assert_eq!(zones[0].power, None);

    let state = client.set_source(2, 4).await.unwrap();
    assert_eq!(state.source, 4);

    let state = client.query_zone(4).await.unwrap();
    assert_eq!(state.zone, 4);
    assert_eq!(state.power, Some(PowerState::Unknown));
    assert!(client
        .zones()
        .iter()
        .all(|z| z.mute == Some(MuteState::Unknown) && z.source == 0 && z.volume == 0));

    let diags = diagnostics.drain();
    assert_eq!(diags.len(), 1);
    assert!(matches!(diags[0], Diagnostic::Timeout { requested: Some(4), .. }));

    let frames = server.await.unwrap();
    assert_eq!(frames[0], [0x02, 0x00, 0x00, 0x05, 0x00, 0x07]);
    assert_eq!(frames[1], [0x02, 0x00, 0x02, 0x04, 19, 0x02 + 0x02 + 0x04 + 19]);
    assert_eq!(frames[2], [0x02, 0x00, 0x04, 0x05, 0x00, 0x0B]);
}

#[tokio::test]
async fn clones_share_state_and_serialize_requests() {
    init_tracing();

    // Answers each query with the zone it asked for, volume = zone number
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut frame = [0u8; 6];
            stream.read_exact(&mut frame).await.unwrap();
            let zone = frame[2];
            stream.write_all(&status(zone, 0b01, 0, 0xC4 + zone)).await.unwrap();
        }
    });

    let client = HtdClient::new("127.0.0.1", port);
    let other = client.clone();

    let (a, b) = tokio::join!(client.query_zone(1), other.query_zone(2));

    assert_eq!(a.unwrap().volume, 1);
    assert_eq!(b.unwrap().volume, 2);
    assert_eq!(client.zones(), other.zones());
    assert_eq!(other.zone(2).map(|z| z.volume), Some(2));
    server.await.unwrap();
}
