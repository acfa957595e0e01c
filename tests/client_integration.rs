// Integration tests driving a real NessClient against a loopback TCP
// listener standing in for the panel.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use ness_lan_bridge::{ArmingState, ClientConfig, Event, NessClient};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind a listener and build a client config pointing at it. The polling
/// interval is pushed out so tests only see the traffic they create.
async fn fake_panel() -> (TcpListener, ClientConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ClientConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .update_interval(Duration::from_secs(3600))
        .reconnect_delay(Duration::from_millis(100))
        .build();
    (listener, config)
}

async fn read_line(lines: &mut tokio::io::Lines<BufReader<TcpStream>>) -> String {
    timeout(RECV_TIMEOUT, lines.next_line())
        .await
        .expect("timed out waiting for a command line")
        .unwrap()
        .expect("panel connection closed")
}

async fn next_state(rx: &mut mpsc::UnboundedReceiver<ArmingState>) -> ArmingState {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a state change")
        .unwrap()
}

#[tokio::test]
async fn commands_reach_the_panel_encoded_and_terminated() {
    let (listener, config) = fake_panel().await;
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let mut client = NessClient::connect(config).await.unwrap();
    let stream = accept.await.unwrap();
    let mut lines = BufReader::new(stream).lines();

    // connect() issues the initial status poll
    assert_eq!(read_line(&mut lines).await, "8300360S00E9");
    assert_eq!(read_line(&mut lines).await, "8300360S14E4");

    client.arm_away(Some("1234")).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300660A1234E49");

    client.arm_away(None).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300260AE17");

    client.arm_home(Some("1234")).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300660H1234E42");

    client.arm_home(None).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300260HE10");

    client.disarm("1234").await.unwrap();
    assert_eq!(read_line(&mut lines).await, "83005601234E8B");

    client.panic("1234").await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300660*1234#82");

    client.aux(1, true).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "830036011*10");

    client.aux(1, false).await.unwrap();
    assert_eq!(read_line(&mut lines).await, "830036011#17");

    client.send_command("FOOBARBAZ").await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300960FOOBARBAZ00");

    client.update().await.unwrap();
    assert_eq!(read_line(&mut lines).await, "8300360S00E9");
    assert_eq!(read_line(&mut lines).await, "8300360S14E4");

    client.disconnect().await;
}

#[tokio::test]
async fn panel_events_drive_the_state_machine() {
    let (listener, config) = fake_panel().await;
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let mut client = NessClient::connect(config).await.unwrap();
    let mut stream = accept.await.unwrap();

    let (state_tx, mut state_rx) = mpsc::unbounded_channel();
    client
        .on_state_change(move |state| {
            let _ = state_tx.send(state);
        })
        .await;
    let (zone_tx, mut zone_rx) = mpsc::unbounded_channel();
    client
        .on_zone_change(move |zone, triggered| {
            let _ = zone_tx.send((zone, triggered));
        })
        .await;
    let mut events = client.subscribe();

    // Zone input unsealed response: zones 1 and 3 unsealed. Every zone
    // was unknown until now, so all 16 report their first observation.
    stream.write_all(b"8200036000050016\r\n").await.unwrap();
    let mut changes = Vec::new();
    for _ in 0..16 {
        changes.push(timeout(RECV_TIMEOUT, zone_rx.recv()).await.unwrap().unwrap());
    }
    for (zone, triggered) in changes {
        assert_eq!(triggered, zone == 1 || zone == 3, "zone {zone}");
    }
    let event = timeout(RECV_TIMEOUT, events.recv()).await.unwrap().unwrap();
    assert!(matches!(event, Event::ZoneUpdate(_)));

    // ARMED_AWAY system status event: state -> Arming, expecting ArmedAway
    stream.write_all(b"820361240000F6\r\n").await.unwrap();
    assert_eq!(next_state(&mut state_rx).await, ArmingState::Arming);

    // Arming update with only AREA_1_ARMED: exit delay running
    stream.write_all(b"8200036014010006\r\n").await.unwrap();
    assert_eq!(next_state(&mut state_rx).await, ArmingState::ExitDelay);

    // EXIT_DELAY_END: settles into the expected ArmedAway
    stream.write_all(b"820361230000F7\r\n").await.unwrap();
    assert_eq!(next_state(&mut state_rx).await, ArmingState::ArmedAway);

    // ALARM trips, ALARM_RESTORE returns to the expected state
    stream.write_all(b"82036102010017\r\n").await.unwrap();
    assert_eq!(next_state(&mut state_rx).await, ArmingState::Triggered);
    stream.write_all(b"82036103010016\r\n").await.unwrap();
    assert_eq!(next_state(&mut state_rx).await, ArmingState::ArmedAway);

    assert_eq!(client.arming_state().await, ArmingState::ArmedAway);

    client.disconnect().await;
}

#[tokio::test]
async fn corrupt_frames_are_dropped_without_stalling() {
    let (listener, config) = fake_panel().await;
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
    let mut client = NessClient::connect(config).await.unwrap();
    let mut stream = accept.await.unwrap();

    let (zone_tx, mut zone_rx) = mpsc::unbounded_channel();
    client
        .on_zone_change(move |zone, triggered| {
            let _ = zone_tx.send((zone, triggered));
        })
        .await;

    // Corrupted checksum (zone-3-only payload), then an unknown request
    // id, then a valid zones-1-and-3 frame. Had either bad frame been
    // applied, the first notification would not be (1, true).
    stream.write_all(b"8200036000040016\r\n").await.unwrap();
    stream.write_all(b"82000360550000C6\r\n").await.unwrap();
    stream.write_all(b"8200036000050016\r\n").await.unwrap();

    let first = timeout(RECV_TIMEOUT, zone_rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, (1, true));
    let second = timeout(RECV_TIMEOUT, zone_rx.recv()).await.unwrap().unwrap();
    assert_eq!(second, (2, false));
    let third = timeout(RECV_TIMEOUT, zone_rx.recv()).await.unwrap().unwrap();
    assert_eq!(third, (3, true));

    client.disconnect().await;
}

#[tokio::test]
async fn reconnects_after_connection_loss() {
    let (listener, config) = fake_panel().await;
    let accept = tokio::spawn(async move {
        let (first, _) = listener.accept().await.unwrap();
        (listener, first)
    });
    let mut client = NessClient::connect(config).await.unwrap();
    let (listener, first) = accept.await.unwrap();

    // Panel drops the connection
    drop(first);

    // The client re-establishes the link on its own
    let (second, _) = timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("client did not reconnect")
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    client.update().await.unwrap();
    let mut lines = BufReader::new(second).lines();
    assert_eq!(
        timeout(RECV_TIMEOUT, lines.next_line()).await.unwrap().unwrap().unwrap(),
        "8300360S00E9"
    );

    client.disconnect().await;
}
