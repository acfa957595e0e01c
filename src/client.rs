// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of src/client.ts

use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::alarm::{Alarm, AlarmZone, ArmingState};
use crate::config::ClientConfig;
use crate::connection::{self, Connection, SharedWriter};
use crate::error::Result;
use crate::event::Event;
use crate::packet::{CommandType, Packet};

/// Receiver half of the decoded-event broadcast channel.
pub type EventReceiver = broadcast::Receiver<Event>;

/// Wrap a keypad command string in a user-interface request packet,
/// CRLF-terminated for transmission.
fn encode_command(address: u8, command: &str) -> Result<String> {
    let packet = Packet::new(Some(address), 0x00, CommandType::UserInterface, command, None);
    Ok(format!("{}\r\n", packet.encode()?))
}

/// High-level client for a Ness D8x/D16x alarm panel.
///
/// Owns the TCP link, decodes the inbound frame stream into events, feeds
/// them to an [`Alarm`] state machine, and periodically polls the panel
/// for zone and arming status. Each inbound frame is fully decoded and
/// dispatched before the next is considered; there is no internal queue.
pub struct NessClient {
    config: ClientConfig,
    alarm: Arc<Mutex<Alarm>>,
    connection: Connection,
    event_tx: broadcast::Sender<Event>,
    pipeline_handle: Option<tokio::task::JoinHandle<()>>,
    poll_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl NessClient {
    /// Connect to the panel, start the decode pipeline and the status
    /// polling loop, and request an initial status update.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!("Connecting to panel at {}:{}", config.host, config.port);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (connection, mut line_rx) = Connection::open(
            &config.host,
            config.port,
            config.reconnect_delay,
            shutdown_rx,
        )
        .await?;

        let alarm = Arc::new(Mutex::new(Alarm::new(config.infer_arming_state)));
        let (event_tx, _) = broadcast::channel(64);

        // Decode pipeline: line -> packet -> event -> state machine ->
        // subscribers. Undecodable frames are dropped; every decode error
        // is recoverable.
        let pipeline_alarm = alarm.clone();
        let pipeline_tx = event_tx.clone();
        let verify_checksums = config.verify_checksums;
        let pipeline_handle = tokio::spawn(async move {
            while let Some(line) = line_rx.recv().await {
                let event = match Packet::decode(&line, verify_checksums)
                    .and_then(|packet| Event::decode(&packet))
                {
                    Ok(event) => event,
                    Err(e) => {
                        debug!("Dropping undecodable frame {:?}: {}", line, e);
                        continue;
                    }
                };
                debug!("Decoded event: {:?}", event);
                pipeline_alarm.lock().await.handle_event(&event);
                // A send error only means nobody is subscribed right now
                let _ = pipeline_tx.send(event);
            }
        });

        let mut client = Self {
            config,
            alarm,
            connection,
            event_tx,
            pipeline_handle: Some(pipeline_handle),
            poll_handle: None,
            shutdown_tx,
        };

        // Prime the state machine, then keep polling: the panel reports
        // most changes unsolicited and the poll recovers anything missed
        client.update().await?;
        client.poll_handle = Some(client.spawn_status_poll());

        Ok(client)
    }

    fn spawn_status_poll(&self) -> tokio::task::JoinHandle<()> {
        let writer: SharedWriter = self.connection.shared_writer();
        let address = self.config.address;
        let period = self.config.update_interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick fires immediately and connect() has already
            // sent an update
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for command in ["S00", "S14"] {
                            let Ok(payload) = encode_command(address, command) else {
                                continue;
                            };
                            if let Err(e) = connection::write_all(&writer, payload.as_bytes()).await {
                                warn!("Status poll write failed: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        })
    }

    /// Register a handler invoked whenever the interpreted arming state
    /// changes value.
    pub async fn on_state_change(&self, handler: impl FnMut(ArmingState) + Send + 'static) {
        self.alarm.lock().await.on_state_change(handler);
    }

    /// Register a handler invoked with `(zone 1-16, triggered)` whenever a
    /// zone's triggered flag changes value.
    pub async fn on_zone_change(&self, handler: impl FnMut(u8, bool) + Send + 'static) {
        self.alarm.lock().await.on_zone_change(handler);
    }

    /// Subscribe to every decoded panel event.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    /// Current interpreted arming state.
    pub async fn arming_state(&self) -> ArmingState {
        self.alarm.lock().await.arming_state()
    }

    /// Snapshot of the 16 tracked zone states.
    pub async fn zones(&self) -> Vec<AlarmZone> {
        self.alarm.lock().await.zones().to_vec()
    }

    /// Wrap a keypad string in a user-interface packet and transmit it.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        let payload = encode_command(self.config.address, command)?;
        debug!("Sending command: {}", command);
        self.connection.write(payload.as_bytes()).await
    }

    /// Arm in away mode: `A<code>E`. Panels configured for arming without
    /// a user code accept a bare `AE`.
    pub async fn arm_away(&self, code: Option<&str>) -> Result<()> {
        self.send_command(&format!("A{}E", code.unwrap_or_default())).await
    }

    /// Arm in home mode: `H<code>E`.
    pub async fn arm_home(&self, code: Option<&str>) -> Result<()> {
        self.send_command(&format!("H{}E", code.unwrap_or_default())).await
    }

    /// Disarm: `<code>E`.
    pub async fn disarm(&self, code: &str) -> Result<()> {
        self.send_command(&format!("{code}E")).await
    }

    /// Trigger a panic alarm: `*<code>#`.
    pub async fn panic(&self, code: &str) -> Result<()> {
        self.send_command(&format!("*{code}#")).await
    }

    /// Switch an auxiliary output: `<id><id>*` to turn on, `<id><id>#` to
    /// turn off.
    pub async fn aux(&self, output_id: u8, state: bool) -> Result<()> {
        let terminator = if state { '*' } else { '#' };
        self.send_command(&format!("{output_id}{output_id}{terminator}")).await
    }

    /// Request a zone input unsealed (`S00`) and arming status (`S14`)
    /// update from the panel.
    pub async fn update(&self) -> Result<()> {
        self.send_command("S00").await?;
        self.send_command("S14").await
    }

    /// Stop the background tasks and close the connection.
    pub async fn disconnect(&mut self) {
        info!("Disconnecting from panel");
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.pipeline_handle.take() {
            handle.abort();
        }
        self.connection.close().await;
    }
}
