//! Bluetooth Service Module
//!
//! Worker-side coordinator owning the manager and adapter handles. Runs on a
//! dedicated thread with a current-thread runtime, executes commands from
//! the GUI and reports everything back as events. The manager lives exactly
//! as long as the worker: listener tasks are aborted before it is dropped,
//! and it is dropped exactly once when the command channel closes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use btleplug::api::{Central as _, CentralEvent, CentralState, Manager as _, Peripheral as _};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::bluetooth::AdapterStatus;
use crate::domain::models::{AppEvent, BluetoothCommand};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::scanner::BleScanner;
use crate::infrastructure::bluetooth::session::{DeviceSession, TransferPrefs};
use crate::infrastructure::bluetooth::BleError;

type SharedMutex<T> = Arc<StdMutex<T>>;

/// Spawn the Bluetooth worker thread and return its command channel.
pub fn spawn(
    settings: Arc<StdMutex<SettingsService>>,
    events: mpsc::UnboundedSender<AppEvent>,
) -> mpsc::UnboundedSender<BluetoothCommand> {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime for Bluetooth");

        rt.block_on(async move {
            let mut service = match BluetoothService::new(events.clone(), settings).await {
                Ok(service) => service,
                Err(e) => {
                    error!("Bluetooth unavailable: {e}");
                    let _ = events.send(AppEvent::AdapterState(AdapterStatus::Unknown));
                    let _ = events.send(AppEvent::BluetoothError(e.to_string()));
                    return;
                }
            };

            while let Some(command) = command_rx.recv().await {
                service.handle(command).await;
            }
            service.shutdown().await;
        });
    });

    command_tx
}

pub struct BluetoothService {
    // Held so the platform manager outlives every adapter handle and is
    // released exactly once, on worker exit.
    _manager: Manager,
    adapter: Adapter,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    settings: Arc<StdMutex<SettingsService>>,
    scanner: BleScanner,
    /// Peripherals sighted during the current scan session, by address.
    discovered: SharedMutex<HashMap<String, Peripheral>>,
    adapter_pump: Option<JoinHandle<()>>,
    session: Option<DeviceSession>,
}

impl BluetoothService {
    pub async fn new(
        event_sender: mpsc::UnboundedSender<AppEvent>,
        settings: Arc<StdMutex<SettingsService>>,
    ) -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BleError::NoAdapter)?;

        let mut service = Self {
            scanner: BleScanner::new(adapter.clone(), event_sender.clone()),
            _manager: manager,
            adapter,
            event_sender,
            settings,
            discovered: Arc::new(StdMutex::new(HashMap::new())),
            adapter_pump: None,
            session: None,
        };

        service.report_adapter_state().await;
        service.spawn_adapter_pump();
        Ok(service)
    }

    async fn report_adapter_state(&self) {
        let status = match self.adapter.adapter_state().await {
            Ok(state) => adapter_status(state),
            Err(e) => {
                warn!("Failed to read adapter state: {e}");
                AdapterStatus::Unknown
            }
        };
        let _ = self.event_sender.send(AppEvent::AdapterState(status));
    }

    /// Long-lived adapter event listener: state changes, discovery
    /// sightings and connection drops. Aborted before the manager is
    /// released so it can never fire after teardown.
    fn spawn_adapter_pump(&mut self) {
        let adapter = self.adapter.clone();
        let sender = self.event_sender.clone();
        let discovered = self.discovered.clone();

        self.adapter_pump = Some(tokio::spawn(async move {
            let mut events = match adapter.events().await {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Adapter event stream unavailable: {e}");
                    return;
                }
            };

            while let Some(event) = events.next().await {
                match event {
                    CentralEvent::StateUpdate(state) => {
                        let _ = sender.send(AppEvent::AdapterState(adapter_status(state)));
                    }
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
                        let Ok(peripheral) = adapter.peripheral(&id).await else {
                            continue;
                        };
                        let Ok(Some(properties)) = peripheral.properties().await else {
                            continue;
                        };
                        // Unnamed devices are dropped silently.
                        let Some(name) = properties.local_name else {
                            continue;
                        };
                        let address = peripheral.address().to_string();
                        if let Ok(mut map) = discovered.lock() {
                            map.insert(address.clone(), peripheral);
                        }
                        let _ = sender.send(AppEvent::DeviceSighted {
                            id: address,
                            name,
                            rssi: properties.rssi,
                        });
                    }
                    CentralEvent::DeviceDisconnected(id) => {
                        if let Ok(peripheral) = adapter.peripheral(&id).await {
                            let _ = sender
                                .send(AppEvent::DeviceLost(peripheral.address().to_string()));
                        }
                    }
                    _ => {}
                }
            }
        }));
    }

    pub async fn handle(&mut self, command: BluetoothCommand) {
        let result = match command {
            BluetoothCommand::StartScan => self.start_scan().await,
            BluetoothCommand::StopScan => self.scanner.stop().await,
            BluetoothCommand::Connect(id) => self.connect(&id).await,
            BluetoothCommand::Disconnect => self.disconnect().await,
            BluetoothCommand::SendMessage(text) => self.send_message(text).await,
            BluetoothCommand::StartListening => self.start_listening().await,
            BluetoothCommand::StopListening => self.stop_listening().await,
        };

        if let Err(e) = result {
            warn!("Bluetooth command failed: {e}");
            let _ = self.event_sender.send(AppEvent::BluetoothError(e.to_string()));
        }
    }

    async fn start_scan(&mut self) -> Result<(), BleError> {
        let timeout = self
            .settings
            .lock()
            .map(|s| s.get().scan_timeout_secs)
            .unwrap_or(10);

        // A new scan session discards everything seen by the previous one.
        if let Ok(mut map) = self.discovered.lock() {
            map.clear();
        }
        self.scanner.start(Duration::from_secs(timeout)).await
    }

    async fn connect(&mut self, id: &str) -> Result<(), BleError> {
        // Single active connection: replace, never stack.
        if let Some(session) = self.session.take() {
            session.teardown().await;
            let _ = self.event_sender.send(AppEvent::DeviceDisconnected);
        }

        let peripheral = self
            .discovered
            .lock()
            .ok()
            .and_then(|map| map.get(id).cloned())
            .ok_or(BleError::DeviceNotFound)?;

        let prefs = self
            .settings
            .lock()
            .map(|s| TransferPrefs::from_settings(s.get()))
            .unwrap_or_default();

        let session = DeviceSession::establish(peripheral, prefs).await?;
        info!("Connected to {}", session.device_id());
        let _ = self
            .event_sender
            .send(AppEvent::DeviceConnected(session.device_id().to_string()));
        self.session = Some(session);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), BleError> {
        // No-op when nothing is connected.
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session.teardown().await;
        let _ = self.event_sender.send(AppEvent::DeviceDisconnected);
        Ok(())
    }

    async fn send_message(&mut self, text: String) -> Result<(), BleError> {
        let session = self.session.as_ref().ok_or(BleError::NotConnected)?;
        session.send_text(&text).await?;
        let _ = self.event_sender.send(AppEvent::TransferSent(text));
        Ok(())
    }

    async fn start_listening(&mut self) -> Result<(), BleError> {
        let sender = self.event_sender.clone();
        let session = self.session.as_mut().ok_or(BleError::NotConnected)?;
        session.start_listening(sender).await?;
        let _ = self.event_sender.send(AppEvent::ListeningChanged(true));
        Ok(())
    }

    async fn stop_listening(&mut self) -> Result<(), BleError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.stop_listening().await?;
        let _ = self.event_sender.send(AppEvent::ListeningChanged(false));
        Ok(())
    }

    /// Guaranteed teardown on worker exit: scan stopped, connection torn
    /// down, listener aborted, manager dropped once.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.scanner.stop().await {
            warn!("Failed to stop scan during shutdown: {e}");
        }
        if let Some(session) = self.session.take() {
            session.teardown().await;
        }
        if let Some(pump) = self.adapter_pump.take() {
            pump.abort();
        }
        info!("Bluetooth service shut down");
    }
}

fn adapter_status(state: CentralState) -> AdapterStatus {
    match state {
        CentralState::PoweredOn => AdapterStatus::PoweredOn,
        CentralState::PoweredOff => AdapterStatus::PoweredOff,
        _ => AdapterStatus::Unknown,
    }
}
