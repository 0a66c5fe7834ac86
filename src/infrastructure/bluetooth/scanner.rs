//! BLE Scanner Module
//!
//! Time-boxed device discovery: every scan stops on its own after the
//! configured wall-clock timeout, whether or not discovery is still turning
//! up devices. An explicit stop cancels the timer early and is idempotent.

use std::time::Duration;

use btleplug::api::{Central as _, CentralState, ScanFilter};
use btleplug::platform::Adapter;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::models::{AppEvent, StatusMessage};
use crate::infrastructure::bluetooth::BleError;

pub struct BleScanner {
    adapter: Adapter,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    auto_stop: Option<JoinHandle<()>>,
}

impl BleScanner {
    pub fn new(adapter: Adapter, event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            adapter,
            event_sender,
            auto_stop: None,
        }
    }

    /// Start scanning. Rejects without touching the adapter when it is not
    /// powered on.
    pub async fn start(&mut self, timeout: Duration) -> Result<(), BleError> {
        // Stop any existing scan
        self.stop().await?;

        if self.adapter.adapter_state().await? != CentralState::PoweredOn {
            return Err(BleError::AdapterOff);
        }

        info!("Starting BLE scan ({}s window)", timeout.as_secs());
        self.adapter.start_scan(ScanFilter::default()).await?;
        let _ = self.event_sender.send(AppEvent::ScanStarted);
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::info(
            "Scanning for nearby devices...",
        )));

        let adapter = self.adapter.clone();
        let sender = self.event_sender.clone();
        self.auto_stop = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            info!("Scan window elapsed, stopping");
            if let Err(e) = adapter.stop_scan().await {
                warn!("Failed to stop scan after timeout: {e}");
            }
            let _ = sender.send(AppEvent::ScanStopped);
        }));

        Ok(())
    }

    /// Stop scanning early; idempotent.
    pub async fn stop(&mut self) -> Result<(), BleError> {
        if let Some(timer) = self.auto_stop.take() {
            timer.abort();
            info!("Stopping BLE scan");
            self.adapter.stop_scan().await?;
            let _ = self.event_sender.send(AppEvent::ScanStopped);
            let _ = self
                .event_sender
                .send(AppEvent::LogMessage(StatusMessage::info("Scan stopped.")));
        }
        Ok(())
    }
}
