//! Connected device session.
//!
//! Wraps one peripheral after the connect + GATT discovery handshake and
//! carries the data-transfer plumbing: plain text writes to a writable
//! characteristic and a notification subscription pumped into the app event
//! stream.

use std::collections::BTreeSet;

use btleplug::api::{CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::AppEvent;
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::BleError;

/// Transfer characteristic overrides from settings. Unset or unparsable
/// UUIDs fall back to the first characteristic with matching properties.
#[derive(Debug, Clone, Default)]
pub struct TransferPrefs {
    pub write_char: Option<Uuid>,
    pub notify_char: Option<Uuid>,
}

impl TransferPrefs {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            write_char: parse_uuid_setting(&settings.write_char_uuid, "write"),
            notify_char: parse_uuid_setting(&settings.notify_char_uuid, "notify"),
        }
    }
}

fn parse_uuid_setting(raw: &str, label: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Uuid::parse_str(raw) {
        Ok(uuid) => Some(uuid),
        Err(_) => {
            warn!("Ignoring invalid {label} characteristic UUID {raw:?}");
            None
        }
    }
}

pub struct DeviceSession {
    peripheral: Peripheral,
    device_id: String,
    write_char: Option<Characteristic>,
    notify_char: Option<Characteristic>,
    notify_pump: Option<JoinHandle<()>>,
}

impl DeviceSession {
    /// Connect and run the full service/characteristic discovery handshake.
    pub async fn establish(peripheral: Peripheral, prefs: TransferPrefs) -> Result<Self, BleError> {
        let device_id = peripheral.address().to_string();
        info!("Connecting to {device_id}");

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let characteristics = peripheral.characteristics();
        info!("Discovered {} characteristics", characteristics.len());

        let write_char = pick_characteristic(
            &characteristics,
            prefs.write_char,
            CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE,
        );
        let notify_char = pick_characteristic(
            &characteristics,
            prefs.notify_char,
            CharPropFlags::NOTIFY | CharPropFlags::INDICATE,
        );

        Ok(Self {
            peripheral,
            device_id,
            write_char,
            notify_char,
            notify_pump: None,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub async fn send_text(&self, text: &str) -> Result<(), BleError> {
        let characteristic = self
            .write_char
            .as_ref()
            .ok_or(BleError::NoWritableCharacteristic)?;
        let write_type = if characteristic.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        self.peripheral
            .write(characteristic, text.as_bytes(), write_type)
            .await?;
        Ok(())
    }

    /// Subscribe to the notify characteristic and pump incoming values into
    /// the event stream. Already-listening is a no-op.
    pub async fn start_listening(
        &mut self,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<(), BleError> {
        if self.notify_pump.is_some() {
            return Ok(());
        }
        let characteristic = self
            .notify_char
            .clone()
            .ok_or(BleError::NoNotifyCharacteristic)?;

        self.peripheral.subscribe(&characteristic).await?;
        let mut notifications = self.peripheral.notifications().await?;

        self.notify_pump = Some(tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != characteristic.uuid {
                    continue;
                }
                let _ = events.send(AppEvent::TransferReceived(render_payload(
                    &notification.value,
                )));
            }
        }));
        Ok(())
    }

    /// Unsubscribe and stop the pump; idempotent.
    pub async fn stop_listening(&mut self) -> Result<(), BleError> {
        let Some(pump) = self.notify_pump.take() else {
            return Ok(());
        };
        pump.abort();
        if let Some(characteristic) = &self.notify_char {
            self.peripheral.unsubscribe(characteristic).await?;
        }
        Ok(())
    }

    pub async fn teardown(mut self) {
        if let Err(e) = self.stop_listening().await {
            warn!("Failed to unsubscribe during teardown: {e}");
        }
        if let Err(e) = self.peripheral.disconnect().await {
            warn!("Failed to disconnect {}: {e}", self.device_id);
        }
        info!("Disconnected from {}", self.device_id);
    }
}

fn pick_characteristic(
    characteristics: &BTreeSet<Characteristic>,
    preferred: Option<Uuid>,
    wanted: CharPropFlags,
) -> Option<Characteristic> {
    if let Some(uuid) = preferred {
        if let Some(characteristic) = characteristics.iter().find(|c| c.uuid == uuid) {
            return Some(characteristic.clone());
        }
        warn!("Preferred characteristic {uuid} not present, falling back");
    }
    characteristics
        .iter()
        .find(|c| c.properties.intersects(wanted))
        .cloned()
}

/// Printable rendering of a notification payload: UTF-8 when it decodes
/// cleanly, a hex dump otherwise.
fn render_payload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.trim_matches('\0').trim().is_empty() => {
            text.trim_end_matches('\0').to_string()
        }
        _ => bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristic(uuid: u128, properties: CharPropFlags) -> Characteristic {
        Characteristic {
            uuid: Uuid::from_u128(uuid),
            service_uuid: Uuid::from_u128(0xffe0),
            properties,
            descriptors: BTreeSet::new(),
        }
    }

    #[test]
    fn preferred_uuid_wins_over_first_match() {
        let chars: BTreeSet<_> = [
            characteristic(0x1, CharPropFlags::WRITE),
            characteristic(0x2, CharPropFlags::WRITE),
        ]
        .into_iter()
        .collect();

        let picked = pick_characteristic(&chars, Some(Uuid::from_u128(0x2)), CharPropFlags::WRITE);
        assert_eq!(picked.unwrap().uuid, Uuid::from_u128(0x2));
    }

    #[test]
    fn falls_back_to_properties_when_preferred_missing() {
        let chars: BTreeSet<_> = [
            characteristic(0x1, CharPropFlags::READ),
            characteristic(0x2, CharPropFlags::NOTIFY),
        ]
        .into_iter()
        .collect();

        let picked = pick_characteristic(
            &chars,
            Some(Uuid::from_u128(0x9)),
            CharPropFlags::NOTIFY | CharPropFlags::INDICATE,
        );
        assert_eq!(picked.unwrap().uuid, Uuid::from_u128(0x2));

        let none = pick_characteristic(&chars, None, CharPropFlags::WRITE);
        assert!(none.is_none());
    }

    #[test]
    fn payloads_render_as_text_or_hex() {
        assert_eq!(render_payload(b"hello"), "hello");
        assert_eq!(render_payload(b"hello\0\0"), "hello");
        assert_eq!(render_payload(&[0x01, 0xff]), "01 ff");
    }

    #[test]
    fn invalid_uuid_settings_are_ignored() {
        let mut settings = Settings::default();
        settings.write_char_uuid = "not-a-uuid".to_string();
        settings.notify_char_uuid = "0000ffe1-0000-1000-8000-00805f9b34fb".to_string();

        let prefs = TransferPrefs::from_settings(&settings);
        assert!(prefs.write_char.is_none());
        assert_eq!(
            prefs.notify_char,
            Some(Uuid::parse_str("0000ffe1-0000-1000-8000-00805f9b34fb").unwrap())
        );
    }
}
