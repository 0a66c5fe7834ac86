//! Bluetooth Module
//!
//! Thin projection over the platform BLE stack (btleplug).
//!
//! ## Modules
//!
//! - [`scanner`] - time-boxed device discovery
//! - [`session`] - a connected device: GATT discovery, transfer writes and
//!   notification subscriptions
//! - [`service`] - worker coordinator owning the manager/adapter handles
//!
//! The service runs on its own thread and is driven exclusively through
//! [`BluetoothCommand`](crate::domain::models::BluetoothCommand)s; everything
//! it learns flows back as [`AppEvent`](crate::domain::models::AppEvent)s.

pub mod scanner;
pub mod service;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BleError {
    #[error("bluetooth error: {0}")]
    Backend(#[from] btleplug::Error),
    #[error("no Bluetooth adapter available")]
    NoAdapter,
    #[error("Bluetooth is not enabled")]
    AdapterOff,
    #[error("Device not found")]
    DeviceNotFound,
    #[error("No device connected")]
    NotConnected,
    #[error("device exposes no writable characteristic")]
    NoWritableCharacteristic,
    #[error("device exposes no notifiable characteristic")]
    NoNotifyCharacteristic,
}

pub use service::BluetoothService;
