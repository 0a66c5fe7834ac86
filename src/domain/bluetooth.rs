//! Bluetooth adapter and device roster state.
//!
//! Pure projection of the platform adapter fed by worker events; the GUI owns
//! one [`DeviceRoster`] and every Bluetooth view renders from it.

/// Simplified adapter power state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdapterStatus {
    #[default]
    Unknown,
    PoweredOff,
    PoweredOn,
}

impl AdapterStatus {
    pub fn is_powered_on(self) -> bool {
        self == AdapterStatus::PoweredOn
    }
}

/// A device seen during the current scan session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub id: String,
    pub name: String,
    pub rssi: Option<i16>,
    pub is_connected: bool,
}

/// Adapter state, discovered devices and the single active connection.
#[derive(Debug, Default)]
pub struct DeviceRoster {
    adapter: AdapterStatus,
    scanning: bool,
    devices: Vec<DiscoveredDevice>,
    connected: Option<String>,
    error: Option<String>,
}

impl DeviceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter(&self) -> AdapterStatus {
        self.adapter
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn devices(&self) -> &[DiscoveredDevice] {
        &self.devices
    }

    pub fn connected_device(&self) -> Option<&DiscoveredDevice> {
        let id = self.connected.as_deref()?;
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_adapter(&mut self, status: AdapterStatus) {
        self.adapter = status;
        if !status.is_powered_on() {
            self.scanning = false;
        }
    }

    /// Gate a scan on adapter power. On rejection the device list is left
    /// untouched and an error is recorded; no discovery may be started.
    pub fn begin_scan(&mut self) -> Result<(), String> {
        if !self.adapter.is_powered_on() {
            let message = "Bluetooth is not enabled".to_string();
            self.error = Some(message.clone());
            return Err(message);
        }
        Ok(())
    }

    /// A new scan session started: the previous roster is discarded.
    pub fn scan_started(&mut self) {
        self.devices.clear();
        self.connected = None;
        self.scanning = true;
        self.error = None;
    }

    pub fn scan_stopped(&mut self) {
        self.scanning = false;
    }

    /// Record a discovery sighting. Unnamed devices never reach the roster
    /// (filtered upstream); sightings outside a scan session are ignored.
    /// Re-sightings update the rssi in place, last seen wins.
    pub fn sighting(&mut self, id: &str, name: &str, rssi: Option<i16>) {
        if !self.scanning {
            return;
        }
        if let Some(existing) = self.devices.iter_mut().find(|d| d.id == id) {
            existing.rssi = rssi;
        } else {
            self.devices.push(DiscoveredDevice {
                id: id.to_string(),
                name: name.to_string(),
                rssi,
                is_connected: false,
            });
        }
    }

    /// Gate a connect on the device being present in the roster.
    pub fn begin_connect(&mut self, id: &str) -> Result<(), String> {
        if self.devices.iter().any(|d| d.id == id) {
            self.error = None;
            Ok(())
        } else {
            let message = "Device not found".to_string();
            self.error = Some(message.clone());
            Err(message)
        }
    }

    /// Mark exactly one device connected.
    pub fn device_connected(&mut self, id: &str) {
        for device in &mut self.devices {
            device.is_connected = device.id == id;
        }
        self.connected = Some(id.to_string());
    }

    /// Clear the connected flag on every tracked device.
    pub fn device_disconnected(&mut self) {
        for device in &mut self.devices {
            device.is_connected = false;
        }
        self.connected = None;
    }

    /// The platform dropped a device. Only relevant when it was the one
    /// connected; anything else is stale noise.
    pub fn device_lost(&mut self, id: &str) {
        if self.connected.as_deref() == Some(id) {
            self.device_disconnected();
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Errors are dismissible but never auto-cleared.
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered_roster() -> DeviceRoster {
        let mut roster = DeviceRoster::new();
        roster.set_adapter(AdapterStatus::PoweredOn);
        roster
    }

    #[test]
    fn scan_rejected_while_adapter_off() {
        let mut roster = DeviceRoster::new();
        roster.set_adapter(AdapterStatus::PoweredOff);

        assert!(roster.begin_scan().is_err());
        assert!(roster.devices().is_empty());
        assert_eq!(roster.error(), Some("Bluetooth is not enabled"));
        assert!(!roster.is_scanning());
    }

    #[test]
    fn sightings_dedupe_by_id_last_rssi_wins() {
        let mut roster = powered_roster();
        roster.begin_scan().unwrap();
        roster.scan_started();

        roster.sighting("aa:bb", "Thermometer", Some(-60));
        roster.sighting("aa:bb", "Thermometer", Some(-48));
        roster.sighting("cc:dd", "Heart Rate", None);

        assert_eq!(roster.devices().len(), 2);
        assert_eq!(roster.devices()[0].rssi, Some(-48));
    }

    #[test]
    fn sightings_ignored_outside_scan_session() {
        let mut roster = powered_roster();
        roster.sighting("aa:bb", "Thermometer", Some(-60));
        assert!(roster.devices().is_empty());
    }

    #[test]
    fn new_scan_discards_previous_roster() {
        let mut roster = powered_roster();
        roster.scan_started();
        roster.sighting("aa:bb", "Thermometer", Some(-60));
        roster.scan_stopped();

        roster.scan_started();
        assert!(roster.devices().is_empty());
    }

    #[test]
    fn connect_requires_discovered_device() {
        let mut roster = powered_roster();
        roster.scan_started();
        roster.sighting("aa:bb", "Thermometer", Some(-60));

        assert_eq!(
            roster.begin_connect("zz:zz"),
            Err("Device not found".to_string())
        );
        assert!(roster.connected_device().is_none());
        assert_eq!(roster.error(), Some("Device not found"));

        assert!(roster.begin_connect("aa:bb").is_ok());
    }

    #[test]
    fn exactly_one_device_marked_connected() {
        let mut roster = powered_roster();
        roster.scan_started();
        roster.sighting("aa:bb", "Thermometer", Some(-60));
        roster.sighting("cc:dd", "Heart Rate", Some(-70));

        roster.device_connected("cc:dd");
        let connected: Vec<&str> = roster
            .devices()
            .iter()
            .filter(|d| d.is_connected)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(connected, vec!["cc:dd"]);
        assert_eq!(roster.connected_device().unwrap().name, "Heart Rate");
    }

    #[test]
    fn disconnect_clears_every_flag() {
        let mut roster = powered_roster();
        roster.scan_started();
        roster.sighting("aa:bb", "Thermometer", Some(-60));
        roster.sighting("cc:dd", "Heart Rate", Some(-70));
        roster.device_connected("aa:bb");

        roster.device_disconnected();
        assert!(roster.devices().iter().all(|d| !d.is_connected));
        assert!(roster.connected_device().is_none());
    }

    #[test]
    fn device_lost_only_affects_the_connection() {
        let mut roster = powered_roster();
        roster.scan_started();
        roster.sighting("aa:bb", "Thermometer", Some(-60));
        roster.sighting("cc:dd", "Heart Rate", Some(-70));
        roster.device_connected("aa:bb");

        roster.device_lost("cc:dd");
        assert!(roster.connected_device().is_some());

        roster.device_lost("aa:bb");
        assert!(roster.connected_device().is_none());
    }

    #[test]
    fn adapter_power_loss_ends_scan() {
        let mut roster = powered_roster();
        roster.scan_started();
        assert!(roster.is_scanning());
        roster.set_adapter(AdapterStatus::PoweredOff);
        assert!(!roster.is_scanning());
    }
}
