use eframe::egui;

use crate::domain::bluetooth::AdapterStatus;
use crate::domain::models::BluetoothCommand;
use crate::presentation::app::BlueFeedApp;
use crate::presentation::components::Components;

pub fn render(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Bluetooth Devices");
    ui.add_space(10.0);

    ui_adapter_panel(app, ui);
    ui.add_space(15.0);

    ui_device_list(app, ui);
}

fn ui_adapter_panel(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Adapter", |ui| {
        let (status_text, bg_color, text_color) = match app.roster.adapter() {
            AdapterStatus::PoweredOn => (
                "BLUETOOTH READY",
                egui::Color32::from_rgb(0, 200, 0),
                egui::Color32::BLACK,
            ),
            AdapterStatus::PoweredOff => (
                "BLUETOOTH OFF",
                egui::Color32::from_rgb(255, 50, 50),
                egui::Color32::WHITE,
            ),
            AdapterStatus::Unknown => (
                "ADAPTER STATE UNKNOWN",
                egui::Color32::from_gray(100),
                egui::Color32::WHITE,
            ),
        };
        Components::status_banner(ui, status_text, bg_color, text_color);

        ui.add_space(10.0);

        if let Some(error) = app.roster.error().map(str::to_owned) {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&error).color(egui::Color32::RED).strong());
                if ui.button("Dismiss").clicked() {
                    app.roster.clear_error();
                }
            });
            ui.add_space(5.0);
        }

        ui.horizontal(|ui| {
            if app.roster.is_scanning() {
                if ui.button("Stop Scan").clicked() {
                    let _ = app.bluetooth_tx.send(BluetoothCommand::StopScan);
                }
                ui.spinner();
                ui.label("Scanning...");
            } else {
                let powered = app.roster.adapter().is_powered_on();
                if ui
                    .add_enabled(powered, egui::Button::new("Start Scan"))
                    .clicked()
                    && app.roster.begin_scan().is_ok()
                {
                    let _ = app.bluetooth_tx.send(BluetoothCommand::StartScan);
                }
            }
        });
    });
}

fn ui_device_list(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Nearby Devices", |ui| {
        if app.roster.devices().is_empty() {
            let hint = if app.roster.is_scanning() {
                "Searching..."
            } else {
                "No devices found. Start a scan to discover nearby devices."
            };
            ui.label(egui::RichText::new(hint).weak());
            return;
        }

        enum Action {
            Connect(String),
            Disconnect,
        }
        let mut action: Option<Action> = None;

        for device in app.roster.devices() {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&device.name).strong());
                        if device.is_connected {
                            ui.label(
                                egui::RichText::new(" CONNECTED ")
                                    .background_color(egui::Color32::from_rgb(0, 255, 100))
                                    .color(egui::Color32::BLACK),
                            );
                        }
                    });
                    let rssi = device
                        .rssi
                        .map(|r| format!(" · {r} dBm"))
                        .unwrap_or_default();
                    ui.label(
                        egui::RichText::new(format!("{}{}", device.id, rssi))
                            .size(12.0)
                            .weak(),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if device.is_connected {
                        if ui.button("Disconnect").clicked() {
                            action = Some(Action::Disconnect);
                        }
                    } else if ui.button("Connect").clicked() {
                        action = Some(Action::Connect(device.id.clone()));
                    }
                });
            });
            ui.separator();
        }

        match action {
            Some(Action::Connect(id)) => {
                if app.roster.begin_connect(&id).is_ok() {
                    let _ = app.bluetooth_tx.send(BluetoothCommand::Connect(id));
                }
            }
            Some(Action::Disconnect) => {
                let _ = app.bluetooth_tx.send(BluetoothCommand::Disconnect);
            }
            None => {}
        }
    });
}
