use eframe::egui;

use crate::domain::models::BluetoothCommand;
use crate::presentation::app::BlueFeedApp;
use crate::presentation::components::Components;

pub fn render(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Data Transfer");
    ui.add_space(10.0);

    let Some(device) = app.roster.connected_device().cloned() else {
        ui.add_space(40.0);
        ui.label(
            egui::RichText::new("Connect to a Bluetooth device first")
                .size(18.0)
                .weak(),
        );
        return;
    };

    ui.label(format!("Connected to: {}", device.name));
    ui.add_space(10.0);

    ui_send_panel(app, ui);
    ui.add_space(15.0);
    ui_listen_panel(app, ui, &device.name);
    ui.add_space(15.0);
    ui_transcript_panel(app, ui);
}

fn ui_send_panel(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Send Message", |ui| {
        ui.text_edit_multiline(&mut app.message_input);
        ui.horizontal(|ui| {
            let can_send = !app.message_input.trim().is_empty();
            if ui
                .add_enabled(can_send, egui::Button::new("Send"))
                .clicked()
            {
                let message = std::mem::take(&mut app.message_input);
                let _ = app
                    .bluetooth_tx
                    .send(BluetoothCommand::SendMessage(message));
            }
        });
    });
}

fn ui_listen_panel(app: &mut BlueFeedApp, ui: &mut egui::Ui, device_name: &str) {
    Components::brutalist_card(ui, "Listen for Data", |ui| {
        if app.is_listening {
            ui.horizontal(|ui| {
                if ui.button("Stop Listening").clicked() {
                    let _ = app.bluetooth_tx.send(BluetoothCommand::StopListening);
                }
                ui.spinner();
                ui.label(format!("Listening to {device_name}..."));
            });
        } else if ui.button("Start Listening").clicked() {
            let _ = app.bluetooth_tx.send(BluetoothCommand::StartListening);
        }
    });
}

fn ui_transcript_panel(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::brutalist_card(ui, "Messages", |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("{} entries", app.transcript.len()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    app.transcript.clear();
                }
            });
        });
        ui.separator();

        if app.transcript.is_empty() {
            ui.label(egui::RichText::new("No messages yet").weak());
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("transfer_transcript")
            .max_height(240.0)
            .show(ui, |ui| {
                for entry in &app.transcript {
                    ui.label(entry);
                }
            });
    });
}
