use eframe::egui;

use crate::domain::models::StatusMessage;
use crate::presentation::app::BlueFeedApp;
use crate::presentation::components::Components;

pub fn render(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(20.0);

    let mut save_result = None;

    if let Ok(mut settings) = app.settings.lock() {
        let settings_mut = settings.get_mut();

        Components::brutalist_card(ui, "Post Sources", |ui| {
            egui::Grid::new("post_sources")
                .spacing([10.0, 10.0])
                .show(ui, |ui| {
                    ui.label("REST base URL:");
                    ui.text_edit_singleline(&mut settings_mut.rest_base_url);
                    ui.end_row();
                    ui.label("GraphQL endpoint:");
                    ui.text_edit_singleline(&mut settings_mut.graphql_url);
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                ui.label("Page size:");
                ui.add(egui::Slider::new(&mut settings_mut.page_limit, 5..=50));
            });
            ui.label(
                egui::RichText::new("Restart required for page size changes.")
                    .italics()
                    .size(12.0),
            );
        });

        ui.add_space(10.0);

        Components::brutalist_card(ui, "Bluetooth", |ui| {
            ui.horizontal(|ui| {
                ui.label("Scan window (seconds):");
                ui.add(egui::Slider::new(&mut settings_mut.scan_timeout_secs, 1..=60));
            });

            ui.collapsing("Transfer characteristic overrides", |ui| {
                ui.label(
                    egui::RichText::new(
                        "Leave empty to use the first matching characteristic after discovery.",
                    )
                    .size(12.0),
                );
                egui::Grid::new("transfer_uuids")
                    .spacing([10.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Write:");
                        ui.text_edit_singleline(&mut settings_mut.write_char_uuid);
                        ui.end_row();
                        ui.label("Notify:");
                        ui.text_edit_singleline(&mut settings_mut.notify_char_uuid);
                        ui.end_row();
                    });
            });
        });

        ui.add_space(10.0);

        Components::brutalist_card(ui, "Logging & Debug", |ui| {
            ui.horizontal(|ui| {
                ui.label("Verbosity Level:");
                egui::ComboBox::from_id_salt("log_level")
                    .selected_text(&settings_mut.log_settings.level)
                    .show_ui(ui, |ui| {
                        for level in &["trace", "debug", "info", "warn", "error"] {
                            ui.selectable_value(
                                &mut settings_mut.log_settings.level,
                                level.to_string(),
                                *level,
                            );
                        }
                    });
            });

            ui.checkbox(
                &mut settings_mut.log_settings.console_logging_enabled,
                "Standard Console Logs",
            );
            ui.checkbox(
                &mut settings_mut.log_settings.file_logging_enabled,
                "Persistent File Logs",
            );

            if settings_mut.log_settings.file_logging_enabled {
                ui.indent("file_logs", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Save Path:");
                        ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Rotation:");
                        egui::ComboBox::from_id_salt("log_rot")
                            .selected_text(&settings_mut.log_settings.rotation)
                            .show_ui(ui, |ui| {
                                for rot in &["daily", "hourly", "never"] {
                                    ui.selectable_value(
                                        &mut settings_mut.log_settings.rotation,
                                        rot.to_string(),
                                        *rot,
                                    );
                                }
                            });
                    });
                });
                ui.label(
                    egui::RichText::new("Restart required for log changes.")
                        .italics()
                        .size(12.0),
                );
            }
        });

        ui.add_space(15.0);

        if ui.button("Save Settings").clicked() {
            save_result = Some(settings.save());
        }
    }

    if let Some(result) = save_result {
        app.status_message = Some(match result {
            Ok(()) => StatusMessage::success("Settings saved"),
            Err(e) => StatusMessage::error(format!("Failed to save settings: {e}")),
        });
    }
}
