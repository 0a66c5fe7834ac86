mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_title("BlueFeed"),
        ..Default::default()
    };

    eframe::run_native(
        "BlueFeed",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::BlueFeedApp::new(cc)))),
    )
}
