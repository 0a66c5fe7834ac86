use eframe::egui;

use crate::domain::models::FeedCommand;
use crate::presentation::app::BlueFeedApp;
use crate::presentation::components::Components;

pub fn render(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Posts (GraphQL)");
    ui.add_space(10.0);

    ui_toolbar(app, ui);

    if let Some(error) = app.gql_feed.error().map(str::to_owned) {
        ui_error_panel(app, ui, &error);
        return;
    }

    if app.gql_feed.item_count() == 0 && app.gql_feed.is_loading() {
        ui.add_space(40.0);
        ui.spinner();
        ui.label("Loading posts...");
        return;
    }

    ui_post_list(app, ui);
    ui_load_more_footer(app, ui);
}

fn ui_toolbar(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label("Search:");
        let response = ui.text_edit_singleline(&mut app.search_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submitted || ui.button("Apply").clicked() {
            let query = Some(app.search_input.clone()).filter(|s| !s.trim().is_empty());
            if let Some(request) = app.gql_feed.set_search(query) {
                let _ = app.feed_tx.send(FeedCommand::FetchGql(request));
            }
        }
        if ui.button("Refresh").clicked() {
            if let Some(request) = app.gql_feed.begin_refresh() {
                let _ = app.feed_tx.send(FeedCommand::FetchGql(request));
            }
        }
        if app.gql_feed.is_refreshing() {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match app.gql_feed.total_count() {
                Some(total) => ui.label(format!("{} of {}", app.gql_feed.item_count(), total)),
                None => ui.label(format!("{} loaded", app.gql_feed.item_count())),
            };
        });
    });
    ui.add_space(10.0);
}

fn ui_error_panel(app: &mut BlueFeedApp, ui: &mut egui::Ui, error: &str) {
    Components::brutalist_card(ui, "Something went wrong", |ui| {
        ui.label(
            egui::RichText::new(format!("Error: {error}"))
                .color(egui::Color32::RED)
                .strong(),
        );
        ui.add_space(5.0);
        if ui.button("Retry").clicked() {
            if let Some(request) = app.gql_feed.begin_refresh() {
                let _ = app.feed_tx.send(FeedCommand::FetchGql(request));
            }
        }
    });
}

fn ui_post_list(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    for post in app.gql_feed.posts() {
        Components::brutalist_card(ui, &post.title, |ui| {
            ui.label(&post.body);
            ui.add_space(5.0);
            ui.label(
                egui::RichText::new(format!("#{} · user {}", post.id, post.user_id))
                    .size(12.0)
                    .weak(),
            );
        });
        ui.add_space(8.0);
    }
}

fn ui_load_more_footer(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    if app.gql_feed.is_loading_more() {
        ui.spinner();
        ui.label("Loading more...");
        return;
    }

    if app.gql_feed.has_more() {
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 24.0),
            egui::Sense::hover(),
        );
        if ui.is_rect_visible(rect) {
            if let Some(request) = app.gql_feed.begin_next_page() {
                let _ = app.feed_tx.send(FeedCommand::FetchGql(request));
            }
        }
    } else if app.gql_feed.item_count() > 0 {
        ui.label(egui::RichText::new("No more posts").weak());
    }
}
