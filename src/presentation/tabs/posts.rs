use eframe::egui;

use crate::domain::models::{CreatePostRequest, FeedCommand, Post, UpdatePostRequest};
use crate::presentation::app::BlueFeedApp;
use crate::presentation::components::Components;

pub fn render(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Posts");
    ui.add_space(10.0);

    ui_toolbar(app, ui);

    if let Some(error) = app.rest_feed.error().map(str::to_owned) {
        ui_error_panel(app, ui, &error);
        return;
    }

    if app.composer.open {
        ui_composer(app, ui);
        ui.add_space(10.0);
    }

    if app.rest_feed.posts().is_empty() && app.rest_feed.is_loading() {
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
        if ui.button("Refresh").clicked() {
            let request = app.rest_feed.begin_refresh();
            let _ = app.feed_tx.send(FeedCommand::FetchRest(request));
        }
        if ui.button("New Post").clicked() {
            app.composer.open_new();
        }
        if app.rest_feed.is_refreshing() {
            ui.spinner();
            ui.label("Refreshing...");
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("{} loaded", app.rest_feed.posts().len()));
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
            let request = app.rest_feed.begin_refresh();
            let _ = app.feed_tx.send(FeedCommand::FetchRest(request));
        }
    });
}

fn ui_composer(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    let title = if app.composer.editing.is_some() {
        "Edit Post"
    } else {
        "New Post"
    };
    Components::brutalist_card(ui, title, |ui| {
        ui.horizontal(|ui| {
            ui.label("Title:");
            ui.text_edit_singleline(&mut app.composer.title);
        });
        ui.label("Body:");
        ui.text_edit_multiline(&mut app.composer.body);

        ui.horizontal(|ui| {
            let can_save = !app.composer.title.trim().is_empty() && !app.composer.pending;
            if ui
                .add_enabled(can_save, egui::Button::new("Save"))
                .clicked()
            {
                app.composer.pending = true;
                let command = match app.composer.editing {
                    Some(id) => FeedCommand::UpdatePost {
                        id,
                        request: UpdatePostRequest {
                            title: Some(app.composer.title.clone()),
                            body: Some(app.composer.body.clone()),
                        },
                    },
                    None => FeedCommand::CreatePost(CreatePostRequest {
                        title: app.composer.title.clone(),
                        body: app.composer.body.clone(),
                        user_id: 1,
                    }),
                };
                let _ = app.feed_tx.send(command);
            }
            if ui.button("Cancel").clicked() {
                app.composer.reset();
            }
            if app.composer.pending {
                ui.spinner();
            }
        });
    });
}

fn ui_post_list(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    let mut edit_request: Option<Post> = None;

    for post in app.rest_feed.posts() {
        Components::brutalist_card(ui, &post.title, |ui| {
            ui.label(&post.body);
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("#{} · user {}", post.id, post.user_id))
                        .size(12.0)
                        .weak(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Edit").clicked() {
                        edit_request = Some(post.clone());
                    }
                });
            });
        });
        ui.add_space(8.0);
    }

    if let Some(post) = edit_request {
        app.composer.open_edit(&post);
    }
}

fn ui_load_more_footer(app: &mut BlueFeedApp, ui: &mut egui::Ui) {
    if app.rest_feed.is_loading_more() {
        ui.spinner();
        ui.label("Loading more...");
        return;
    }

    if app.rest_feed.has_more() {
        // Scroll threshold: the footer becoming visible is the trigger for
        // the next page.
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 24.0),
            egui::Sense::hover(),
        );
        if ui.is_rect_visible(rect) {
            if let Some(request) = app.rest_feed.begin_next_page() {
                let _ = app.feed_tx.send(FeedCommand::FetchRest(request));
            }
        }
    } else if !app.rest_feed.posts().is_empty() {
        ui.label(egui::RichText::new("No more posts").weak());
    }
}
