//! Feed worker.
//!
//! Runs a current-thread tokio runtime on a dedicated thread, receives
//! [`FeedCommand`]s from the GUI and reports results back as [`AppEvent`]s.
//!
//! REST fetches are cancel-on-supersede: a new command aborts the in-flight
//! task, and the generation tag carried by each result lets the feed state
//! machine drop anything stale that still slipped through. GraphQL fetches
//! need no abort handle because the feed refuses overlapping requests up
//! front.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

use crate::domain::models::{AppEvent, FeedCommand};
use crate::domain::settings::SettingsService;
use crate::infrastructure::api::graphql::GraphQlClient;
use crate::infrastructure::api::rest::RestClient;

pub fn spawn(
    settings: Arc<Mutex<SettingsService>>,
    events: mpsc::UnboundedSender<AppEvent>,
) -> mpsc::UnboundedSender<FeedCommand> {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime for feeds");

        rt.block_on(async move {
            let http = reqwest::Client::new();
            let mut rest_fetch: Option<JoinHandle<()>> = None;

            while let Some(command) = command_rx.recv().await {
                match command {
                    FeedCommand::FetchRest(request) => {
                        // Cancel the predecessor: only the most recently
                        // issued request's result may be applied.
                        if let Some(task) = rest_fetch.take() {
                            task.abort();
                        }
                        let client = RestClient::new(http.clone(), rest_base(&settings));
                        let events = events.clone();
                        rest_fetch = Some(tokio::spawn(async move {
                            let result = client
                                .fetch_page(request.start, request.limit)
                                .await
                                .map_err(|e| e.to_string());
                            let _ = events.send(AppEvent::RestPage {
                                generation: request.generation,
                                mode: request.mode,
                                result,
                            });
                        }));
                    }
                    FeedCommand::FetchGql(request) => {
                        let client = GraphQlClient::new(http.clone(), graphql_url(&settings));
                        let events = events.clone();
                        tokio::spawn(async move {
                            let result = client
                                .fetch_page(&request)
                                .await
                                .map_err(|e| e.to_string());
                            let _ = events.send(AppEvent::GqlPage {
                                mode: request.mode,
                                result,
                            });
                        });
                    }
                    FeedCommand::CreatePost(request) => {
                        let client = RestClient::new(http.clone(), rest_base(&settings));
                        let events = events.clone();
                        tokio::spawn(async move {
                            let result = client
                                .create_post(&request)
                                .await
                                .map_err(|e| e.to_string());
                            if let Err(e) = &result {
                                error!("create post failed: {e}");
                            }
                            let _ = events.send(AppEvent::PostCreated(result));
                        });
                    }
                    FeedCommand::UpdatePost { id, request } => {
                        let client = RestClient::new(http.clone(), rest_base(&settings));
                        let events = events.clone();
                        tokio::spawn(async move {
                            let result = client
                                .update_post(id, &request)
                                .await
                                .map_err(|e| e.to_string());
                            if let Err(e) = &result {
                                error!("update post failed: {e}");
                            }
                            let _ = events.send(AppEvent::PostUpdated(result));
                        });
                    }
                }
            }
        });
    });

    command_tx
}

fn rest_base(settings: &Arc<Mutex<SettingsService>>) -> String {
    settings
        .lock()
        .map(|s| s.get().rest_base_url.clone())
        .unwrap_or_else(|_| crate::domain::settings::Settings::default().rest_base_url)
}

fn graphql_url(settings: &Arc<Mutex<SettingsService>>) -> String {
    settings
        .lock()
        .map(|s| s.get().graphql_url.clone())
        .unwrap_or_else(|_| crate::domain::settings::Settings::default().graphql_url)
}
