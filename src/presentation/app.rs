use std::sync::{Arc, Mutex};

use eframe::egui;
use tokio::sync::mpsc;

use crate::domain::bluetooth::{AdapterStatus, DeviceRoster};
use crate::domain::models::{
    AppEvent, BluetoothCommand, FeedCommand, MessageSeverity, Post, StatusMessage, Tab,
};
use crate::domain::pagination::{GqlPostsFeed, PostsFeed};
use crate::domain::settings::SettingsService;

/// Inline editor state for creating or editing a REST post.
#[derive(Default)]
pub struct PostComposer {
    pub open: bool,
    pub editing: Option<i64>,
    pub title: String,
    pub body: String,
    pub pending: bool,
}

impl PostComposer {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn open_new(&mut self) {
        self.reset();
        self.open = true;
    }

    pub fn open_edit(&mut self, post: &Post) {
        self.reset();
        self.open = true;
        self.editing = Some(post.id);
        self.title = post.title.clone();
        self.body = post.body.clone();
    }
}

pub struct BlueFeedApp {
    // Services
    pub(crate) settings: Arc<Mutex<SettingsService>>,

    // Worker channels
    pub(crate) bluetooth_tx: mpsc::UnboundedSender<BluetoothCommand>,
    pub(crate) feed_tx: mpsc::UnboundedSender<FeedCommand>,
    pub(crate) events_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    pub(crate) roster: DeviceRoster,
    pub(crate) rest_feed: PostsFeed,
    pub(crate) gql_feed: GqlPostsFeed,
    pub(crate) status_message: Option<StatusMessage>,

    // Transfer panel
    pub(crate) message_input: String,
    pub(crate) transcript: Vec<String>,
    pub(crate) is_listening: bool,

    // UI State
    pub(crate) search_input: String,
    pub(crate) composer: PostComposer,
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,

    // Logging guard
    pub(crate) _logging_guard: Option<crate::infrastructure::logging::LoggingGuard>,
}

impl BlueFeedApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        crate::presentation::theme::configure_neubrutalism(&cc.egui_ctx, false);

        let settings_service = SettingsService::new().expect("Failed to load settings");

        let logging_guard =
            crate::infrastructure::logging::init_logger(&settings_service.get().log_settings)
                .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
                .ok();

        tracing::info!("Starting BlueFeed");

        let page_limit = settings_service.get().page_limit;
        let settings = Arc::new(Mutex::new(settings_service));

        let (event_tx, events_rx) = mpsc::unbounded_channel();
        let bluetooth_tx =
            crate::infrastructure::bluetooth::service::spawn(settings.clone(), event_tx.clone());
        let feed_tx = crate::infrastructure::api::worker::spawn(settings.clone(), event_tx);

        // Kick off the first page of both feeds right away.
        let mut rest_feed = PostsFeed::new(page_limit);
        let mut gql_feed = GqlPostsFeed::new(page_limit);
        let _ = feed_tx.send(FeedCommand::FetchRest(rest_feed.begin_initial()));
        let _ = feed_tx.send(FeedCommand::FetchGql(gql_feed.begin_initial()));

        Self {
            settings,
            bluetooth_tx,
            feed_tx,
            events_rx,
            roster: DeviceRoster::new(),
            rest_feed,
            gql_feed,
            status_message: None,
            message_input: String::new(),
            transcript: Vec::new(),
            is_listening: false,
            search_input: String::new(),
            composer: PostComposer::default(),
            selected_tab: Tab::Posts,
            is_dark_mode: false,
            _logging_guard: logging_guard,
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AdapterState(status) => {
                if status == AdapterStatus::PoweredOff && self.roster.adapter().is_powered_on() {
                    self.status_message =
                        Some(StatusMessage::warning("Bluetooth adapter powered off"));
                }
                self.roster.set_adapter(status);
            }
            AppEvent::ScanStarted => self.roster.scan_started(),
            AppEvent::ScanStopped => self.roster.scan_stopped(),
            AppEvent::DeviceSighted { id, name, rssi } => self.roster.sighting(&id, &name, rssi),
            AppEvent::DeviceConnected(id) => {
                self.roster.device_connected(&id);
                let name = self
                    .roster
                    .connected_device()
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| id.clone());
                self.status_message = Some(StatusMessage::success(format!("Connected to {name}")));
            }
            AppEvent::DeviceDisconnected => {
                self.roster.device_disconnected();
                self.is_listening = false;
            }
            AppEvent::DeviceLost(id) => {
                self.roster.device_lost(&id);
                if self.roster.connected_device().is_none() {
                    self.is_listening = false;
                }
            }
            AppEvent::BluetoothError(message) => {
                self.roster.set_error(message.clone());
                self.status_message = Some(StatusMessage::error(message));
            }
            AppEvent::TransferSent(text) => {
                self.transcript.push(format!("Sent: {text}"));
            }
            AppEvent::TransferReceived(text) => {
                self.transcript.push(format!("Received: {text}"));
            }
            AppEvent::ListeningChanged(listening) => self.is_listening = listening,
            AppEvent::RestPage {
                generation,
                mode,
                result,
            } => self.rest_feed.apply(generation, mode, result),
            AppEvent::GqlPage { mode, result } => self.gql_feed.apply(mode, result),
            AppEvent::PostCreated(result) => match result {
                Ok(post) => {
                    self.rest_feed.prepend(post);
                    self.composer.reset();
                    self.status_message = Some(StatusMessage::success("Post created"));
                }
                Err(message) => {
                    self.composer.pending = false;
                    self.status_message = Some(StatusMessage::error(message));
                }
            },
            AppEvent::PostUpdated(result) => match result {
                Ok(post) => {
                    self.rest_feed.replace(post);
                    self.composer.reset();
                    self.status_message = Some(StatusMessage::success("Post updated"));
                }
                Err(message) => {
                    self.composer.pending = false;
                    self.status_message = Some(StatusMessage::error(message));
                }
            },
            AppEvent::LogMessage(message) => self.status_message = Some(message),
        }
    }
}

impl eframe::App for BlueFeedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }

        ctx.request_repaint();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Posts, "Posts");
                ui.selectable_value(&mut self.selected_tab, Tab::GraphQl, "GraphQL");
                ui.selectable_value(&mut self.selected_tab, Tab::Bluetooth, "Bluetooth");
                ui.selectable_value(&mut self.selected_tab, Tab::Transfer, "Transfer");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        crate::presentation::theme::configure_neubrutalism(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        if let Some(message) = self.status_message.clone() {
            egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let color = match message.severity {
                        MessageSeverity::Info => egui::Color32::BLUE,
                        MessageSeverity::Success => egui::Color32::from_rgb(0, 150, 0),
                        MessageSeverity::Warning => egui::Color32::from_rgb(200, 150, 0),
                        MessageSeverity::Error => egui::Color32::RED,
                    };
                    ui.label(egui::RichText::new(&message.message).color(color).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.status_message = None;
                        }
                    });
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(860.0);
                    ui.add_space(20.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Posts => tabs::posts::render(self, ui),
                        Tab::GraphQl => tabs::gql_posts::render(self, ui),
                        Tab::Bluetooth => tabs::bluetooth::render(self, ui),
                        Tab::Transfer => tabs::transfer::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(50.0);
                });
            });
        });
    }
}
