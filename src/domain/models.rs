use serde::{Deserialize, Serialize};

use crate::domain::bluetooth::AdapterStatus;
use crate::domain::pagination::{FetchMode, FetchRequest, GqlFetchRequest, PostsPage};

/// A blog-style post. Identity is `id`; posts are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Payload for `POST /posts`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Payload for `PATCH /posts/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    // Bluetooth
    AdapterState(AdapterStatus),
    ScanStarted,
    ScanStopped,
    DeviceSighted {
        id: String,
        name: String,
        rssi: Option<i16>,
    },
    DeviceConnected(String),
    DeviceDisconnected,
    /// The platform reported a device dropping off outside an explicit disconnect.
    DeviceLost(String),
    BluetoothError(String),

    // Data transfer
    TransferSent(String),
    TransferReceived(String),
    ListeningChanged(bool),

    // Feeds
    RestPage {
        generation: u64,
        mode: FetchMode,
        result: Result<Vec<Post>, String>,
    },
    GqlPage {
        mode: FetchMode,
        result: Result<PostsPage, String>,
    },
    PostCreated(Result<Post, String>),
    PostUpdated(Result<Post, String>),

    LogMessage(StatusMessage),
}

#[derive(Debug, Clone)]
pub enum BluetoothCommand {
    StartScan,
    StopScan,
    Connect(String),
    Disconnect,
    SendMessage(String),
    StartListening,
    StopListening,
}

#[derive(Debug, Clone)]
pub enum FeedCommand {
    FetchRest(FetchRequest),
    FetchGql(GqlFetchRequest),
    CreatePost(CreatePostRequest),
    UpdatePost { id: i64, request: UpdatePostRequest },
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: MessageSeverity::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: MessageSeverity::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: MessageSeverity::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: MessageSeverity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Posts,
    GraphQl,
    Bluetooth,
    Transfer,
    Settings,
}
