use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "bluefeed".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Post sources
    #[serde(default = "default_rest_base_url")]
    pub rest_base_url: String,
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    // Bluetooth
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,
    /// Characteristic used for outgoing transfer writes. Empty means the
    /// first writable characteristic found after discovery.
    #[serde(default)]
    pub write_char_uuid: String,
    /// Characteristic subscribed for incoming notifications. Empty means the
    /// first notifiable characteristic found after discovery.
    #[serde(default)]
    pub notify_char_uuid: String,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_base_url: default_rest_base_url(),
            graphql_url: default_graphql_url(),
            page_limit: default_page_limit(),
            scan_timeout_secs: default_scan_timeout_secs(),
            write_char_uuid: String::new(),
            notify_char_uuid: String::new(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_rest_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}
fn default_graphql_url() -> String {
    "https://graphqlzero.almansi.me/api".to_string()
}
fn default_page_limit() -> usize {
    crate::domain::pagination::DEFAULT_PAGE_LIMIT
}
fn default_scan_timeout_secs() -> u64 {
    10
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Ok(Self {
            settings,
            settings_path,
        })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BlueFeed");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.page_limit, 10);
        assert_eq!(settings.scan_timeout_secs, 10);
        assert_eq!(
            settings.rest_base_url,
            "https://jsonplaceholder.typicode.com"
        );
        assert!(settings.write_char_uuid.is_empty());
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.page_limit = 25;
        settings.write_char_uuid = "0000ffe1-0000-1000-8000-00805f9b34fb".to_string();

        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.page_limit, 25);
        assert_eq!(restored.write_char_uuid, settings.write_char_uuid);
    }
}
