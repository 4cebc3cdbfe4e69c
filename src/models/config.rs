use serde::{Deserialize, Serialize};

/// Default contents of `configs/youtube-dl.config`.
///
/// Stored and forwarded to the downloader untouched, never parsed here.
pub const DEFAULT_DOWNLOADER_CONFIG: &str = r#"
-o "videos/%(id)s/%(title)s.%(ext)s"
# To reduce output video filesize, use the following instead to limit to [height<1080][fps<?60]
#-f 'best[height<1080][fps<?60]' -o "videos/%(id)s/%(title)s.%(ext)s"
# --quiet
"#;

/// Application configuration from `configs/config.json`
///
/// The recorder scripts read the same file, so the renamed keys must stay stable.
/// Missing keys fall back to [`Configuration::default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "youtube-dl_cmd")]
    pub downloader_command: String,

    #[serde(rename = "youtube-dl_config")]
    pub downloader_config_path: String,

    /// Advisory only. Nothing in this crate watches the file.
    #[serde(rename = "auto_reload_config")]
    pub auto_reload_config: bool,

    #[serde(rename = "rate_limit")]
    pub rate_limit_enabled: bool,

    #[serde(rename = "rate_limit_time")]
    pub rate_limit_seconds: u32,

    #[serde(rename = "default_export_location")]
    pub default_export_location: String,

    /// Display order, duplicates allowed.
    pub streamers: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            downloader_command: "youtube-dl".to_string(),
            downloader_config_path: "configs/youtube-dl.config".to_string(),
            auto_reload_config: true,
            rate_limit_enabled: true,
            rate_limit_seconds: 5,
            default_export_location: "./list.txt".to_string(),
            streamers: Vec::new(),
        }
    }
}

impl Configuration {
    /// Append a streamer to the end of the list
    pub fn push_streamer(&mut self, name: impl Into<String>) {
        self.streamers.push(name.into());
    }

    /// Remove the streamer at `index`, returning it if the index was valid
    pub fn remove_streamer_at(&mut self, index: usize) -> Option<String> {
        if index < self.streamers.len() {
            Some(self.streamers.remove(index))
        } else {
            None
        }
    }
}
