use serde::{Deserialize, Serialize};

/// An opaque YouTube video identifier.
///
/// Treated as a case-sensitive token; the integration never inspects it
/// beyond equality checks and URL construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for VideoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle states a screen reports for its current playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    Playing,
    Paused,
    Buffering,
    Starting,
    Stopped,
    Advertisement,
    /// Anything the screen reports that we do not recognize, including an
    /// entirely absent state before the first push update arrives.
    #[default]
    Unknown,
}

/// The most recent playback sample pushed by a screen.
///
/// Replaced wholesale on every update; only the newest sample matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// Playback position in seconds at the time the sample was taken.
    pub current_time: f64,
    /// Total duration of the current video in seconds, 0 when unknown.
    pub duration: f64,
    pub video_id: Option<VideoId>,
}

/// Video metadata resolved through the YouTube Data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub channel_title: String,
}

/// Serialized pairing credentials.
///
/// Produced by the casting client after pairing and persisted as-is; the
/// integration never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthBlob(pub String);

impl AuthBlob {
    pub fn new(blob: impl Into<String>) -> Self {
        Self(blob.into())
    }
}

impl AsRef<str> for AuthBlob {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of a paired screen as reported by the pairing exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// Stable device-assigned identifier.
    pub screen_id: String,
    /// Human-readable label shown on the TV.
    pub screen_name: String,
}

/// Identifier of a persisted configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Data persisted for a paired screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    /// The numeric code the user typed, kept verbatim.
    pub pairing_code: String,
    /// Optional YouTube Data API key for metadata lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    pub auth: AuthBlob,
}

/// A persisted configuration entry: one paired screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub id: EntryId,
    /// Display title, the screen name captured at pairing time.
    pub title: String,
    pub data: EntryData,
}

/// Public thumbnail URL for a video id.
pub fn thumbnail_url(video_id: &VideoId) -> String {
    format!("https://img.youtube.com/vi/{}/0.jpg", video_id.0)
}
