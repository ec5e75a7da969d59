//! Contract for the video-metadata API client.

use crate::models::{VideoId, VideoInfo};
use thiserror::Error;

/// Failures surfaced by the metadata API.
#[derive(Debug, Error)]
pub enum VideoApiError {
    /// The API answered with a non-success HTTP status.
    #[error("api returned status {code}")]
    Status { code: u16 },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("no video found for id {id}")]
    NotFound { id: String },
    #[error("{message}")]
    Other { message: String },
}

impl VideoApiError {
    /// True for 400-class responses, which indicate a rejected or malformed
    /// API key rather than an unreachable upstream.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, VideoApiError::Status { code } if (400..500).contains(code))
    }
}

pub type VideoApiResult<T> = Result<T, VideoApiError>;

/// Read-only client for video metadata lookups.
#[async_trait::async_trait]
pub trait VideoApi: Send + Sync {
    /// One-time asynchronous client setup (the API discovery handshake).
    /// Lookups issued before this completes are the caller's problem; the
    /// media player entity defers them until the client is ready.
    async fn discover(&self) -> VideoApiResult<()>;

    /// Fetch the snippet (title, description, channel) for one video.
    async fn video_snippet(&self, id: &VideoId) -> VideoApiResult<VideoInfo>;
}

/// Builds metadata clients from an API key.
pub trait VideoApiConnector: Send + Sync {
    fn create(&self, api_key: &str) -> std::sync::Arc<dyn VideoApi>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_covers_the_400_class() {
        assert!(VideoApiError::Status { code: 400 }.is_bad_request());
        assert!(VideoApiError::Status { code: 403 }.is_bad_request());
        assert!(!VideoApiError::Status { code: 500 }.is_bad_request());
        assert!(!VideoApiError::Network {
            message: "timeout".into()
        }
        .is_bad_request());
    }
}
