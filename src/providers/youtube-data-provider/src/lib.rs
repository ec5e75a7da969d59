//! YouTube Data API v3 client for video-metadata lookups.
//!
//! Only the `snippet` part of `videos.list` is consumed, plus the service
//! discovery document as a readiness handshake. The API key travels in the
//! query string, so every error message that could echo a URL is redacted
//! before it reaches the logs.

pub mod models;

use std::sync::Arc;
use std::time::Duration;

use models::VideoListResponse;
use reqwest::Client;
use tracing::debug;
use url::Url;
use ytlounge_core::redact::redact_secrets;
use ytlounge_core::video::{VideoApi, VideoApiConnector, VideoApiError, VideoApiResult};
use ytlounge_core::{VideoId, VideoInfo};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// A metadata client bound to one API key.
pub struct YouTubeDataApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl YouTubeDataApi {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> VideoApiResult<reqwest::Response> {
        let url = self.base_url.join(path).map_err(|e| VideoApiError::Other {
            message: e.to_string(),
        })?;
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| VideoApiError::Network {
                message: redact_secrets(&e.to_string()).into_owned(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(VideoApiError::Status {
                code: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl VideoApi for YouTubeDataApi {
    /// Fetch the service discovery document. The body is irrelevant; a
    /// successful round-trip means the service accepts this key.
    async fn discover(&self) -> VideoApiResult<()> {
        self.get("discovery/v1/apis/youtube/v3/rest", &[]).await?;
        debug!("data api discovery completed");
        Ok(())
    }

    async fn video_snippet(&self, id: &VideoId) -> VideoApiResult<VideoInfo> {
        let response = self
            .get(
                "youtube/v3/videos",
                &[("part", "snippet"), ("id", id.as_ref())],
            )
            .await?;
        let body: VideoListResponse =
            response.json().await.map_err(|e| VideoApiError::Other {
                message: redact_secrets(&e.to_string()).into_owned(),
            })?;
        let item = body.items.into_iter().next().ok_or(VideoApiError::NotFound {
            id: id.as_ref().to_owned(),
        })?;
        Ok(VideoInfo {
            id: VideoId::new(item.id),
            title: item.snippet.title,
            description: item.snippet.description,
            channel_title: item.snippet.channel_title,
        })
    }
}

/// Builds [`YouTubeDataApi`] clients sharing one HTTP connection pool.
pub struct YouTubeDataConnector {
    client: Client,
    base_url: Url,
}

impl YouTubeDataConnector {
    pub fn new() -> VideoApiResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the connector at an alternative endpoint, for tests.
    pub fn with_base_url(base_url: &str) -> VideoApiResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| VideoApiError::Other {
            message: format!("invalid base url: {e}"),
        })?;
        // Url::join treats a path without a trailing slash as a file.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| VideoApiError::Other {
                message: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }
}

impl VideoApiConnector for YouTubeDataConnector {
    fn create(&self, api_key: &str) -> Arc<dyn VideoApi> {
        Arc::new(YouTubeDataApi {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: api_key.to_owned(),
        })
    }
}
