//! Wire shapes for the Data API's `videos.list` response.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
}
