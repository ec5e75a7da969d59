use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use youtube_data_provider::YouTubeDataConnector;
use ytlounge_core::{VideoApiConnector, VideoApiError, VideoId};

fn client_for(server: &MockServer) -> std::sync::Arc<dyn ytlounge_core::VideoApi> {
    YouTubeDataConnector::with_base_url(&server.uri())
        .expect("mock server uri should parse")
        .create("test-key")
}

#[tokio::test]
async fn snippet_lookup_parses_the_first_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("part", "snippet"))
        .and(query_param("id", "abc123"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "abc123",
                "snippet": {
                    "title": "A Video",
                    "description": "About things",
                    "channelTitle": "A Channel"
                }
            }]
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let info = api.video_snippet(&VideoId::new("abc123")).await.unwrap();
    assert_eq!(info.id, VideoId::new("abc123"));
    assert_eq!(info.title, "A Video");
    assert_eq!(info.description, "About things");
    assert_eq!(info.channel_title, "A Channel");
}

#[tokio::test]
async fn rejected_key_surfaces_as_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.video_snippet(&VideoId::new("abc123")).await.unwrap_err();
    assert!(matches!(err, VideoApiError::Status { code: 400 }));
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn upstream_failure_is_not_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.video_snippet(&VideoId::new("abc123")).await.unwrap_err();
    assert!(matches!(err, VideoApiError::Status { code: 503 }));
    assert!(!err.is_bad_request());
}

#[tokio::test]
async fn empty_item_list_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.video_snippet(&VideoId::new("gone")).await.unwrap_err();
    assert!(matches!(err, VideoApiError::NotFound { ref id } if id == "gone"));
}

#[tokio::test]
async fn discovery_succeeds_when_the_key_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/youtube/v3/rest"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let api = client_for(&server);
    api.discover().await.unwrap();
}

#[tokio::test]
async fn discovery_propagates_a_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/youtube/v3/rest"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.discover().await.unwrap_err();
    assert!(err.is_bad_request());
}
