//! Media player entity for a paired screen.
//!
//! Consumes the casting client's push stream of playback samples, keeps the
//! newest one, resolves video metadata through the optional Data API client,
//! and exposes the whole thing through host-facing accessors. Metadata
//! failures never disturb playback reporting.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use ytlounge_core::lounge::LoungeResult;
use ytlounge_core::redact::redact_secrets;
use ytlounge_core::{
    thumbnail_url, DeviceInfo, LoungeApi, MediaPlayerFeatures, MediaPlayerState, PlaybackSnapshot,
    PlaybackState, StateListener, VideoApi, VideoInfo, DOMAIN,
};

/// Map a screen-reported playback state to the host's vocabulary.
///
/// Anything in-flight on the screen side counts as playing; a stopped screen
/// is still reachable, so it reports `On` rather than `Off`.
pub fn map_state(state: PlaybackState) -> MediaPlayerState {
    match state {
        PlaybackState::Playing | PlaybackState::Starting | PlaybackState::Buffering => {
            MediaPlayerState::Playing
        }
        PlaybackState::Paused => MediaPlayerState::Paused,
        PlaybackState::Stopped => MediaPlayerState::On,
        PlaybackState::Advertisement | PlaybackState::Unknown => MediaPlayerState::Off,
    }
}

#[derive(Debug, Default)]
struct EntityState {
    snapshot: PlaybackSnapshot,
    /// When `snapshot` was stored, for position extrapolation by the host.
    updated_at: Option<SystemTime>,
    /// Metadata for `snapshot.video_id`; the two are kept in step.
    video_info: Option<VideoInfo>,
    /// Set once the metadata client's discovery handshake has completed.
    metadata_ready: bool,
}

/// One media player entity per configured screen.
///
/// The entity is shared between the host registry and its own background
/// tasks, so all mutable state sits behind a mutex and every method takes
/// `&self`.
pub struct LoungeMediaPlayer {
    api: Arc<dyn LoungeApi>,
    video_api: Option<Arc<dyn VideoApi>>,
    listener: Arc<dyn StateListener>,
    state: Mutex<EntityState>,
    /// Serializes metadata refreshes so an update and the discovery
    /// catch-up never race into duplicate lookups.
    refresh_gate: tokio::sync::Mutex<()>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for LoungeMediaPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoungeMediaPlayer")
            .field("screen", &self.api.screen())
            .field("has_video_api", &self.video_api.is_some())
            .finish()
    }
}

impl LoungeMediaPlayer {
    /// Create the entity and, when a metadata client is configured, start
    /// its discovery handshake in the background.
    pub fn new(
        api: Arc<dyn LoungeApi>,
        video_api: Option<Arc<dyn VideoApi>>,
        listener: Arc<dyn StateListener>,
    ) -> Arc<Self> {
        let player = Arc::new(Self {
            api,
            video_api,
            listener,
            state: Mutex::new(EntityState::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            subscription: Mutex::new(None),
        });
        player.spawn_metadata_init();
        player
    }

    /// Start consuming playback updates. Called by the host when the entity
    /// is added to its registry; a second call is ignored.
    pub fn added_to_registry(self: &Arc<Self>) {
        let mut subscription = self.subscription.lock().unwrap();
        if subscription.is_some() {
            warn!("playback subscription already running");
            return;
        }
        let mut updates = self.api.playback_updates();
        let player = Arc::clone(self);
        *subscription = Some(tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                player.on_playback_update(snapshot).await;
            }
        }));
    }

    /// Stop consuming playback updates. Safe to call more than once and
    /// before any update has arrived.
    pub fn removed_from_registry(&self) {
        if let Some(handle) = self.subscription.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Process one pushed playback sample: replace the stored snapshot,
    /// bring metadata in line with it, then tell the host to re-read us.
    async fn on_playback_update(&self, snapshot: PlaybackSnapshot) {
        debug!(
            state = ?snapshot.state,
            video_id = snapshot.video_id.as_ref().map(|v| v.as_ref()),
            "playback update"
        );
        {
            let mut state = self.state.lock().unwrap();
            state.snapshot = snapshot;
            state.updated_at = Some(SystemTime::now());
        }
        self.refresh_video_info().await;
        self.listener.state_changed();
    }

    fn spawn_metadata_init(self: &Arc<Self>) {
        let Some(video_api) = self.video_api.clone() else {
            return;
        };
        let player = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = video_api.discover().await {
                warn!(error = %redact_secrets(&e.to_string()), "metadata client discovery failed");
                return;
            }
            let has_video = {
                let mut state = player.state.lock().unwrap();
                state.metadata_ready = true;
                state.snapshot.video_id.is_some()
            };
            // An update may already have arrived while discovery ran; give
            // it the lookup it skipped.
            if has_video {
                player.refresh_video_info().await;
                player.listener.state_changed();
            }
        });
    }

    /// Align cached metadata with the current snapshot's video id.
    ///
    /// Skipped when no metadata client is configured or its discovery has
    /// not finished; a lookup is only issued when the id actually changed.
    async fn refresh_video_info(&self) {
        let Some(video_api) = &self.video_api else {
            return;
        };
        let _gate = self.refresh_gate.lock().await;
        let wanted = {
            let mut state = self.state.lock().unwrap();
            if !state.metadata_ready {
                return;
            }
            match &state.snapshot.video_id {
                Some(id) => {
                    if state.video_info.as_ref().is_some_and(|info| info.id == *id) {
                        return;
                    }
                    id.clone()
                }
                None => {
                    state.video_info = None;
                    return;
                }
            }
        };
        match video_api.video_snippet(&wanted).await {
            Ok(info) => {
                self.state.lock().unwrap().video_info = Some(info);
            }
            Err(e) => {
                warn!(
                    video_id = wanted.as_ref(),
                    error = %redact_secrets(&e.to_string()),
                    "video metadata lookup failed"
                );
                self.state.lock().unwrap().video_info = None;
            }
        }
    }

    pub fn state(&self) -> MediaPlayerState {
        map_state(self.state.lock().unwrap().snapshot.state)
    }

    pub fn media_title(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .video_info
            .as_ref()
            .map(|info| info.title.clone())
    }

    /// Channel name, surfaced where the host shows an artist.
    pub fn media_channel(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .video_info
            .as_ref()
            .map(|info| info.channel_title.clone())
    }

    /// Playback position in whole seconds at the time of the last update.
    pub fn media_position(&self) -> u64 {
        self.state.lock().unwrap().snapshot.current_time as u64
    }

    /// When the position was last reported, for host-side extrapolation.
    pub fn media_position_updated_at(&self) -> Option<SystemTime> {
        self.state.lock().unwrap().updated_at
    }

    pub fn media_duration(&self) -> u64 {
        self.state.lock().unwrap().snapshot.duration as u64
    }

    /// Public thumbnail URL; derived from the video id alone, so it works
    /// without a metadata client.
    pub fn media_image_url(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .snapshot
            .video_id
            .as_ref()
            .map(thumbnail_url)
    }

    pub fn unique_id(&self) -> Option<String> {
        self.api.screen().map(|screen| screen.screen_id)
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.api.screen().map(|screen| DeviceInfo {
            identifiers: vec![(DOMAIN.to_owned(), screen.screen_id)],
            manufacturer: "YouTube".to_owned(),
            name: screen.screen_name,
        })
    }

    pub fn supported_features(&self) -> MediaPlayerFeatures {
        MediaPlayerFeatures::transport()
    }

    pub async fn play(&self) -> LoungeResult<()> {
        self.api.play().await
    }

    pub async fn pause(&self) -> LoungeResult<()> {
        self.api.pause().await
    }

    pub async fn previous_track(&self) -> LoungeResult<()> {
        self.api.previous().await
    }

    pub async fn next_track(&self) -> LoungeResult<()> {
        self.api.next().await
    }

    pub async fn seek(&self, position: f64) -> LoungeResult<()> {
        self.api.seek_to(position).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{watch, Notify};
    use ytlounge_core::lounge::LoungeResult;
    use ytlounge_core::video::VideoApiResult;
    use ytlounge_core::{AuthBlob, NullStateListener, Screen, VideoApiError, VideoId};

    struct MockLounge {
        tx: watch::Sender<PlaybackSnapshot>,
        commands: Mutex<Vec<&'static str>>,
    }

    impl MockLounge {
        fn new() -> Self {
            Self {
                tx: watch::channel(PlaybackSnapshot::default()).0,
                commands: Mutex::new(Vec::new()),
            }
        }

        fn push(&self, snapshot: PlaybackSnapshot) {
            self.tx.send_replace(snapshot);
        }
    }

    #[async_trait::async_trait]
    impl LoungeApi for MockLounge {
        fn screen(&self) -> Option<Screen> {
            Some(Screen {
                screen_id: "screen-1".into(),
                screen_name: "Living Room TV".into(),
            })
        }

        async fn pair(&self, _code: u32) -> LoungeResult<bool> {
            Ok(true)
        }

        async fn connect(&self) -> LoungeResult<bool> {
            Ok(true)
        }

        fn playback_updates(&self) -> watch::Receiver<PlaybackSnapshot> {
            self.tx.subscribe()
        }

        async fn play(&self) -> LoungeResult<()> {
            self.commands.lock().unwrap().push("play");
            Ok(())
        }

        async fn pause(&self) -> LoungeResult<()> {
            self.commands.lock().unwrap().push("pause");
            Ok(())
        }

        async fn previous(&self) -> LoungeResult<()> {
            self.commands.lock().unwrap().push("previous");
            Ok(())
        }

        async fn next(&self) -> LoungeResult<()> {
            self.commands.lock().unwrap().push("next");
            Ok(())
        }

        async fn seek_to(&self, _position: f64) -> LoungeResult<()> {
            self.commands.lock().unwrap().push("seek_to");
            Ok(())
        }

        fn serialize_auth(&self) -> LoungeResult<AuthBlob> {
            Ok(AuthBlob::new("mock-auth"))
        }

        fn restore_auth(&self, _auth: &AuthBlob) -> LoungeResult<()> {
            Ok(())
        }
    }

    struct MockVideoApi {
        lookups: AtomicUsize,
        fail_lookups: AtomicBool,
        /// When set, discovery blocks until the notify fires.
        discovery_gate: Option<Arc<Notify>>,
    }

    impl MockVideoApi {
        fn new() -> Self {
            Self {
                lookups: AtomicUsize::new(0),
                fail_lookups: AtomicBool::new(false),
                discovery_gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                discovery_gate: Some(gate),
                ..Self::new()
            }
        }
    }

    #[async_trait::async_trait]
    impl VideoApi for MockVideoApi {
        async fn discover(&self) -> VideoApiResult<()> {
            if let Some(gate) = &self.discovery_gate {
                gate.notified().await;
            }
            Ok(())
        }

        async fn video_snippet(&self, id: &VideoId) -> VideoApiResult<VideoInfo> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(VideoApiError::Status { code: 500 });
            }
            Ok(VideoInfo {
                id: id.clone(),
                title: format!("Title for {}", id.as_ref()),
                description: "A video".into(),
                channel_title: "Some Channel".into(),
            })
        }
    }

    #[derive(Default)]
    struct CountingListener {
        notifications: AtomicUsize,
    }

    impl StateListener for CountingListener {
        fn state_changed(&self) {
            self.notifications.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn snapshot(state: PlaybackState, video_id: Option<&str>) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state,
            current_time: 0.0,
            duration: 0.0,
            video_id: video_id.map(VideoId::from),
        }
    }

    async fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !condition() {
            if tokio::time::Instant::now() >= deadline {
                panic!("timed out waiting for {what}");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn maps_screen_states_to_host_vocabulary() {
        assert_eq!(map_state(PlaybackState::Playing), MediaPlayerState::Playing);
        assert_eq!(
            map_state(PlaybackState::Starting),
            MediaPlayerState::Playing
        );
        assert_eq!(
            map_state(PlaybackState::Buffering),
            MediaPlayerState::Playing
        );
        assert_eq!(map_state(PlaybackState::Paused), MediaPlayerState::Paused);
        assert_eq!(map_state(PlaybackState::Stopped), MediaPlayerState::On);
        assert_eq!(
            map_state(PlaybackState::Advertisement),
            MediaPlayerState::Off
        );
        assert_eq!(map_state(PlaybackState::Unknown), MediaPlayerState::Off);
    }

    #[tokio::test]
    async fn paused_update_exposes_position_duration_and_artwork() {
        let lounge = Arc::new(MockLounge::new());
        let listener = Arc::new(CountingListener::default());
        let player = LoungeMediaPlayer::new(lounge.clone(), None, listener.clone());
        player.added_to_registry();

        let before = SystemTime::now();
        lounge.push(PlaybackSnapshot {
            state: PlaybackState::Paused,
            current_time: 42.2,
            duration: 300.0,
            video_id: Some(VideoId::new("abc123")),
        });
        wait_for("state change notification", || {
            listener.notifications.load(Ordering::SeqCst) >= 1
        })
        .await;

        assert_eq!(player.state(), MediaPlayerState::Paused);
        assert_eq!(player.media_position(), 42);
        assert_eq!(player.media_duration(), 300);
        assert_eq!(
            player.media_image_url().as_deref(),
            Some("https://img.youtube.com/vi/abc123/0.jpg")
        );
        assert!(player.media_position_updated_at().unwrap() >= before);
        // No metadata client configured, so no title or channel.
        assert!(player.media_title().is_none());
        assert!(player.media_channel().is_none());
    }

    #[tokio::test]
    async fn repeated_video_id_reuses_cached_metadata() {
        let lounge = Arc::new(MockLounge::new());
        let video_api = Arc::new(MockVideoApi::new());
        let listener = Arc::new(CountingListener::default());
        let player =
            LoungeMediaPlayer::new(lounge.clone(), Some(video_api.clone()), listener.clone());
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        wait_for("first metadata lookup", || player.media_title().is_some()).await;

        let seen = listener.notifications.load(Ordering::SeqCst);
        lounge.push(snapshot(PlaybackState::Paused, Some("vid1")));
        wait_for("second update", || {
            listener.notifications.load(Ordering::SeqCst) > seen
        })
        .await;

        assert_eq!(video_api.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(player.media_title().as_deref(), Some("Title for vid1"));
        assert_eq!(player.media_channel().as_deref(), Some("Some Channel"));
    }

    #[tokio::test]
    async fn changed_video_id_triggers_fresh_lookup() {
        let lounge = Arc::new(MockLounge::new());
        let video_api = Arc::new(MockVideoApi::new());
        let player = LoungeMediaPlayer::new(
            lounge.clone(),
            Some(video_api.clone()),
            Arc::new(NullStateListener),
        );
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        wait_for("first lookup", || player.media_title().is_some()).await;

        lounge.push(snapshot(PlaybackState::Playing, Some("vid2")));
        wait_for("second lookup", || {
            player.media_title().as_deref() == Some("Title for vid2")
        })
        .await;

        assert_eq!(video_api.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_metadata_client_means_no_lookups() {
        let lounge = Arc::new(MockLounge::new());
        let listener = Arc::new(CountingListener::default());
        let player = LoungeMediaPlayer::new(lounge.clone(), None, listener.clone());
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        wait_for("update processed", || {
            listener.notifications.load(Ordering::SeqCst) >= 1
        })
        .await;

        assert!(player.media_title().is_none());
        assert_eq!(player.state(), MediaPlayerState::Playing);
    }

    #[tokio::test]
    async fn lookup_deferred_until_discovery_completes() {
        let gate = Arc::new(Notify::new());
        let lounge = Arc::new(MockLounge::new());
        let video_api = Arc::new(MockVideoApi::gated(gate.clone()));
        let listener = Arc::new(CountingListener::default());
        let player =
            LoungeMediaPlayer::new(lounge.clone(), Some(video_api.clone()), listener.clone());
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        wait_for("update processed", || {
            listener.notifications.load(Ordering::SeqCst) >= 1
        })
        .await;
        assert_eq!(video_api.lookups.load(Ordering::SeqCst), 0);
        assert!(player.media_title().is_none());

        // Discovery catches up and issues the lookup the update skipped.
        gate.notify_one();
        wait_for("catch-up lookup", || player.media_title().is_some()).await;
        assert_eq!(video_api.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_metadata_empty() {
        let lounge = Arc::new(MockLounge::new());
        let video_api = Arc::new(MockVideoApi::new());
        video_api.fail_lookups.store(true, Ordering::SeqCst);
        let listener = Arc::new(CountingListener::default());
        let player =
            LoungeMediaPlayer::new(lounge.clone(), Some(video_api.clone()), listener.clone());
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        wait_for("update processed", || {
            listener.notifications.load(Ordering::SeqCst) >= 1
        })
        .await;

        assert_eq!(video_api.lookups.load(Ordering::SeqCst), 1);
        assert!(player.media_title().is_none());
        // Playback reporting is unaffected.
        assert_eq!(player.state(), MediaPlayerState::Playing);
    }

    #[tokio::test]
    async fn removal_is_idempotent_and_safe_before_updates() {
        let lounge = Arc::new(MockLounge::new());
        let listener = Arc::new(CountingListener::default());
        let player = LoungeMediaPlayer::new(lounge.clone(), None, listener.clone());
        player.added_to_registry();
        player.removed_from_registry();
        player.removed_from_registry();

        // Updates after removal are never observed.
        lounge.push(snapshot(PlaybackState::Playing, Some("vid1")));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(listener.notifications.load(Ordering::SeqCst), 0);
        assert_eq!(player.state(), MediaPlayerState::Off);
    }

    #[tokio::test]
    async fn second_registry_add_is_ignored() {
        let lounge = Arc::new(MockLounge::new());
        let listener = Arc::new(CountingListener::default());
        let player = LoungeMediaPlayer::new(lounge.clone(), None, listener.clone());
        player.added_to_registry();
        player.added_to_registry();

        lounge.push(snapshot(PlaybackState::Playing, None));
        wait_for("update processed", || {
            listener.notifications.load(Ordering::SeqCst) >= 1
        })
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        // A single consumer task, so exactly one notification per update.
        assert_eq!(listener.notifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn commands_forward_to_the_client() {
        let lounge = Arc::new(MockLounge::new());
        let player = LoungeMediaPlayer::new(lounge.clone(), None, Arc::new(NullStateListener));

        player.pause().await.unwrap();
        player.play().await.unwrap();
        player.next_track().await.unwrap();
        player.previous_track().await.unwrap();
        player.seek(90.0).await.unwrap();

        assert_eq!(
            *lounge.commands.lock().unwrap(),
            vec!["pause", "play", "next", "previous", "seek_to"]
        );
    }

    #[tokio::test]
    async fn identity_comes_from_the_paired_screen() {
        let lounge = Arc::new(MockLounge::new());
        let player = LoungeMediaPlayer::new(lounge, None, Arc::new(NullStateListener));

        assert_eq!(player.unique_id().as_deref(), Some("screen-1"));
        let info = player.device_info().unwrap();
        assert_eq!(info.manufacturer, "YouTube");
        assert_eq!(info.name, "Living Room TV");
        assert_eq!(
            info.identifiers,
            vec![("youtube_lounge".to_owned(), "screen-1".to_owned())]
        );
        assert!(player.supported_features().seek);
    }
}
