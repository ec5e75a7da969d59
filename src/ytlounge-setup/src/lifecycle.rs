//! Configuration-entry lifecycle: reconstruct a client from persisted data,
//! bring an entity up, and tear it down again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};
use ytlounge_core::{
    ConfigEntry, ConfigError, EntryId, EntryStore, LoungeApi, LoungeConnector, StateListener,
    VideoApiConnector,
};
use ytlounge_player::LoungeMediaPlayer;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("entry {id} is not set up")]
    NotSetUp { id: String },
}

struct LiveEntry {
    api: Arc<dyn LoungeApi>,
    player: Arc<LoungeMediaPlayer>,
}

/// Owns the live client handles, keyed by entry id.
///
/// Setup is soft-failing on purpose: a screen that is off when the entry
/// loads should not wedge the entry in an error state, it simply gets no
/// entity until the next reload.
pub struct EntryManager {
    lounge_connector: Arc<dyn LoungeConnector>,
    video_connector: Arc<dyn VideoApiConnector>,
    listener: Arc<dyn StateListener>,
    device_name: String,
    live: Mutex<HashMap<EntryId, LiveEntry>>,
}

impl EntryManager {
    pub fn new(
        lounge_connector: Arc<dyn LoungeConnector>,
        video_connector: Arc<dyn VideoApiConnector>,
        listener: Arc<dyn StateListener>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            lounge_connector,
            video_connector,
            listener,
            device_name: device_name.into(),
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Bring an entry up from persisted data. Returns whether an entity was
    /// published; `false` is not an error, the entry stays loaded without
    /// one.
    pub async fn setup_entry(&self, entry: &ConfigEntry) -> bool {
        let api = self.lounge_connector.create(&self.device_name);
        if let Err(e) = api.restore_auth(&entry.data.auth) {
            warn!(
                entry_id = entry.id.as_ref(),
                error = %e,
                "credential restore failed; entry loaded without entity"
            );
            return false;
        }
        match api.connect().await {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    entry_id = entry.id.as_ref(),
                    "screen unreachable; entry loaded without entity"
                );
                return false;
            }
            Err(e) => {
                warn!(
                    entry_id = entry.id.as_ref(),
                    error = %e,
                    "connect failed; entry loaded without entity"
                );
                return false;
            }
        }

        let video_api = entry
            .data
            .google_api_key
            .as_deref()
            .map(|key| self.video_connector.create(key));
        let player = LoungeMediaPlayer::new(api.clone(), video_api, self.listener.clone());
        player.added_to_registry();
        self.live
            .lock()
            .unwrap()
            .insert(entry.id.clone(), LiveEntry { api, player });
        info!(entry_id = entry.id.as_ref(), title = %entry.title, "entry set up");
        true
    }

    /// Bring up every entry persisted in the store, typically at startup.
    /// Returns how many published an entity.
    pub async fn setup_all(&self, store: &EntryStore) -> Result<usize, ConfigError> {
        let mut published = 0;
        for entry in store.load()? {
            if self.setup_entry(&entry).await {
                published += 1;
            }
        }
        Ok(published)
    }

    /// Tear an entry down: stop the entity's subscription and drop the
    /// client handle. Fails only for entries that were never set up.
    pub fn teardown_entry(&self, id: &EntryId) -> Result<(), LifecycleError> {
        let removed = self.live.lock().unwrap().remove(id);
        match removed {
            Some(live) => {
                live.player.removed_from_registry();
                info!(entry_id = id.as_ref(), "entry torn down");
                Ok(())
            }
            None => Err(LifecycleError::NotSetUp {
                id: id.as_ref().to_owned(),
            }),
        }
    }

    /// The live client handle for an entry, when its setup published one.
    pub fn client(&self, id: &EntryId) -> Option<Arc<dyn LoungeApi>> {
        self.live.lock().unwrap().get(id).map(|live| live.api.clone())
    }

    pub fn player(&self, id: &EntryId) -> Option<Arc<LoungeMediaPlayer>> {
        self.live
            .lock()
            .unwrap()
            .get(id)
            .map(|live| live.player.clone())
    }
}
