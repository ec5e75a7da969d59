//! Contracts between the media player entity and the host framework.

use serde::{Deserialize, Serialize};

/// Playback states in the host's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaPlayerState {
    Playing,
    Paused,
    /// Idle but reachable: the screen answers yet nothing is queued.
    On,
    Off,
}

/// Capability flags a media player entity advertises to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaPlayerFeatures {
    pub pause: bool,
    pub play: bool,
    pub previous_track: bool,
    pub next_track: bool,
    pub seek: bool,
}

impl MediaPlayerFeatures {
    /// The full transport-control set supported by a Lounge screen.
    pub fn transport() -> Self {
        Self {
            pause: true,
            play: true,
            previous_track: true,
            next_track: true,
            seek: true,
        }
    }
}

/// Device-registry descriptor for a paired screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `(domain, id)` pairs identifying the device across integrations.
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: String,
    pub name: String,
}

/// The host's "entity state changed" notification hook.
///
/// Called after every processed playback update so the host re-reads the
/// entity's accessors. Implementations must be cheap and non-blocking.
pub trait StateListener: Send + Sync {
    fn state_changed(&self);
}

/// Listener used when no host is attached (tests, degraded setups).
#[derive(Debug, Default)]
pub struct NullStateListener;

impl StateListener for NullStateListener {
    fn state_changed(&self) {}
}
