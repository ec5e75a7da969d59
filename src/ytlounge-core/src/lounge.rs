//! Contract for the external casting client.
//!
//! The Lounge transport (pairing handshake, bind/long-poll session, command
//! wire format) lives in a client library and is not implemented here. This
//! module pins down the surface the integration consumes: pairing,
//! credential restore, connect, a push stream of playback samples, and the
//! transport commands.

use crate::models::{AuthBlob, PlaybackSnapshot, Screen};
use thiserror::Error;
use tokio::sync::watch;

/// Failures surfaced by the casting client.
#[derive(Debug, Error)]
pub enum LoungeError {
    #[error("connection error: {message}")]
    Connection { message: String },
    #[error("auth token error: {message}")]
    Auth { message: String },
    #[error("{message}")]
    Other { message: String },
}

pub type LoungeResult<T> = Result<T, LoungeError>;

/// A casting client bound to (at most) one screen.
///
/// Implementations use interior mutability; all methods take `&self` so a
/// connected handle can be shared between the lifecycle manager and the
/// media player entity.
#[async_trait::async_trait]
pub trait LoungeApi: Send + Sync {
    /// Identity of the paired screen, available after pairing or after
    /// credentials were restored.
    fn screen(&self) -> Option<Screen>;

    /// Exchange a pairing code for credentials. `Ok(false)` means the
    /// screen explicitly refused the code.
    async fn pair(&self, code: u32) -> LoungeResult<bool>;

    /// Open a session with the paired screen. `Ok(false)` means the screen
    /// is unreachable without a transport-level error.
    async fn connect(&self) -> LoungeResult<bool>;

    /// Latest-value handoff of playback samples. The channel holds only the
    /// newest snapshot; slow consumers simply skip intermediate states.
    fn playback_updates(&self) -> watch::Receiver<PlaybackSnapshot>;

    async fn play(&self) -> LoungeResult<()>;
    async fn pause(&self) -> LoungeResult<()>;
    async fn previous(&self) -> LoungeResult<()>;
    async fn next(&self) -> LoungeResult<()>;
    async fn seek_to(&self, position: f64) -> LoungeResult<()>;

    /// Serialize the current credentials for persistence.
    fn serialize_auth(&self) -> LoungeResult<AuthBlob>;

    /// Restore credentials persisted by an earlier [`serialize_auth`] call.
    ///
    /// [`serialize_auth`]: LoungeApi::serialize_auth
    fn restore_auth(&self, auth: &AuthBlob) -> LoungeResult<()>;
}

/// Builds fresh casting clients tagged with a device name.
///
/// The device name is what the TV displays for this remote.
pub trait LoungeConnector: Send + Sync {
    fn create(&self, device_name: &str) -> std::sync::Arc<dyn LoungeApi>;
}
