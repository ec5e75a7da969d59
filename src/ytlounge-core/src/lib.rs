pub mod config;
pub mod entity;
pub mod errors;
pub mod logging;
pub mod lounge;
pub mod models;
pub mod paths;
pub mod redact;
pub mod video;

pub use config::{Config, ConfigError, EntryStore, LogLevel, LoggingConfig, ValidationError};
pub use entity::{DeviceInfo, MediaPlayerFeatures, MediaPlayerState, NullStateListener, StateListener};
pub use errors::FlowError;
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use lounge::{LoungeApi, LoungeConnector, LoungeError};
pub use models::{
    thumbnail_url, AuthBlob, ConfigEntry, EntryData, EntryId, PlaybackSnapshot, PlaybackState,
    Screen, VideoId, VideoInfo,
};
pub use paths::{AppDirs, DirsError};
pub use video::{VideoApi, VideoApiConnector, VideoApiError};

pub const APP_NAME: &str = "ytlounge";
pub const APP_AUTHOR: &str = "YTLounge";
pub const APP_QUALIFIER: &str = "io";

/// Integration domain used for device-registry identifiers.
pub const DOMAIN: &str = "youtube_lounge";

/// Device name advertised to paired screens when no override is configured.
pub const DEFAULT_DEVICE_NAME: &str = "YTLounge Remote";
