//! Interactive onboarding: collect an optional metadata API key, then a
//! pairing code, and turn the two into a persisted configuration entry.
//!
//! Validation failures never abort the flow; the offending form is shown
//! again with a stable error key and the user retries.

use std::sync::Arc;

use tracing::warn;
use ytlounge_core::{
    ConfigEntry, EntryData, EntryId, FlowError, LoungeConnector, VideoApiConnector, VideoApiError,
    VideoId,
};

/// Known-good public video used for the trial metadata lookup. Whether the
/// lookup finds it is irrelevant; only the key's acceptance matters.
pub const TRIAL_VIDEO_ID: &str = "oa__fLArsFk";

/// Where the flow stands after each submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// Show (or re-show) the API-key form, with an error key from
    /// [`FlowError::base_error`] when the previous attempt failed.
    ApiKeyForm { error: Option<&'static str> },
    /// Show (or re-show) the pairing-code form.
    PairForm { error: Option<&'static str> },
    /// Terminal: the entry is ready to persist.
    Created(ConfigEntry),
}

/// Two-step onboarding flow for one screen.
pub struct PairingFlow {
    lounge_connector: Arc<dyn LoungeConnector>,
    video_connector: Arc<dyn VideoApiConnector>,
    device_name: String,
    /// Validated API key captured by the first step.
    api_key: Option<String>,
}

impl PairingFlow {
    pub fn new(
        lounge_connector: Arc<dyn LoungeConnector>,
        video_connector: Arc<dyn VideoApiConnector>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            lounge_connector,
            video_connector,
            device_name: device_name.into(),
            api_key: None,
        }
    }

    pub fn start(&self) -> FlowStep {
        FlowStep::ApiKeyForm { error: None }
    }

    /// First step. An empty submission is fine, metadata lookups are
    /// optional; a non-empty key must survive a trial lookup before the
    /// flow advances.
    pub async fn submit_api_key(&mut self, input: &str) -> FlowStep {
        let key = input.trim();
        if key.is_empty() {
            self.api_key = None;
            return FlowStep::PairForm { error: None };
        }
        match self.validate_api_key(key).await {
            Ok(()) => {
                self.api_key = Some(key.to_owned());
                FlowStep::PairForm { error: None }
            }
            Err(e) => {
                warn!(error = %e, "api key validation failed");
                FlowStep::ApiKeyForm {
                    error: Some(e.base_error()),
                }
            }
        }
    }

    async fn validate_api_key(&self, key: &str) -> Result<(), FlowError> {
        let api = self.video_connector.create(key);
        api.discover().await.map_err(classify_video_error)?;
        match api.video_snippet(&VideoId::new(TRIAL_VIDEO_ID)).await {
            // The key was accepted; a missing video is not its fault.
            Ok(_) | Err(VideoApiError::NotFound { .. }) => Ok(()),
            Err(e) => Err(classify_video_error(e)),
        }
    }

    /// Second step. The code must parse as an integer before any network
    /// round-trip happens; a parse failure is the user's mistake, so it is
    /// reported as `invalid_auth` and never as a connection problem.
    pub async fn submit_pairing_code(&self, input: &str) -> FlowStep {
        let code: u32 = match input.trim().parse() {
            Ok(code) => code,
            Err(_) => {
                return FlowStep::PairForm {
                    error: Some(FlowError::InvalidAuth.base_error()),
                }
            }
        };
        match self.pair(code, input.trim()).await {
            Ok(entry) => FlowStep::Created(entry),
            Err(e) => {
                warn!(error = %e, "pairing failed");
                FlowStep::PairForm {
                    error: Some(e.base_error()),
                }
            }
        }
    }

    async fn pair(&self, code: u32, raw_code: &str) -> Result<ConfigEntry, FlowError> {
        let api = self.lounge_connector.create(&self.device_name);
        match api.pair(code).await {
            Ok(true) => {}
            // The screen saw the code and refused it.
            Ok(false) => return Err(FlowError::InvalidAuth),
            Err(e) => {
                warn!(error = %e, "pairing exchange failed");
                return Err(FlowError::CannotConnect);
            }
        }
        let screen = api.screen().ok_or(FlowError::Unknown)?;
        let auth = api.serialize_auth().map_err(|e| {
            warn!(error = %e, "credential serialization failed after pairing");
            FlowError::Unknown
        })?;
        Ok(ConfigEntry {
            id: EntryId::new(screen.screen_id),
            title: screen.screen_name,
            data: EntryData {
                pairing_code: raw_code.to_owned(),
                google_api_key: self.api_key.clone(),
                auth,
            },
        })
    }
}

fn classify_video_error(error: VideoApiError) -> FlowError {
    if error.is_bad_request() {
        FlowError::InvalidAuth
    } else {
        FlowError::CannotConnect
    }
}
