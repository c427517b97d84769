use serde::{Deserialize, Serialize};

/// Error marker attached to a fetch result instead of being raised. Callers
/// inspect the marker before trusting the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: u16, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// OAuth token material plus expiry, persisted across runs.
///
/// If `access_token` is present and `expires_at` lies in the future, the
/// value is usable without any network access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix timestamp in milliseconds.
    pub expires_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Credentials {
    pub fn from_error(code: u16, message: &str) -> Self {
        Self {
            error: Some(ApiError::new(code, message)),
            ..Default::default()
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Snapshot of the player as reported by the playback endpoint. Identity is
/// `track_id`; an unchanged id across two polls means the same track is still
/// playing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub track_id: Option<String>,
    pub is_playing: Option<bool>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub progress_ms: Option<u64>,
    pub error: Option<ApiError>,
}

impl PlaybackState {
    pub fn from_error(code: u16, message: &str) -> Self {
        Self {
            error: Some(ApiError::new(code, message)),
            ..Default::default()
        }
    }
}
