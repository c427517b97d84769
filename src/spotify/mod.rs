//! Spotify Web API module: OAuth provider, playback client, shared types.

pub mod auth;
pub mod player;
pub mod types;

pub use auth::{AuthApi, SpotifyAuth};
pub use player::{PlayerApi, SpotifyPlayer};
pub use types::{ApiError, Credentials, PlaybackState};

use once_cell::sync::Lazy;
use reqwest::Client;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("spotlyrics/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

pub(crate) fn http_client() -> &'static Client {
    &HTTP_CLIENT
}
