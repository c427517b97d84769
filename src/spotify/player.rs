//! Minimal playback-state query against the Spotify player endpoint.

use serde::Deserialize;

use crate::spotify::http_client;
use crate::spotify::types::PlaybackState;

const PLAYER_URL: &str = "https://api.spotify.com/v1/me/player";

/// Contract for fetching the current playback state.
pub trait PlayerApi {
    async fn fetch(&self, access_token: &str) -> PlaybackState;
}

#[derive(Debug, Clone, Default)]
pub struct SpotifyPlayer;

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    item: Option<PlayerItem>,
    is_playing: Option<bool>,
    progress_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PlayerItem {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<PlayerArtist>,
    album: Option<PlayerAlbum>,
}

#[derive(Debug, Deserialize)]
struct PlayerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlayerAlbum {
    name: String,
}

impl PlayerApi for SpotifyPlayer {
    async fn fetch(&self, access_token: &str) -> PlaybackState {
        let resp = match http_client()
            .get(PLAYER_URL)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(error = %err, "playback request failed");
                return not_playing();
            }
        };

        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "playback endpoint returned an error status");
            return not_playing();
        }

        // An idle player answers 204 with an empty body, which fails to
        // decode and lands here as well.
        match resp.json::<PlayerResponse>().await {
            Ok(body) => playback_from(body),
            Err(err) => {
                tracing::debug!(error = %err, "playback response could not be decoded");
                not_playing()
            }
        }
    }
}

fn playback_from(resp: PlayerResponse) -> PlaybackState {
    let Some(item) = resp.item else {
        return not_playing();
    };
    let Some(artist) = item.artists.first() else {
        return PlaybackState::from_error(404, "Failed to fetch artist name");
    };
    PlaybackState {
        track_id: item.id,
        is_playing: resp.is_playing,
        artist: Some(artist.name.clone()),
        title: item.name,
        album: item.album.map(|a| a.name),
        progress_ms: resp.progress_ms,
        error: None,
    }
}

fn not_playing() -> PlaybackState {
    PlaybackState::from_error(404, "Spotify not playing any song")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(artists: Vec<&str>) -> PlayerItem {
        PlayerItem {
            id: Some("track-1".to_string()),
            name: Some("Song".to_string()),
            artists: artists
                .into_iter()
                .map(|name| PlayerArtist {
                    name: name.to_string(),
                })
                .collect(),
            album: Some(PlayerAlbum {
                name: "Album".to_string(),
            }),
        }
    }

    #[test]
    fn maps_a_playing_track() {
        let state = playback_from(PlayerResponse {
            item: Some(item(vec!["First", "Second"])),
            is_playing: Some(true),
            progress_ms: Some(42_000),
        });
        assert!(state.error.is_none());
        assert_eq!(state.track_id.as_deref(), Some("track-1"));
        assert_eq!(state.artist.as_deref(), Some("First"));
        assert_eq!(state.title.as_deref(), Some("Song"));
        assert_eq!(state.album.as_deref(), Some("Album"));
        assert_eq!(state.progress_ms, Some(42_000));
    }

    #[test]
    fn zero_artists_is_an_artist_error() {
        let state = playback_from(PlayerResponse {
            item: Some(item(vec![])),
            is_playing: Some(true),
            progress_ms: Some(0),
        });
        let err = state.error.expect("error marker");
        assert_eq!(err.code, 404);
        assert_eq!(err.message, "Failed to fetch artist name");
        assert!(state.track_id.is_none());
    }

    #[test]
    fn missing_item_collapses_to_not_playing() {
        let state = playback_from(PlayerResponse {
            item: None,
            is_playing: None,
            progress_ms: None,
        });
        let err = state.error.expect("error marker");
        assert_eq!(err.code, 404);
        assert_eq!(err.message, "Spotify not playing any song");
    }
}
