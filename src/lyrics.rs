// lyrics.rs: lyric fetching for the currently playing track

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::spotify::http_client;
use crate::spotify::types::{ApiError, PlaybackState};

/// Lyric text for a track, or an error marker describing why none is
/// available. Keyed by the playback state it was fetched for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricsResult {
    pub lyrics: Option<String>,
    pub error: Option<ApiError>,
}

impl LyricsResult {
    fn from_error(code: u16, message: &str) -> Self {
        Self {
            lyrics: None,
            error: Some(ApiError::new(code, message)),
        }
    }
}

/// Contract for fetching lyrics for a track identity.
pub trait LyricsApi {
    async fn fetch(&self, playing: &PlaybackState) -> LyricsResult;
}

/// lrclib.net lookup keyed by artist and title; the album refines matching
/// when present.
#[derive(Debug, Clone, Default)]
pub struct Lrclib;

#[derive(Debug, Deserialize)]
struct LrcLibResponse {
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

impl LyricsApi for Lrclib {
    async fn fetch(&self, playing: &PlaybackState) -> LyricsResult {
        let url = build_lrclib_url(playing);
        let resp = match http_client().get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(error = %err, "lyrics request failed");
                return LyricsResult::from_error(404, "Failed to fetch lyrics");
            }
        };

        if resp.status().as_u16() == 404 {
            return LyricsResult::from_error(404, "Lyrics not found");
        }
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "lyrics endpoint returned an error status");
            return LyricsResult::from_error(404, "Failed to fetch lyrics");
        }

        match resp.json::<LrcLibResponse>().await {
            Ok(body) => lyrics_from(body),
            Err(err) => {
                tracing::debug!(error = %err, "lyrics response could not be decoded");
                LyricsResult::from_error(404, "Failed to fetch lyrics")
            }
        }
    }
}

/// Prefer plain lyrics; fall back to synced lyrics stripped of timestamps.
fn lyrics_from(resp: LrcLibResponse) -> LyricsResult {
    if let Some(plain) = resp.plain_lyrics.filter(|text| !text.trim().is_empty()) {
        return LyricsResult {
            lyrics: Some(plain),
            error: None,
        };
    }
    match resp.synced_lyrics.as_deref().map(strip_synced_timestamps) {
        Some(text) if !text.is_empty() => LyricsResult {
            lyrics: Some(text),
            error: None,
        },
        _ => LyricsResult::from_error(404, "Lyrics not found"),
    }
}

fn build_lrclib_url(playing: &PlaybackState) -> String {
    let artist = playing.artist.as_deref().unwrap_or_default();
    let title = playing.title.as_deref().unwrap_or_default();
    let mut params = vec![
        format!("artist_name={}", urlencoding::encode(artist)),
        format!("track_name={}", urlencoding::encode(title)),
    ];
    if let Some(album) = playing.album.as_deref().filter(|album| !album.is_empty()) {
        params.push(format!("album_name={}", urlencoding::encode(album)));
    }
    format!("https://lrclib.net/api/get?{}", params.join("&"))
}

static SYNCED_LYRICS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,2}):(\d{2})[.](\d{1,2})\]").unwrap());

/// Strip `[MM:SS.CC]` timestamps from synced lyrics, keeping the text lines.
fn strip_synced_timestamps(synced: &str) -> String {
    let re = &SYNCED_LYRICS_RE;
    let mut lines = Vec::new();
    for line in synced.lines() {
        if !re.is_match(line) {
            continue;
        }
        let text = re.replace_all(line, "").trim().to_string();
        if text.is_empty() {
            continue;
        }
        lines.push(text);
    }
    lines.join("\n")
}
