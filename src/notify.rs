// notify.rs: tagged messages pushed to the external UI panel

use serde::Serialize;

/// Message for the UI panel, serialized as the wire shape the panel expects:
/// `{"command":"error","message":...}`,
/// `{"command":"setTime","content":{"milliseconds":...}}` or
/// `{"command":"setLyrics","content":{"lyrics":...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Notification {
    Error { message: String },
    SetTime { content: TimeContent },
    SetLyrics { content: LyricsContent },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeContent {
    pub milliseconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricsContent {
    pub lyrics: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
        }
    }

    pub fn set_time(milliseconds: u64) -> Self {
        Notification::SetTime {
            content: TimeContent { milliseconds },
        }
    }

    pub fn set_lyrics(lyrics: impl Into<String>) -> Self {
        Notification::SetLyrics {
            content: LyricsContent {
                lyrics: lyrics.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_wire_shape() {
        let value = serde_json::to_value(Notification::error("boom")).unwrap();
        assert_eq!(value, json!({"command": "error", "message": "boom"}));
    }

    #[test]
    fn set_time_wire_shape() {
        let value = serde_json::to_value(Notification::set_time(61_500)).unwrap();
        assert_eq!(
            value,
            json!({"command": "setTime", "content": {"milliseconds": 61500}})
        );
    }

    #[test]
    fn set_lyrics_wire_shape() {
        let value = serde_json::to_value(Notification::set_lyrics("la la")).unwrap();
        assert_eq!(
            value,
            json!({"command": "setLyrics", "content": {"lyrics": "la la"}})
        );
    }
}
