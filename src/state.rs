// state.rs: session-scoped state for the polling cycle

/// Mutable session state owned by the polling loop: the previously observed
/// track identity, used for change detection. An explicit object rather than
/// ambient globals, created once per process.
#[derive(Debug, Default)]
pub struct Session {
    prev_track_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `track_id` differs from the previous tick's track identity.
    /// On the first tick nothing has been observed yet, so any track counts
    /// as a change.
    pub fn track_changed(&self, track_id: Option<&str>) -> bool {
        self.prev_track_id.as_deref() != track_id
    }

    /// Update the previous-track memory. Runs at the end of every tick that
    /// saw a playback state, regardless of how the lyrics lookup ended.
    pub fn remember(&mut self, track_id: Option<String>) {
        self.prev_track_id = track_id;
    }
}
