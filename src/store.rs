// store.rs: persistent key-value state (authorization code + credentials)

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::spotify::types::Credentials;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The two values that survive process restarts: the last captured
/// authorization code and the current credentials.
#[derive(Serialize, Deserialize, Debug, Default)]
struct PersistedState {
    code: Option<String>,
    auth: Option<Credentials>,
}

/// JSON-file-backed store shared by the polling loop and the authorization
/// callback.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    /// Load the store, degrading to an empty one when the file is missing or
    /// unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match Self::read(&path) {
            Ok(state) => state,
            Err(StoreError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                PersistedState::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load state, starting empty");
                PersistedState::default()
            }
        };
        Self { path, state }
    }

    fn read(path: &Path) -> Result<PersistedState, StoreError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.state)?;
        Ok(())
    }

    /// Save, logging instead of propagating; losing the state file degrades
    /// the session the same way a failed load does.
    pub fn save_or_warn(&self) {
        if let Err(err) = self.save() {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to save state");
        }
    }

    pub fn auth(&self) -> Option<Credentials> {
        self.state.auth.clone()
    }

    pub fn code(&self) -> Option<String> {
        self.state.code.clone()
    }

    pub fn set_auth(&mut self, auth: Credentials) {
        self.state.auth = Some(auth);
    }

    pub fn set_code(&mut self, code: &str) {
        self.state.code = Some(code.to_string());
    }

    /// Sign-out: null the credentials, keep the captured code.
    pub fn clear_auth(&mut self) {
        self.state.auth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> StateStore {
        let path = std::env::temp_dir().join(format!(
            "spotlyrics-store-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        StateStore::load(path)
    }

    fn creds() -> Credentials {
        Credentials {
            access_token: Some("tok".to_string()),
            refresh_token: Some("ref".to_string()),
            expires_at: Some(12_345),
            error: None,
        }
    }

    #[test]
    fn round_trips_code_and_auth() {
        let mut store = temp_store("roundtrip");
        store.set_code("abc123");
        store.set_auth(creds());
        store.save().expect("save");

        let reloaded = StateStore::load(&store.path);
        assert_eq!(reloaded.code().as_deref(), Some("abc123"));
        assert_eq!(reloaded.auth(), Some(creds()));
    }

    #[test]
    fn sign_out_clears_auth_but_keeps_code() {
        let mut store = temp_store("signout");
        store.set_code("abc123");
        store.set_auth(creds());
        store.clear_auth();
        store.save().expect("save");

        let reloaded = StateStore::load(&store.path);
        assert!(reloaded.auth().is_none());
        assert_eq!(reloaded.code().as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = temp_store("missing");
        assert!(store.auth().is_none());
        assert!(store.code().is_none());
    }
}
