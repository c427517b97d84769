mod auth;
mod callback;
mod lyrics;
mod notify;
mod pool;
mod spotify;
mod state;
mod store;

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

use crate::lyrics::Lrclib;
use crate::spotify::{SpotifyAuth, SpotifyPlayer};
use crate::store::StateStore;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Spotify application client id (falls back to SPOTIFY_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,
    /// Spotify application client secret (falls back to SPOTIFY_CLIENT_SECRET)
    #[arg(long)]
    client_secret: Option<String>,
    /// Path to the persistent state file
    #[arg(long, default_value = "spotlyrics-state.json")]
    state: String,
    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    /// Open the consent page and capture the authorization code
    #[arg(long)]
    authorize: bool,
    /// Clear stored credentials and exit
    #[arg(long)]
    logout: bool,
    /// Enable verbose diagnostics on stderr
    #[arg(long)]
    pub debug_log: bool,
}

fn credentials_from_env_if_empty(cli: &mut Config) {
    if cli.client_id.is_none()
        && let Ok(s) = std::env::var("SPOTIFY_CLIENT_ID")
        && !s.is_empty()
    {
        cli.client_id = Some(s);
    }
    if cli.client_secret.is_none()
        && let Ok(s) = std::env::var("SPOTIFY_CLIENT_SECRET")
        && !s.is_empty()
    {
        cli.client_secret = Some(s);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut cfg = Config::parse();
    credentials_from_env_if_empty(&mut cfg);

    // Logs go to stderr; stdout carries only the panel notifications.
    let default_level = if cfg.debug_log { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(Mutex::new(StateStore::load(&cfg.state)));

    if cfg.logout {
        let mut guard = store.lock().await;
        guard.clear_auth();
        guard.save()?;
        eprintln!("cleared stored credentials");
        return Ok(());
    }

    let auth_api = SpotifyAuth::new(
        cfg.client_id.as_deref().unwrap_or_default(),
        cfg.client_secret.as_deref().unwrap_or_default(),
    );

    let (update_tx, mut update_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    if cfg.authorize {
        let url = auth_api.authorize_url();
        if let Err(err) = webbrowser::open(&url) {
            tracing::warn!(error = %err, "failed to open a browser");
            eprintln!("open this URL to authorize: {url}");
        }
        tokio::spawn(callback::capture_authorization(
            store.clone(),
            auth_api.clone(),
            update_tx.clone(),
        ));
    }

    tokio::spawn(pool::listen(
        update_tx,
        Duration::from_millis(cfg.interval_ms),
        shutdown_rx,
        store,
        auth_api,
        SpotifyPlayer,
        Lrclib,
    ));

    // Pipe each notification to stdout as one JSON line for the panel.
    loop {
        tokio::select! {
            note = update_rx.recv() => {
                match note {
                    Some(note) => println!("{}", serde_json::to_string(&note)?),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = shutdown_tx.send(()).await;
                break;
            }
        }
    }
    Ok(())
}
