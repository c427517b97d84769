// pool.rs: the polling cycle driving auth, playback, and lyric updates

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

use crate::auth;
use crate::lyrics::LyricsApi;
use crate::notify::Notification;
use crate::spotify::{AuthApi, PlayerApi};
use crate::state::Session;
use crate::store::StateStore;

/// Run one polling cycle: check authorization, refresh credentials if
/// needed, fetch the playback state, push a progress-time update, and fetch
/// lyrics when the track changed since the previous tick.
///
/// Every failure ends the tick early with an error notification; nothing
/// escapes, so the loop retries from scratch on the next tick.
pub async fn tick<A, P, L>(
    session: &mut Session,
    store: &Arc<Mutex<StateStore>>,
    auth_api: &A,
    player_api: &P,
    lyrics_api: &L,
    update_tx: &mpsc::Sender<Notification>,
) where
    A: AuthApi,
    P: PlayerApi,
    L: LyricsApi,
{
    let authorized = store
        .lock()
        .await
        .auth()
        .is_some_and(|auth| auth.has_access_token());
    if !authorized {
        let _ = update_tx
            .send(Notification::error("spotify account isn't authorized yet"))
            .await;
        return;
    }

    let auth = match auth::ensure_valid_token(store, auth_api, update_tx).await {
        Ok(auth) => auth,
        // Already reported on the sink; the next tick retries.
        Err(_) => return,
    };

    let token = auth.access_token.unwrap_or_default();
    let playing = player_api.fetch(&token).await;
    if let Some(err) = &playing.error {
        let _ = update_tx
            .send(Notification::error(err.message.clone()))
            .await;
        return;
    }

    // Progress time goes out on every successful fetch so the panel can show
    // a live-advancing timer even while the track is unchanged.
    let _ = update_tx
        .send(Notification::set_time(playing.progress_ms.unwrap_or(0)))
        .await;

    if session.track_changed(playing.track_id.as_deref()) {
        tracing::debug!(track_id = ?playing.track_id, "track changed, fetching lyrics");
        let lyric = lyrics_api.fetch(&playing).await;
        if let Some(err) = &lyric.error {
            let _ = update_tx
                .send(Notification::error(err.message.clone()))
                .await;
            // Remember the track anyway so one failed lookup is not retried
            // every second.
            session.remember(playing.track_id);
            return;
        }
        let _ = update_tx
            .send(Notification::set_lyrics(lyric.lyrics.unwrap_or_default()))
            .await;
    }

    session.remember(playing.track_id);
}

/// Poll until the shutdown channel fires. The next tick is armed only after
/// the current one finishes, so slow network calls stretch the effective
/// period instead of overlapping.
pub async fn listen<A, P, L>(
    update_tx: mpsc::Sender<Notification>,
    poll_interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
    store: Arc<Mutex<StateStore>>,
    auth_api: A,
    player_api: P,
    lyrics_api: L,
) where
    A: AuthApi,
    P: PlayerApi,
    L: LyricsApi,
{
    let mut session = Session::new();
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(poll_interval) => {
                tick(&mut session, &store, &auth_api, &player_api, &lyrics_api, &update_tx).await;
            }
        }
    }
}
