// callback.rs: one-shot local listener for the OAuth redirect

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, mpsc, oneshot};
use warp::Filter;

use crate::auth;
use crate::notify::Notification;
use crate::spotify::auth::SpotifyAuth;
use crate::store::StateStore;

pub const CALLBACK_PORT: u16 = 9878;

/// Static confirmation page returned to the browser once the code arrives.
const CONFIRMATION_PAGE: &str = "<!DOCTYPE html>\n<html>\n  <body>\n    <p>Spotify authorized successfully. You can close this tab.</p>\n  </body>\n</html>\n";

const MISSING_CODE_PAGE: &str = "<!DOCTYPE html>\n<html>\n  <body>\n    <p>No authorization code in the callback.</p>\n  </body>\n</html>\n";

/// Serve `/callback` until the authorization code arrives, store it, and mint
/// the first credentials. The flow completes a single request/response cycle;
/// the server task keeps running idle afterwards for the process lifetime.
pub async fn capture_authorization(
    store: Arc<Mutex<StateStore>>,
    auth_api: SpotifyAuth,
    update_tx: mpsc::Sender<Notification>,
) {
    let (code_tx, code_rx) = oneshot::channel::<String>();
    let code_tx = Arc::new(StdMutex::new(Some(code_tx)));

    let route = warp::path("callback")
        .and(warp::query::<HashMap<String, String>>())
        .map(move |params: HashMap<String, String>| {
            let Some(code) = params.get("code") else {
                return warp::reply::html(MISSING_CODE_PAGE);
            };
            if let Some(tx) = code_tx.lock().expect("callback sender lock").take() {
                let _ = tx.send(code.clone());
            }
            warp::reply::html(CONFIRMATION_PAGE)
        });

    tokio::spawn(warp::serve(route).run(([127, 0, 0, 1], CALLBACK_PORT)));
    tracing::info!(
        "listening for the authorization redirect on http://localhost:{CALLBACK_PORT}/callback"
    );

    let Ok(code) = code_rx.await else {
        return;
    };

    {
        let mut guard = store.lock().await;
        guard.set_code(&code);
        guard.save_or_warn();
    }

    // Mint the first credentials right away; failures surface on the sink.
    let _ = auth::ensure_valid_token(&store, &auth_api, &update_tx).await;
    tracing::info!("spotify account authorized");
}
