// auth.rs: token lifecycle for the polling cycle

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use crate::notify::Notification;
use crate::spotify::auth::{AuthApi, now_ms};
use crate::spotify::types::Credentials;
use crate::store::StateStore;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("refresh token is missing")]
    MissingRefreshToken,
}

/// Return credentials that are usable now, refreshing or minting them when
/// needed.
///
/// Provider failures are reported on the sink but the (possibly error-tagged)
/// credentials are still persisted and returned; callers must inspect the
/// error marker before trusting the token. A missing refresh token is the one
/// local failure that leaves the stored credentials untouched.
pub async fn ensure_valid_token<A: AuthApi>(
    store: &Arc<Mutex<StateStore>>,
    api: &A,
    update_tx: &mpsc::Sender<Notification>,
) -> Result<Credentials, AuthError> {
    ensure_valid_token_at(store, api, update_tx, now_ms()).await
}

pub(crate) async fn ensure_valid_token_at<A: AuthApi>(
    store: &Arc<Mutex<StateStore>>,
    api: &A,
    update_tx: &mpsc::Sender<Notification>,
    now_ms: u64,
) -> Result<Credentials, AuthError> {
    let (auth, code) = {
        let guard = store.lock().await;
        (guard.auth(), guard.code())
    };

    let has_access_token = auth.as_ref().is_some_and(Credentials::has_access_token);
    let expires_at = auth.as_ref().and_then(|a| a.expires_at).unwrap_or(0);

    if has_access_token && now_ms >= expires_at {
        let Some(refresh_token) = auth.as_ref().and_then(|a| a.refresh_token.clone()) else {
            let _ = update_tx
                .send(Notification::error("refresh token is missing"))
                .await;
            return Err(AuthError::MissingRefreshToken);
        };
        let creds = api.refresh(&refresh_token).await;
        report_and_persist(store, update_tx, &creds).await;
        return Ok(creds);
    }

    if !has_access_token {
        let creds = api.exchange_code(code.as_deref().unwrap_or("")).await;
        report_and_persist(store, update_tx, &creds).await;
        return Ok(creds);
    }

    // Still valid: persist unchanged and hand back, no network call.
    let auth = auth.expect("access token present");
    {
        let mut guard = store.lock().await;
        guard.set_auth(auth.clone());
        guard.save_or_warn();
    }
    Ok(auth)
}

/// "Store whatever we got": surface the error marker, if any, then persist
/// the credentials value that was produced.
async fn report_and_persist(
    store: &Arc<Mutex<StateStore>>,
    update_tx: &mpsc::Sender<Notification>,
    creds: &Credentials,
) {
    if let Some(err) = &creds.error {
        let _ = update_tx
            .send(Notification::error(err.message.clone()))
            .await;
    }
    let mut guard = store.lock().await;
    guard.set_auth(creds.clone());
    guard.save_or_warn();
}
