use std::sync::Arc;

use lattice_core::{BrowserError, ExternalBrowser, Homeserver};
use tokio::sync::{oneshot, Mutex};
use url::Url;
use zeroize::Zeroizing;

use crate::sso::SsoError;

/// Drives a single external-browser SSO authentication session.
///
/// At most one session may be in flight; a second
/// [`start`](SsoFlowController::start) while one is active fails with
/// [`SsoError::BadState`] instead of queuing. Completion, cancellation and
/// failure all resolve the pending `start` call, and the controller is back
/// to idle before that call resumes, so starting again after any terminal
/// outcome is always valid.
///
/// There is no internal timeout on the callback wait; releasing a stuck
/// session is the embedding app's job, via [`cancel`](SsoFlowController::cancel).
pub struct SsoFlowController {
    browser: Arc<dyn ExternalBrowser>,
    redirect_url: String,
    pending: Mutex<Option<oneshot::Sender<SsoOutcome>>>,
}

enum SsoOutcome {
    Redirect(Url),
    Cancelled,
    Failed(BrowserError),
}

impl SsoFlowController {
    /// Creates an idle controller. `redirect_url` must match the callback
    /// URL the OS browser integration is configured to intercept.
    pub fn new(browser: Arc<dyn ExternalBrowser>, redirect_url: impl Into<String>) -> Self {
        Self {
            browser,
            redirect_url: redirect_url.into(),
            pending: Mutex::new(None),
        }
    }

    /// Whether a session is currently in flight.
    pub async fn is_active(&self) -> bool {
        self.pending.lock().await.is_some()
    }

    /// Runs one SSO session: opens the homeserver's redirect URL for
    /// `provider_id` in the external browser and suspends until the
    /// intercepted callback, a cancellation, or a browser failure arrives.
    ///
    /// On completion the `loginToken` query parameter is extracted from the
    /// raw callback URL; a callback without one fails with
    /// [`SsoError::MissingToken`].
    pub async fn start(
        &self,
        homeserver: &Homeserver,
        provider_id: &str,
    ) -> Result<Zeroizing<String>, SsoError> {
        let receiver = {
            let mut pending = self.pending.lock().await;
            if pending.is_some() {
                return Err(SsoError::BadState);
            }
            let (sender, receiver) = oneshot::channel();
            *pending = Some(sender);
            receiver
        };

        let url = self.redirect_endpoint(homeserver, provider_id);

        if let Err(err) = self.browser.open(&url).await {
            // Never launched; release the session slot before surfacing.
            self.pending.lock().await.take();
            return Err(err.into());
        }

        // The sender always leaves the slot before an outcome is sent, so
        // the controller is idle again by the time this resumes. A dropped
        // sender without an outcome can only come from a torn-down runtime;
        // treat it as cancellation.
        let outcome = match receiver.await {
            Ok(outcome) => outcome,
            Err(_) => return Err(SsoError::Cancelled),
        };

        match outcome {
            SsoOutcome::Redirect(callback) => {
                extract_login_token(&callback).ok_or(SsoError::MissingToken)
            }
            SsoOutcome::Cancelled => Err(SsoError::Cancelled),
            SsoOutcome::Failed(err) => Err(SsoError::Browser(err)),
        }
    }

    /// Delivers the intercepted callback URL. Invoked by the app's
    /// URL-scheme handler when the OS routes the redirect back. A callback
    /// with no session in flight is logged and dropped.
    pub async fn complete(&self, callback_url: Url) {
        match self.pending.lock().await.take() {
            Some(sender) => {
                let _ = sender.send(SsoOutcome::Redirect(callback_url));
            }
            None => log::debug!("SSO callback received with no session in flight"),
        }
    }

    /// Cancels the in-flight session. Tears down the browser presentation
    /// and only then resolves the pending [`start`](Self::start) with
    /// [`SsoError::Cancelled`], so the teardown has completed from the
    /// caller's perspective. Cancelling with nothing in flight is a no-op.
    pub async fn cancel(&self) {
        let Some(sender) = self.pending.lock().await.take() else {
            return;
        };

        if let Err(err) = self.browser.close().await {
            log::warn!("failed to tear down the browser session: {err}");
        }

        let _ = sender.send(SsoOutcome::Cancelled);
    }

    /// Fails the in-flight session with a browser-side error (user denial,
    /// presentation failure). A failure with no session in flight is
    /// dropped.
    pub async fn fail(&self, error: BrowserError) {
        if let Some(sender) = self.pending.lock().await.take() {
            let _ = sender.send(SsoOutcome::Failed(error));
        }
    }

    fn redirect_endpoint(&self, homeserver: &Homeserver, provider_id: &str) -> Url {
        let mut url = homeserver.endpoint([
            "_matrix",
            "client",
            "v3",
            "login",
            "sso",
            "redirect",
            provider_id,
        ]);
        url.query_pairs_mut()
            .append_pair("redirectUrl", &self.redirect_url);
        url
    }
}

fn extract_login_token(callback: &Url) -> Option<Zeroizing<String>> {
    callback
        .query_pairs()
        .find(|(name, _)| name == "loginToken")
        .map(|(_, value)| Zeroizing::new(value.into_owned()))
}
