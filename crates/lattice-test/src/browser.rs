use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use lattice_core::{BrowserError, ExternalBrowser};
use url::Url;

/// Scripted [`ExternalBrowser`] fake.
///
/// Records every opened URL and counts teardowns; the next launch can be
/// scripted to fail.
#[derive(Debug, Default)]
pub struct ScriptedBrowser {
    opened: Mutex<Vec<Url>>,
    close_calls: AtomicUsize,
    fail_next_launch: Mutex<Option<BrowserError>>,
}

impl ScriptedBrowser {
    /// Creates a browser fake that records and succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` call fail with `error`.
    pub fn fail_next_launch(&self, error: BrowserError) {
        *self.fail_next_launch.lock().expect("lock poisoned") = Some(error);
    }

    /// Every URL opened so far, in order.
    pub fn opened_urls(&self) -> Vec<Url> {
        self.opened.lock().expect("lock poisoned").clone()
    }

    /// How many times `close` has been called.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalBrowser for ScriptedBrowser {
    async fn open(&self, url: &Url) -> Result<(), BrowserError> {
        if let Some(error) = self.fail_next_launch.lock().expect("lock poisoned").take() {
            return Err(error);
        }
        self.opened.lock().expect("lock poisoned").push(url.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
