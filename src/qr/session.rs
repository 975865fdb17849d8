//! Countdown lifecycle of a displayed QR code.
//!
//! A [`QrSession`] moves through `Loading → Active → Expired` and back to
//! `Active` on [`QrSession::refresh`]. Expiry is measured locally only; the
//! upstream service is never asked whether the code is still accepted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{QrError, QrPayload, QrRenderer, RenderedQr};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrState {
    Loading,
    Active { remaining_secs: u64 },
    Expired,
}

impl QrState {
    fn after(validity_secs: u64) -> Self {
        if validity_secs == 0 {
            QrState::Expired
        } else {
            QrState::Active {
                remaining_secs: validity_secs,
            }
        }
    }
}

/// Formats a countdown as `mm:ss`.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One QR code on display with its expiry countdown.
///
/// Must be started and refreshed from within a Tokio runtime. Dropping the
/// session cancels the countdown task.
///
/// Each refresh starts a new generation. A countdown only publishes while its
/// generation is current, so an aborted task that is still mid-poll cannot
/// overwrite the state of its successor.
#[derive(Debug)]
pub struct QrSession {
    renderer: QrRenderer,
    data: String,
    validity: Duration,
    current: Option<RenderedQr>,
    state: watch::Sender<QrState>,
    generation: Arc<AtomicU64>,
    countdown: Option<JoinHandle<()>>,
}

impl QrSession {
    pub fn new(renderer: QrRenderer, data: impl Into<String>, validity: Duration) -> Self {
        let (state, _) = watch::channel(QrState::Loading);
        Self {
            renderer,
            data: data.into(),
            validity,
            current: None,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            countdown: None,
        }
    }

    /// Creates the session and renders the first code.
    pub fn start(
        renderer: QrRenderer,
        data: impl Into<String>,
        validity: Duration,
    ) -> Result<Self, QrError> {
        let mut session = Self::new(renderer, data, validity);
        session.refresh()?;
        Ok(session)
    }

    /// Regenerates the code with a new timestamp and tag and restarts the
    /// countdown from the full validity window.
    pub fn refresh(&mut self) -> Result<&RenderedQr, QrError> {
        self.cancel_countdown();
        let generation = self.generation.load(Ordering::SeqCst);
        self.state.send_replace(QrState::Loading);

        let rendered = self
            .renderer
            .render(QrPayload::new(self.data.clone(), self.validity))?;
        debug!(tag = %rendered.payload.tag, expires_at = %rendered.payload.expires_at, "Rendered QR code");

        let validity_secs = self.validity.as_secs();
        self.state.send_replace(QrState::after(validity_secs));
        if validity_secs > 0 {
            self.countdown = Some(tokio::spawn(run_countdown(
                self.state.clone(),
                Arc::clone(&self.generation),
                generation,
                validity_secs,
            )));
        }

        Ok(self.current.insert(rendered))
    }

    pub fn current(&self) -> Option<&RenderedQr> {
        self.current.as_ref()
    }

    pub fn state(&self) -> QrState {
        *self.state.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.state() == QrState::Expired
    }

    pub fn subscribe(&self) -> watch::Receiver<QrState> {
        self.state.subscribe()
    }

    fn cancel_countdown(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl Drop for QrSession {
    fn drop(&mut self) {
        self.cancel_countdown();
    }
}

async fn run_countdown(
    state: watch::Sender<QrState>,
    generation: Arc<AtomicU64>,
    issued: u64,
    validity_secs: u64,
) {
    let mut interval = tokio::time::interval(TICK);
    // the first tick completes immediately
    interval.tick().await;

    for remaining_secs in (0..validity_secs).rev() {
        interval.tick().await;
        let next = if remaining_secs == 0 {
            QrState::Expired
        } else {
            QrState::Active { remaining_secs }
        };

        // checked under the channel lock, which refresh also takes to publish
        let published = state.send_if_modified(|current| {
            if generation.load(Ordering::SeqCst) != issued {
                return false;
            }
            *current = next;
            true
        });
        if !published {
            return;
        }
        if next == QrState::Expired {
            debug!("QR code expired");
        }
    }
}
