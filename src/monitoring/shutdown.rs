//! Cooperative cancellation for background loops

use crate::utils::error::{Result, WatchError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Owner side of a cancellation signal
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Hand out a receiver that observes [`Shutdown::trigger`]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel every loop holding a signal from this owner
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Long-lived cancellation signal passed to `start`
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested
    ///
    /// If the owner is dropped without triggering, this pends forever.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[derive(Debug, Default)]
enum LifecycleState {
    #[default]
    Idle,
    Running(Shutdown),
    Stopped,
}

/// Start/stop guard for a background component
///
/// Idle -> running -> stopped; a stopped component cannot be started again.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: parking_lot::Mutex<LifecycleState>,
}

impl Lifecycle {
    /// Move to running and return the signal that [`Lifecycle::end`] fires
    pub(crate) fn begin(&self, component: &str) -> Result<ShutdownSignal> {
        let mut state = self.state.lock();
        match *state {
            LifecycleState::Running(_) => Err(WatchError::already_running(format!(
                "{} is already running",
                component
            ))),
            LifecycleState::Stopped => Err(WatchError::terminated(format!(
                "{} has been stopped",
                component
            ))),
            LifecycleState::Idle => {
                let stop = Shutdown::new();
                let signal = stop.signal();
                *state = LifecycleState::Running(stop);
                Ok(signal)
            }
        }
    }

    /// Undo a [`Lifecycle::begin`] whose start-up failed
    pub(crate) fn abort(&self) {
        let mut state = self.state.lock();
        if let LifecycleState::Running(stop) = std::mem::take(&mut *state) {
            stop.trigger();
        }
    }

    /// Stop a running component
    pub(crate) fn end(&self, component: &str) -> Result<()> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, LifecycleState::Stopped) {
            LifecycleState::Running(stop) => {
                stop.trigger();
                Ok(())
            }
            previous => {
                *state = previous;
                Err(WatchError::not_running(format!("{} is not running", component)))
            }
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(*self.state.lock(), LifecycleState::Running(_))
    }
}

/// Wait for Ctrl-C, or SIGTERM on unix
pub async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
        }
    }
}
