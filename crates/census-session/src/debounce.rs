//! Cancel-and-restart timer for coalescing bursts of edits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fires once after `window` has passed without another [`trigger`].
///
/// Firing bumps a generation counter; observers compare it with the last
/// generation they handled. Each trigger aborts the pending timer, so only
/// the last one of a burst fires.
///
/// [`trigger`]: Debouncer::trigger
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<watch::Sender<u64>>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            window,
            generation: Arc::new(generation),
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Restart the timer. Must be called within a Tokio runtime.
    pub fn trigger(&mut self) {
        self.cancel();
        let generation = Arc::clone(&self.generation);
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            bump(&generation);
        }));
    }

    /// Fire immediately, dropping any pending timer.
    pub fn fire_now(&mut self) {
        self.cancel();
        bump(&self.generation);
    }

    /// Drop the pending timer without firing.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Number of times the debouncer has fired.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn bump(generation: &watch::Sender<u64>) {
    generation.send_modify(|g| *g = g.wrapping_add(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        for _ in 0..5 {
            debouncer.trigger();
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        assert_eq!(debouncer.generation(), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(debouncer.generation(), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_fire_now() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.trigger();
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(debouncer.generation(), 0);

        debouncer.trigger();
        debouncer.fire_now();
        assert_eq!(debouncer.generation(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(debouncer.generation(), 1);
    }
}
