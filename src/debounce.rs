//! Cancellable, replace-on-schedule delayed tasks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs only the most recently scheduled task, after `delay` of quiescence.
///
/// Scheduling a new task aborts the one still waiting. Dropping the debouncer
/// aborts whatever is pending, so nothing fires after its owner is gone.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending task with `task`. Must be called inside a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a scheduled task has not finished yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_task_runs() {
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for i in 1..=5 {
            let hits = hits.clone();
            let last = last.clone();
            debouncer.schedule(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        let counter = hits.clone();
        debouncer.schedule(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_task() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let mut debouncer = Debouncer::new(Duration::from_millis(50));
            let counter = hits.clone();
            debouncer.schedule(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
