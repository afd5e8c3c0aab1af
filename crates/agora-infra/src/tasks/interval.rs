//! Fixed-interval background task bound to a guard value.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest period accepted; anything lower is clamped.
pub const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Runs a task every `period` until dropped.
///
/// The first run happens one full period after spawning. Dropping the guard
/// aborts the task, including a run that is currently in progress.
///
/// # Example
/// ```ignore
/// let _sweeper = IntervalTask::spawn("poll-sweep", Duration::from_secs(30), move || {
///     let posts = posts.clone();
///     async move { posts.close_expired_polls().await.ok(); }
/// });
/// ```
pub struct IntervalTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl IntervalTask {
    /// Spawn on the current tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::trace!(task = name, "Interval task tick");
                task().await;
            }
        });

        tracing::info!(task = name, period_ms = period.as_millis() as u64, "Interval task started");
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::info!(task = self.name, "Interval task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(period: Duration) -> (IntervalTask, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = IntervalTask::spawn("test", period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, runs)
    }

    #[tokio::test]
    async fn runs_repeatedly() {
        let (task, runs) = counting_task(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(task.is_running());
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn does_not_run_immediately() {
        let (_task, runs) = counting_task(Duration::from_secs(60));
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn drop_stops_the_task() {
        let (task, runs) = counting_task(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(70)).await;
        drop(task);

        // Let the abort land before sampling.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_drop = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test]
    async fn period_is_clamped() {
        let (task, _runs) = counting_task(Duration::ZERO);
        assert_eq!(task.name(), "test");
        assert!(task.is_running());
    }
}
