//! Periodic close of polls whose end time has passed.

use std::sync::Arc;
use std::time::Duration;

use agora_core::services::PostService;
use agora_infra::IntervalTask;

/// Start the sweep. It runs until the returned guard is dropped.
pub fn spawn_poll_sweeper(posts: Arc<PostService>, period: Duration) -> IntervalTask {
    IntervalTask::spawn("poll-sweep", period, move || {
        let posts = posts.clone();
        async move {
            if let Err(e) = posts.close_expired_polls().await {
                tracing::warn!(error = %e, "Poll sweep failed");
            }
        }
    })
}

#[cfg(all(test, feature = "fixtures"))]
mod tests {
    use super::*;
    use agora_infra::{InMemoryStores, Seed};

    use crate::config::AppConfig;
    use crate::state::AppState;

    #[actix_rt::test]
    async fn sweeper_closes_expired_polls() {
        let seed = Seed::load(chrono::Utc::now()).unwrap();
        let state = AppState::new(InMemoryStores::seeded(seed), &AppConfig::default());

        let sweeper = spawn_poll_sweeper(state.posts.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(sweeper);

        let expired = state.posts.get(8).await.unwrap();
        assert!(!expired.poll().unwrap().active);
        let open = state.posts.get(2).await.unwrap();
        assert!(open.poll().unwrap().active);
    }
}
