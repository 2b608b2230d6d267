//! Story expiry sweeper
//!
//! A long-lived task that deletes expired stories (and their views) on a
//! fixed interval. Visibility never depends on it: every story query filters
//! on `expires_at`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::backend::store::{EntityStore, StoreResult};

/// Run one sweep and return how many stories were deleted
pub async fn sweep_once(store: &dyn EntityStore) -> StoreResult<u64> {
    let removed = store.delete_expired_stories(Utc::now()).await?;
    if removed > 0 {
        tracing::info!("Story sweeper removed {} expired stories", removed);
    } else {
        tracing::debug!("Story sweeper tick: nothing expired");
    }
    Ok(removed)
}

/// Spawn the sweeper; abort the returned handle to stop it
pub fn spawn_expiry_sweeper(store: Arc<dyn EntityStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = sweep_once(store.as_ref()).await {
                tracing::error!("Story sweep failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::story::{MediaType, Story};
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stale = Story::new_at(owner, MediaType::Image, "old".into(), Utc::now() - ChronoDuration::hours(25));
        let fresh = Story::new_at(owner, MediaType::Image, "new".into(), Utc::now());
        store.insert_story(&stale).await.unwrap();
        store.insert_story(&fresh).await.unwrap();

        assert_eq!(sweep_once(&store).await.unwrap(), 1);
        assert!(store.get_story(stale.id).await.unwrap().is_none());
        assert!(store.get_story(fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_spawned_sweeper_runs_on_first_tick() {
        let store = Arc::new(MemoryStore::new());
        let stale = Story::new_at(
            Uuid::new_v4(),
            MediaType::Video,
            "old".into(),
            Utc::now() - ChronoDuration::days(2),
        );
        store.insert_story(&stale).await.unwrap();

        let handle = spawn_expiry_sweeper(store.clone(), Duration::from_secs(3600));
        for _ in 0..50 {
            if store.get_story(stale.id).await.unwrap().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(store.get_story(stale.id).await.unwrap().is_none());
    }
}
