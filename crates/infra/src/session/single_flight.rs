//! Single-flight cached values
//!
//! The slot's async mutex is held across the fetch, so concurrent callers
//! that find the slot empty (or stale) wait for the one fetch in progress and
//! reuse its result. The slot is only written after a fetch succeeds; a
//! cancelled or failed fetch leaves the previous state untouched.

use std::future::Future;

use tokio::sync::Mutex;
use wikibase_domain::Result;

#[derive(Debug)]
pub struct SingleFlight<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self { slot: Mutex::new(None) }
    }
}

impl<T: Clone + PartialEq> SingleFlight<T> {
    /// The cached value, fetching it first if the slot is empty.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = fetch().await?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Replace `stale` with a freshly fetched value.
    ///
    /// If another caller already replaced it, that value is returned and no
    /// fetch happens.
    pub async fn refresh<F, Fut>(&self, stale: &T, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(value) = slot.as_ref() {
            if value != stale {
                return Ok(value.clone());
            }
        }
        let value = fetch().await?;
        *slot = Some(value.clone());
        Ok(value)
    }

    #[cfg(test)]
    pub async fn current(&self) -> Option<T> {
        self.slot.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use wikibase_domain::WikibaseError;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let slot = Arc::new(SingleFlight::<String>::default());
        let fetches = Arc::new(AtomicUsize::new(0));

        let calls = (0..8).map(|_| {
            let slot = slot.clone();
            let fetches = fetches.clone();
            async move {
                slot.get_or_fetch(|| async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok("token+\\".to_string())
                })
                .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref().ok() == Some("token+\\")));
    }

    #[tokio::test]
    async fn refresh_of_already_replaced_value_reuses_it() {
        let slot = SingleFlight::<String>::default();
        slot.get_or_fetch(|| async { Ok("old".to_string()) }).await.unwrap();
        slot.refresh(&"old".to_string(), || async { Ok("new".to_string()) }).await.unwrap();

        let again = slot
            .refresh(&"old".to_string(), || async {
                Err(WikibaseError::Transport("must not fetch".into()))
            })
            .await
            .unwrap();
        assert_eq!(again, "new");
    }

    #[tokio::test]
    async fn failed_fetch_leaves_slot_empty() {
        let slot = SingleFlight::<String>::default();
        let result = slot
            .get_or_fetch(|| async { Err(WikibaseError::Transport("down".into())) })
            .await;
        assert!(result.is_err());
        assert_eq!(slot.current().await, None);
    }

    #[tokio::test]
    async fn cancelled_refresh_keeps_previous_value() {
        let slot = SingleFlight::<String>::default();
        slot.get_or_fetch(|| async { Ok("old".to_string()) }).await.unwrap();

        let stale = "old".to_string();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            slot.refresh(&stale, || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok("never".to_string())
            }),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(slot.current().await.as_deref(), Some("old"));
    }
}
