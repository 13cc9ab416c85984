use std::sync::Arc;
use tokio::sync::Mutex;

/// Ordered set of checking ids awaiting settlement, shared between invoice
/// creators and the settlement monitor.
#[derive(Clone, Debug, Default)]
pub struct PendingInvoices {
    inner: Arc<Mutex<Vec<String>>>,
}

impl PendingInvoices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was empty or already pending.
    pub async fn register(&self, checking_id: impl Into<String>) -> bool {
        let checking_id = checking_id.into();
        if checking_id.is_empty() {
            return false;
        }
        let mut guard = self.inner.lock().await;
        if guard.iter().any(|id| *id == checking_id) {
            return false;
        }
        guard.push(checking_id);
        true
    }

    pub async fn remove(&self, checking_id: &str) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.iter().position(|id| id == checking_id) {
            Some(pos) => {
                guard.remove(pos);
                true
            }
            None => false,
        }
    }

    pub async fn contains(&self, checking_id: &str) -> bool {
        self.inner.lock().await.iter().any(|id| id == checking_id)
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_keeps_order_and_skips_duplicates() {
        let pending = PendingInvoices::new();
        assert!(pending.register("a").await);
        assert!(pending.register("b").await);
        assert!(!pending.register("a").await);
        assert!(!pending.register("").await);
        assert_eq!(pending.snapshot().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_later_changes() {
        let pending = PendingInvoices::new();
        pending.register("a").await;
        let snapshot = pending.snapshot().await;
        pending.register("b").await;
        assert!(pending.remove("a").await);
        assert!(!pending.remove("a").await);
        assert_eq!(snapshot, vec!["a"]);
        assert_eq!(pending.snapshot().await, vec!["b"]);
    }
}
