use crate::Result;
use std::future::Future;
use tokio::sync::OnceCell;

/// A value built on first use. Concurrent first callers wait on one shared
/// initialization; a failed initialization leaves the slot empty so the next
/// call tries again.
pub struct LazyHandle<T> {
    cell: OnceCell<T>,
}

impl<T> LazyHandle<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T> Default for LazyHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_initialize_once() {
        let handle = Arc::new(LazyHandle::<usize>::new());
        let inits = Arc::new(AtomicUsize::new(0));

        let callers: Vec<_> = (0..16)
            .map(|_| {
                let handle = handle.clone();
                let inits = inits.clone();
                tokio::spawn(async move {
                    *handle
                        .get_or_try_init(|| async {
                            tokio::time::sleep(Duration::from_millis(25)).await;
                            Ok(inits.fetch_add(1, Ordering::SeqCst) + 100)
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        for caller in callers {
            assert_eq!(caller.await.unwrap(), 100);
        }
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_slot_empty() {
        let handle = LazyHandle::<&str>::new();

        let err = handle
            .get_or_try_init(|| async { Err(Error::generation("download interrupted")) })
            .await
            .unwrap_err();
        assert!(!err.is_config());
        assert!(handle.get().is_none());

        let value = handle
            .get_or_try_init(|| async { Ok("ready") })
            .await
            .unwrap();
        assert_eq!(*value, "ready");
    }
}
