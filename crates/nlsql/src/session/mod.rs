//! The single active database session.
//!
//! [`SessionManager`] owns at most one live connection. Readers take a cheap
//! snapshot (an `Arc` clone of the handle plus its dialect tag) and release
//! the lock before doing any I/O, so a slow query never blocks a reconnect.
//!
//! Replacing the session while a query still runs on the old handle is
//! allowed: the query keeps its `Arc`, but the old pool is closed right after
//! the swap, so that query may fail with a closed-pool error.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::traits::SessionHandle;
use crate::drivers::Connection;
use crate::error::{NlsqlError, Result};

/// Snapshot of the active session.
#[derive(Debug)]
pub struct Session<H = Connection> {
    pub handle: Arc<H>,
    pub dialect: String,
}

impl<H> Clone for Session<H> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            dialect: self.dialect.clone(),
        }
    }
}

/// Holds the active session and serializes its replacement.
pub struct SessionManager<H: SessionHandle = Connection> {
    active: RwLock<Option<Session<H>>>,
}

impl<H: SessionHandle> Default for SessionManager<H> {
    fn default() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }
}

impl<H: SessionHandle> SessionManager<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` the active session.
    ///
    /// The previous handle, if any, is closed exactly once, after the write
    /// lock has been released.
    pub async fn install(&self, handle: H, dialect: impl Into<String>) {
        let session = Session {
            handle: Arc::new(handle),
            dialect: dialect.into(),
        };
        info!("Activating {} session", session.dialect);

        let previous = {
            let mut active = self.active.write().await;
            active.replace(session)
        };

        if let Some(old) = previous {
            debug!("Closing previous {} session", old.dialect);
            old.handle.close().await;
        }
    }

    /// Snapshot of the active session.
    pub async fn current(&self) -> Result<Session<H>> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(NlsqlError::NoActiveSession)
    }

    /// Dialect tag of the active session.
    pub async fn dialect(&self) -> Option<String> {
        self.active.read().await.as_ref().map(|s| s.dialect.clone())
    }

    pub async fn is_active(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Remove and close the active session. A no-op when there is none.
    pub async fn shutdown(&self) {
        let previous = self.active.write().await.take();
        if let Some(old) = previous {
            info!("Closing {} session", old.dialect);
            old.handle.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FakeHandle {
        id: u32,
        closes: Arc<AtomicUsize>,
    }

    impl FakeHandle {
        fn new(id: u32) -> (Self, Arc<AtomicUsize>) {
            let closes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    id,
                    closes: Arc::clone(&closes),
                },
                closes,
            )
        }
    }

    #[async_trait]
    impl SessionHandle for FakeHandle {
        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_current_without_session() {
        let mgr: SessionManager<FakeHandle> = SessionManager::new();
        let err = mgr.current().await.unwrap_err();
        assert!(matches!(err, NlsqlError::NoActiveSession));
        assert_eq!(err.to_string(), "Not connected to database");
        assert!(mgr.dialect().await.is_none());
    }

    #[tokio::test]
    async fn test_install_and_snapshot() {
        let mgr = SessionManager::new();
        let (h, closes) = FakeHandle::new(1);
        mgr.install(h, "postgres").await;

        let s = mgr.current().await.unwrap();
        assert_eq!(s.dialect, "postgres");
        assert_eq!(s.handle.id, 1);
        assert_eq!(mgr.dialect().await.as_deref(), Some("postgres"));
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_replacement_closes_old_handle_once() {
        let mgr = SessionManager::new();
        let (a, a_closes) = FakeHandle::new(1);
        let (b, b_closes) = FakeHandle::new(2);

        mgr.install(a, "postgres").await;
        mgr.install(b, "mysql").await;

        assert_eq!(a_closes.load(Ordering::SeqCst), 1);
        assert_eq!(b_closes.load(Ordering::SeqCst), 0);
        let s = mgr.current().await.unwrap();
        assert_eq!(s.handle.id, 2);
        assert_eq!(s.dialect, "mysql");
    }

    #[tokio::test]
    async fn test_snapshot_outlives_replacement() {
        let mgr = SessionManager::new();
        let (a, _) = FakeHandle::new(1);
        let (b, _) = FakeHandle::new(2);
        mgr.install(a, "postgres").await;

        let old = mgr.current().await.unwrap();
        mgr.install(b, "mysql").await;
        assert_eq!(old.handle.id, 1);
        assert_eq!(old.dialect, "postgres");
    }

    #[tokio::test]
    async fn test_shutdown() {
        let mgr = SessionManager::new();
        let (a, closes) = FakeHandle::new(1);
        mgr.install(a, "postgres").await;

        mgr.shutdown().await;
        mgr.shutdown().await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(!mgr.is_active().await);
    }

    #[tokio::test]
    async fn test_concurrent_readers() {
        let mgr = Arc::new(SessionManager::new());
        let (a, _) = FakeHandle::new(7);
        mgr.install(a, "mysql").await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let mgr = Arc::clone(&mgr);
                tokio::spawn(async move { mgr.current().await.map(|s| s.handle.id) })
            })
            .collect();
        for t in tasks {
            assert_eq!(t.await.unwrap().unwrap(), 7);
        }
    }
}
