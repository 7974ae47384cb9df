//! Exclusive logical lock over project mutations.
//!
//! A build holds the lock from manifest generation until the bundler returns;
//! editing operations check it and refuse to run while it is held.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProjectLock {
    held: Arc<AtomicBool>,
}

impl ProjectLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, failing with [`Error::ProjectBusy`] if a build owns it.
    pub fn try_acquire(&self) -> Result<ProjectLockGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ProjectBusy)?;
        Ok(ProjectLockGuard {
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Succeeds when no build is running.
    pub fn ensure_free(&self) -> Result<()> {
        if self.is_held() {
            return Err(Error::ProjectBusy);
        }
        Ok(())
    }
}

/// Releases the lock when dropped.
#[derive(Debug)]
pub struct ProjectLockGuard {
    held: Arc<AtomicBool>,
}

impl Drop for ProjectLockGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
