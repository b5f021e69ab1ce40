//! One-shot "some segments are straight lines" notice.
//!
//! The notice is `Armed` until the first segment falls back, then `Shown`
//! for the rest of the session. Segments resolve in parallel, so the
//! transition is a compare-and-swap: exactly one caller wins it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::traits::NoticeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeState {
    Armed,
    Shown,
}

pub struct NearFallbackNotice {
    shown: AtomicBool,
    persistence: Option<(String, Arc<dyn NoticeStore + Send + Sync>)>,
}

impl std::fmt::Debug for NearFallbackNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearFallbackNotice")
            .field("state", &self.state())
            .field("session_key", &self.persistence.as_ref().map(|(key, _)| key))
            .finish()
    }
}

impl Default for NearFallbackNotice {
    fn default() -> Self {
        Self::new()
    }
}

impl NearFallbackNotice {
    /// A notice that lives only as long as this value.
    pub fn new() -> Self {
        Self {
            shown: AtomicBool::new(false),
            persistence: None,
        }
    }

    /// A notice persisted under `session_key`. Starts `Shown` if the store
    /// already recorded it for this session.
    pub fn with_store(
        session_key: impl Into<String>,
        store: Arc<dyn NoticeStore + Send + Sync>,
    ) -> Self {
        let session_key = session_key.into();
        let shown = store.is_shown(&session_key);
        Self {
            shown: AtomicBool::new(shown),
            persistence: Some((session_key, store)),
        }
    }

    pub fn state(&self) -> NoticeState {
        if self.shown.load(Ordering::Acquire) {
            NoticeState::Shown
        } else {
            NoticeState::Armed
        }
    }

    /// Attempts `Armed -> Shown`. Returns `true` only for the call that
    /// performed the transition.
    pub fn trigger(&self) -> bool {
        let won = self
            .shown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            if let Some((key, store)) = &self.persistence {
                store.mark_shown(key);
            }
            info!("near-fallback notice shown");
        }
        won
    }
}

/// In-process [`NoticeStore`], keyed by session.
#[derive(Debug, Default)]
pub struct MemoryNoticeStore {
    shown: Mutex<HashSet<String>>,
}

impl MemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoticeStore for MemoryNoticeStore {
    fn is_shown(&self, session_key: &str) -> bool {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(session_key)
    }

    fn mark_shown(&self, session_key: &str) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_key.to_string());
    }
}
