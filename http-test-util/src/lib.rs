pub mod drain;
#[cfg(feature = "stub-server")]
pub mod stub;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use bytes::Bytes;
use http_body_util::Full;

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Request counter shared between server handlers and the test that owns the server.
#[derive(Clone, Debug, Default)]
pub struct SharedCounter {
    count: Arc<AtomicUsize>,
}

impl SharedCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the counter, returning the value it held before.
    #[inline]
    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel)
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}
