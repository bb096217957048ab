//! Correlating asynchronous outcomes with the request that produced them.
//!
//! A caller that lets the user pick a new file while an earlier extraction
//! is still running issues a token per request and only applies outcomes
//! carrying the latest token. Superseded work is left to finish and its
//! result is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request. Tokens from the same tracker strictly increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// An outcome tagged with the token of the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    pub token: RequestToken,
    pub value: T,
}

impl<T> Tracked<T> {
    pub fn new(token: RequestToken, value: T) -> Self {
        Self { token, value }
    }
}

/// Issues request tokens and remembers the most recent one.
///
/// Shareable across tasks (`&self` methods only).
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued token, if any.
    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Unwrap `tracked` if it belongs to the latest request; `None` if stale.
    pub fn accept<T>(&self, tracked: Tracked<T>) -> Option<T> {
        if self.is_current(tracked.token) {
            Some(tracked.value)
        } else {
            tracing::debug!(
                token = tracked.token.0,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale outcome"
            );
            None
        }
    }
}
