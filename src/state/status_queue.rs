// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded outbound queue of status tokens.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::types::StatusToken;

/// Default queue capacity.
///
/// Status tokens are tiny and the consumer drains the queue on every pass of
/// its operating loop; a deep backlog only means a flapping link, in which
/// case old tokens are more useful than new ones.
pub const DEFAULT_CAPACITY: usize = 3;

/// Bounded FIFO carrying [`StatusToken`]s from state writes to the command
/// bus client.
///
/// The queue is the boundary between the non-blocking state authority and
/// the blocking network task. Producers may run on any thread or callback
/// context; the single consumer is the session task. All operations are
/// non-blocking and need no external lock.
///
/// Overflow policy is drop-newest: when full, `try_push` rejects the
/// incoming token and keeps the queued ones, so the oldest pending snapshot
/// survives a burst.
///
/// # Examples
///
/// ```
/// use outlet_core::state::StatusQueue;
/// use outlet_core::types::StatusToken;
///
/// let queue = StatusQueue::new();
/// assert!(queue.try_push(StatusToken::from(true)));
/// assert_eq!(queue.try_pop(), Some(StatusToken::from(true)));
/// assert_eq!(queue.try_pop(), None);
/// ```
#[derive(Debug)]
pub struct StatusQueue {
    tokens: Mutex<VecDeque<StatusToken>>,
    capacity: usize,
}

impl StatusQueue {
    /// Creates a queue with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a queue with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self {
            tokens: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Attempts to enqueue a token without blocking.
    ///
    /// Returns `false` when the queue is full; the token is dropped and the
    /// queued ones are kept. The caller owns the overflow diagnostic.
    #[must_use]
    pub fn try_push(&self, token: StatusToken) -> bool {
        let mut tokens = self.tokens.lock();
        if tokens.len() >= self.capacity {
            return false;
        }
        tokens.push_back(token);
        true
    }

    /// Dequeues the oldest token without blocking.
    pub fn try_pop(&self) -> Option<StatusToken> {
        self.tokens.lock().pop_front()
    }

    /// Discards all pending tokens.
    ///
    /// Called once per new broker session, before the first publish, so a
    /// fresh session never replays status recorded against the previous one.
    pub fn reset(&self) {
        self.tokens.lock().clear();
    }

    /// Returns the number of pending tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    /// Returns `true` if no tokens are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StatusQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    #[test]
    fn push_pop_is_fifo() {
        let queue = StatusQueue::new();
        assert!(queue.try_push(StatusToken::from(true)));
        assert!(queue.try_push(StatusToken::from(false)));

        assert_eq!(queue.try_pop(), Some(StatusToken::from(PowerState::On)));
        assert_eq!(queue.try_pop(), Some(StatusToken::from(PowerState::Off)));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn overflow_drops_newest_keeps_oldest() {
        let queue = StatusQueue::with_capacity(3);
        assert!(queue.try_push(StatusToken::from(true)));
        assert!(queue.try_push(StatusToken::from(false)));
        assert!(queue.try_push(StatusToken::from(true)));

        // Full: the incoming token is rejected, nothing already queued is
        // displaced.
        assert!(!queue.try_push(StatusToken::from(false)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some(StatusToken::from(true)));
    }

    #[test]
    fn reset_discards_pending_tokens() {
        let queue = StatusQueue::new();
        let _ = queue.try_push(StatusToken::from(true));
        let _ = queue.try_push(StatusToken::from(false));

        queue.reset();

        assert!(queue.is_empty());
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn capacity_is_fixed() {
        let queue = StatusQueue::new();
        assert_eq!(queue.capacity(), DEFAULT_CAPACITY);

        let custom = StatusQueue::with_capacity(8);
        assert_eq!(custom.capacity(), 8);
    }

    #[test]
    #[should_panic(expected = "queue capacity must be non-zero")]
    fn zero_capacity_rejected() {
        let _ = StatusQueue::with_capacity(0);
    }

    #[test]
    fn safe_from_concurrent_producers() {
        use std::sync::Arc;

        let queue = Arc::new(StatusQueue::with_capacity(64));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for _ in 0..8 {
                        let _ = queue.try_push(StatusToken::from(i % 2 == 0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 64);
    }
}
