use super::{DropPolicy, LogEvent};

use std::collections::VecDeque;

/// Bounded FIFO of pending log events.
///
/// Overflow behavior depends on the drop policy: `DropOldest` evicts the head
/// to admit the new event, `DropNewest` rejects the incoming event. Either
/// way exactly one event is lost per overflowing push.
pub(crate) struct BoundedQueue {
    queue: VecDeque<LogEvent>,
    capacity: usize,
    policy: DropPolicy,
}

impl BoundedQueue {
    pub(crate) fn new(capacity: usize, policy: DropPolicy) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            policy,
        }
    }

    /// Push an event, returning `true` if an event was dropped.
    pub(crate) fn push(&mut self, event: LogEvent) -> bool {
        if self.queue.len() >= self.capacity {
            match self.policy {
                DropPolicy::DropOldest => {
                    self.queue.pop_front();
                    self.queue.push_back(event);
                }
                DropPolicy::DropNewest => {}
            }
            return true;
        }
        self.queue.push_back(event);
        false
    }

    /// Swap out the entire pending batch, leaving the queue empty.
    pub(crate) fn take_batch(&mut self) -> VecDeque<LogEvent> {
        std::mem::take(&mut self.queue)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
