use std::collections::HashMap;
use std::future::poll_fn;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_util::time::delay_queue::{DelayQueue, Key};

use filedeck_core::models::TransferId;

/// Pending removals of completed transfers, owned by the queue consumer.
pub(crate) struct RemovalSchedule {
    delay: Duration,
    timers: DelayQueue<TransferId>,
    keys: HashMap<TransferId, Key>,
}

impl RemovalSchedule {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            timers: DelayQueue::new(),
            keys: HashMap::new(),
        }
    }

    /// Arms the removal timer for `id`, replacing any timer it already had.
    pub(crate) fn schedule(&mut self, id: TransferId) {
        self.cancel(&id);
        let key = self.timers.insert(id.clone(), self.delay);
        self.keys.insert(id, key);
    }

    pub(crate) fn cancel(&mut self, id: &TransferId) -> bool {
        match self.keys.remove(id) {
            Some(key) => {
                self.timers.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Timers still armed.
    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<TransferId>> {
        match self.timers.poll_expired(cx) {
            Poll::Ready(Some(expired)) => {
                let id = expired.into_inner();
                self.keys.remove(&id);
                Poll::Ready(Some(id))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    /// Waits for the next timer to fire. Resolves to `None` when nothing is armed.
    pub(crate) async fn next_expired(&mut self) -> Option<TransferId> {
        poll_fn(|cx| self.poll_expired(cx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> TransferId {
        TransferId::new(1, 0, name)
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_delay() {
        let mut schedule = RemovalSchedule::new(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();
        schedule.schedule(id("a"));
        assert_eq!(schedule.len(), 1);

        assert_eq!(schedule.next_expired().await, Some(id("a")));
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert!(schedule.is_empty());
        assert!(!schedule.cancel(&id("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms_timer() {
        let mut schedule = RemovalSchedule::new(Duration::from_millis(100));
        schedule.schedule(id("a"));
        schedule.schedule(id("b"));

        assert!(schedule.cancel(&id("a")));
        assert_eq!(schedule.len(), 1);

        assert_eq!(schedule.next_expired().await, Some(id("b")));
        assert!(schedule.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_keeps_one_timer() {
        let mut schedule = RemovalSchedule::new(Duration::from_millis(100));
        schedule.schedule(id("a"));
        schedule.schedule(id("a"));
        assert_eq!(schedule.len(), 1);
    }
}
