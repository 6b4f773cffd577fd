use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub duration: Duration,
}

/// Notice queue with one visible toast at a time. New notices line up behind
/// the current one and are promoted only once its duration has elapsed, so a
/// burst of failures does not flood the screen.
#[derive(Debug, Default)]
pub struct ToastQueue {
    queue: VecDeque<Toast>,
    current: Option<(Toast, Instant)>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_for(message, DEFAULT_DURATION);
    }

    pub fn show_for(&mut self, message: impl Into<String>, duration: Duration) {
        self.queue.push_back(Toast {
            message: message.into(),
            duration,
        });
    }

    /// Advances the queue clock. Returns the message that just became
    /// visible, if the previous toast expired (or nothing was showing) and
    /// another notice is waiting.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if let Some((toast, shown_at)) = &self.current {
            if now.duration_since(*shown_at) < toast.duration {
                return None;
            }
            self.current = None;
        }
        let next = self.queue.pop_front()?;
        let message = next.message.clone();
        self.current = Some((next, now));
        Some(message)
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref().map(|(toast, _)| toast)
    }

    /// Drops the visible toast early; the next one is promoted on the next
    /// poll.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}
