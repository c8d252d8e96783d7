//! Deadline-based debounce timer.
//!
//! Holds no task or waker; the owner asks for the deadline, sleeps until it
//! and calls [`Debounce::fire`]. Dropping the owner drops the timer.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    /// (Re)start the countdown from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return true once the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rearm_pushes_deadline() {
        let mut timer = Debounce::new(Duration::from_millis(250));
        let start = Instant::now();
        timer.arm(start);

        tokio::time::advance(Duration::from_millis(200)).await;
        timer.arm(Instant::now());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!timer.fire(Instant::now()));

        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(timer.fire(Instant::now()));
        assert!(!timer.fire(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let mut timer = Debounce::new(Duration::from_millis(10));
        timer.arm(Instant::now());
        timer.cancel();
        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(!timer.is_armed());
        assert!(!timer.fire(Instant::now()));
    }
}
