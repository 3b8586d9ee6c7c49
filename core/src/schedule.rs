use std::time::{Duration, Instant};

/// Clock used by the periodic loops: "sleep until an absolute deadline"
pub trait Scheduler {
    fn now(&self) -> Instant;

    /// Block until `deadline`, returning at once if it already passed
    fn sleep_until(&mut self, deadline: Instant);
}

/// Wall clock scheduler backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        if let Some(delay) = deadline.checked_duration_since(Instant::now()) {
            std::thread::sleep(delay);
        }
    }
}

/// Length of one period at `hz` ticks per second
pub fn period(hz: u32) -> Duration {
    Duration::from_secs(1) / hz.max(1)
}
