//! Poll cadence for attributes that cannot notify
//!
//! `current_time` and `timebase_rate` have no change notification, so
//! the worker samples them on a fixed 100 ms cadence while a target is
//! attached. The scheduler only paces; sampling itself happens inline
//! in the worker loop, so invocations are strictly sequential and a
//! sampler that overruns the interval causes ticks to be skipped, never
//! queued.

use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};

/// Fixed sampling interval for poll-only attributes
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Paces sampling of poll-only attributes
pub struct PollScheduler {
    interval: Interval,
    active: bool,
}

impl PollScheduler {
    /// Create an inactive scheduler; must run inside a Tokio runtime
    pub fn new() -> Self {
        Self {
            interval: make_interval(),
            active: false,
        }
    }

    /// (Re)start: the first tick fires immediately, then every interval
    pub fn start(&mut self) {
        self.interval = make_interval();
        self.active = true;
    }

    /// Stop firing; no tick completes after this returns
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wait for the next tick; callers gate on [`is_active`](Self::is_active)
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn make_interval() -> Interval {
    let mut interval = time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let mut scheduler = PollScheduler::new();
        scheduler.start();

        let began = Instant::now();
        scheduler.tick().await;
        assert_eq!(began.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_fires_immediately_again() {
        let mut scheduler = PollScheduler::new();
        scheduler.start();
        scheduler.tick().await;

        time::sleep(Duration::from_millis(30)).await;
        scheduler.start();

        let began = Instant::now();
        scheduler.tick().await;
        assert_eq!(began.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sampler_skips_ticks_instead_of_queueing() {
        let mut scheduler = PollScheduler::new();
        scheduler.start();

        let duration = Duration::from_secs(1);
        let began = Instant::now();
        let mut invocations: u32 = 0;

        while began.elapsed() < duration {
            scheduler.tick().await;
            invocations += 1;
            // Sampling takes 2.5 intervals
            time::sleep(Duration::from_millis(250)).await;
        }

        // Never more than duration / interval + 1, and skipped ticks
        // must not be made up later.
        assert!(invocations <= 11, "got {} invocations", invocations);
        assert!(invocations >= 3, "got {} invocations", invocations);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_cadence() {
        let mut scheduler = PollScheduler::new();
        scheduler.start();
        scheduler.tick().await;

        for _ in 0..5 {
            let began = Instant::now();
            scheduler.tick().await;
            assert_eq!(began.elapsed(), POLL_INTERVAL);
        }
    }

    #[test]
    fn test_stop_deactivates() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut scheduler = PollScheduler::new();
            scheduler.start();
            assert!(scheduler.is_active());
            scheduler.stop();
            assert!(!scheduler.is_active());
        });
    }
}
