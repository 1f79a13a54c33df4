//! Repeating countdown timer for periodic background work.

/// Fires once every `period` seconds of accumulated tick time while running.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: f64,
    remaining: f64,
    running: bool,
}

impl RepeatingTimer {
    /// New stopped timer. `period` is expected to be positive.
    pub fn new(period: f64) -> Self {
        Self {
            period,
            remaining: period,
            running: false,
        }
    }

    /// Start the timer. The first firing happens on the next tick.
    pub fn start(&mut self) {
        self.running = true;
        self.remaining = 0.0;
    }

    /// Stop the timer. No firing is reported until it is started again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Advance by `dt` seconds. Returns true when the timer fires.
    ///
    /// At most one firing is reported per tick; a long tick does not queue
    /// a backlog of firings.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining += self.period;
        if self.remaining <= 0.0 {
            self.remaining = self.period;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_timer_never_fires() {
        let mut timer = RepeatingTimer::new(0.25);
        for _ in 0..100 {
            assert!(!timer.tick(0.1));
        }
    }

    #[test]
    fn test_fires_immediately_then_every_period() {
        let mut timer = RepeatingTimer::new(0.25);
        timer.start();
        assert!(timer.tick(0.1), "first tick after start should fire");
        assert!(!timer.tick(0.1));
        assert!(!timer.tick(0.1));
        // 0.3s since the first firing.
        assert!(timer.tick(0.1));
    }

    #[test]
    fn test_long_tick_fires_once() {
        let mut timer = RepeatingTimer::new(0.25);
        timer.start();
        timer.tick(0.0);
        assert!(timer.tick(10.0));
        assert!(!timer.tick(0.01), "no backlog after a long tick");
    }

    #[test]
    fn test_stop_suppresses_firing() {
        let mut timer = RepeatingTimer::new(0.25);
        timer.start();
        assert!(timer.tick(0.05));
        timer.stop();
        assert!(!timer.is_running());
        for _ in 0..20 {
            assert!(!timer.tick(0.25));
        }
    }
}
