//! Voice pulse tracking: rising-edge detection plus time-bounded expiry.

/// Loudness a sample must strictly exceed to trigger a pulse.
pub const PULSE_THRESHOLD: f32 = 0.15;

/// Seconds each pulse stays alive.
pub const PULSE_LIFETIME: f64 = 1.2;

/// Accumulate-and-expire model for the expanding voice rings.
///
/// A pulse is created only on a rising edge: the current sample above the
/// threshold while the previous one was at or below it. A sustained loud
/// sound therefore spawns one pulse, not one per frame. Expiry is the only
/// removal path; creation order just layers the rings visually.
#[derive(Debug, Default)]
pub struct PulseTracker {
    created: Vec<f64>,
    last_level: f32,
}

impl PulseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one loudness sample at frame-clock time `now` (seconds).
    pub fn on_sample(&mut self, level: f32, now: f64) {
        if level > PULSE_THRESHOLD && self.last_level <= PULSE_THRESHOLD {
            self.created.push(now);
        }
        self.last_level = level;
    }

    /// Creation times of pulses still alive at `now`, dropping expired ones.
    pub fn active(&mut self, now: f64) -> &[f64] {
        self.created.retain(|&c| now - c <= PULSE_LIFETIME);
        &self.created
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_triggers_exactly_twice() {
        let mut tracker = PulseTracker::new();
        for (i, level) in [0.0f32, 0.05, 0.2, 0.25, 0.05, 0.3].iter().enumerate() {
            tracker.on_sample(*level, i as f64);
        }
        assert_eq!(tracker.len(), 2);
        // Triggered by the 3rd and 6th samples; the first is past its
        // lifetime at t=5 and only the second survives the expiry pass.
        assert_eq!(tracker.active(5.0), &[5.0]);
    }

    #[test]
    fn sustained_loudness_spawns_one_pulse() {
        let mut tracker = PulseTracker::new();
        for i in 0..100 {
            tracker.on_sample(0.9, i as f64 / 60.0);
        }
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn level_at_threshold_does_not_trigger() {
        let mut tracker = PulseTracker::new();
        tracker.on_sample(PULSE_THRESHOLD, 0.0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn pulse_lives_exactly_for_its_lifetime() {
        let mut tracker = PulseTracker::new();
        tracker.on_sample(0.5, 10.0);
        assert_eq!(tracker.active(10.0).len(), 1);
        assert_eq!(tracker.active(10.0 + PULSE_LIFETIME).len(), 1);
        assert_eq!(tracker.active(10.0 + PULSE_LIFETIME + 0.001).len(), 0);
        // Expired entries are gone, not merely filtered from the view.
        assert!(tracker.is_empty());
    }

    #[test]
    fn concurrent_pulses_expire_independently() {
        let mut tracker = PulseTracker::new();
        tracker.on_sample(0.5, 0.0);
        tracker.on_sample(0.0, 0.1);
        tracker.on_sample(0.5, 0.8);
        assert_eq!(tracker.active(0.9).len(), 2);
        assert_eq!(tracker.active(PULSE_LIFETIME + 0.5), &[0.8]);
        assert_eq!(tracker.active(0.8 + PULSE_LIFETIME + 0.1).len(), 0);
    }
}
