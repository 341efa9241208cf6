use std::time::Duration;

use instant::Instant;


pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);


// Schedule for the periodic state refresh. Knows nothing about how ticks are delivered: the
// browser runs a real interval timer and only consults `is_active`, the terminal client calls
// `take_due` on its own tick.
#[derive(Clone, Debug)]
pub struct PollSchedule {
    interval: Duration,
    active: bool,
    last_fired: Option<Instant>,
}

impl PollSchedule {
    pub fn new(interval: Duration) -> Self {
        PollSchedule { interval, active: false, last_fired: None }
    }

    pub fn interval(&self) -> Duration { self.interval }
    pub fn is_active(&self) -> bool { self.active }

    // Returns whether the schedule was inactive before. Starting an active schedule is a no-op,
    // so there is never more than one timer.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.last_fired = Some(now);
        true
    }

    // Returns whether the schedule was active before.
    pub fn stop(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.last_fired = None;
        was_active
    }

    // True if a refresh should be issued now. Advances the schedule when it returns true.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        let due = match self.last_fired {
            Some(t) => now >= t && now.duration_since(t) >= self.interval,
            None => true,
        };
        if due {
            self.last_fired = Some(now);
        }
        due
    }
}
