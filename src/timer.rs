//! Session timer - elapsed time, rest countdown and exercise stopwatch
//!
//! All three counters advance on one cooperative tick per second and stop
//! together when the session is paused. The flat snapshot is what survives a
//! restart; nothing keeps ticking in the background.

use serde::{Deserialize, Serialize};

/// Rest countdown started after each logged set
pub const DEFAULT_REST_COUNTDOWN_SECS: u32 = 90;

/// What happened on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Session paused or finished, nothing advanced
    Idle,
    Running,
    /// Rest countdown hit zero on this tick
    RestFinished,
}

/// Flat, serializable timer state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub running: bool,
    pub finished: bool,
    pub elapsed_secs: u64,
    pub rest_duration_secs: u32,
    pub rest_remaining_secs: Option<u32>,
    pub exercise_elapsed_secs: Option<u32>,
    pub sets_logged: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    running: bool,
    finished: bool,
    elapsed_secs: u64,
    rest_duration_secs: u32,
    rest_remaining_secs: Option<u32>,
    exercise_elapsed_secs: Option<u32>,
    sets_logged: u32,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REST_COUNTDOWN_SECS)
    }
}

impl SessionTimer {
    /// New stopped timer
    pub fn new(rest_duration_secs: u32) -> Self {
        Self {
            running: false,
            finished: false,
            elapsed_secs: 0,
            rest_duration_secs: rest_duration_secs.max(1),
            rest_remaining_secs: None,
            exercise_elapsed_secs: None,
            sets_logged: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.finished {
            self.running = true;
        }
    }

    /// Suspends all three counters at once
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.start();
    }

    /// Stop for good; the snapshot keeps the final counts
    pub fn finish(&mut self) {
        self.running = false;
        self.finished = true;
        self.rest_remaining_secs = None;
        self.exercise_elapsed_secs = None;
    }

    /// Advance one second
    pub fn tick(&mut self) -> TickEvent {
        if !self.running {
            return TickEvent::Idle;
        }

        self.elapsed_secs += 1;

        if let Some(seconds) = self.exercise_elapsed_secs.as_mut() {
            *seconds += 1;
        }

        match self.rest_remaining_secs {
            Some(remaining) if remaining <= 1 => {
                self.rest_remaining_secs = None;
                TickEvent::RestFinished
            }
            Some(remaining) => {
                self.rest_remaining_secs = Some(remaining - 1);
                TickEvent::Running
            }
            None => TickEvent::Running,
        }
    }

    /// A set was logged: start (or restart) the rest countdown
    pub fn log_set(&mut self) {
        self.sets_logged += 1;
        self.exercise_elapsed_secs = None;
        if !self.finished {
            self.rest_remaining_secs = Some(self.rest_duration_secs);
        }
    }

    /// Leave the resting phase early
    pub fn skip_rest(&mut self) {
        self.rest_remaining_secs = None;
    }

    /// Start the stopwatch for a time-based exercise
    pub fn start_exercise_timer(&mut self) {
        if !self.finished {
            self.exercise_elapsed_secs = Some(0);
        }
    }

    /// Stop the stopwatch, returning the measured duration
    pub fn stop_exercise_timer(&mut self) -> Option<u32> {
        self.exercise_elapsed_secs.take()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_resting(&self) -> bool {
        self.rest_remaining_secs.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn rest_remaining_secs(&self) -> Option<u32> {
        self.rest_remaining_secs
    }

    pub fn exercise_elapsed_secs(&self) -> Option<u32> {
        self.exercise_elapsed_secs
    }

    pub fn sets_logged(&self) -> u32 {
        self.sets_logged
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            running: self.running,
            finished: self.finished,
            elapsed_secs: self.elapsed_secs,
            rest_duration_secs: self.rest_duration_secs,
            rest_remaining_secs: self.rest_remaining_secs,
            exercise_elapsed_secs: self.exercise_elapsed_secs,
            sets_logged: self.sets_logged,
        }
    }

    pub fn from_snapshot(snapshot: TimerSnapshot) -> Self {
        Self {
            running: snapshot.running && !snapshot.finished,
            finished: snapshot.finished,
            elapsed_secs: snapshot.elapsed_secs,
            rest_duration_secs: snapshot.rest_duration_secs.max(1),
            rest_remaining_secs: snapshot.rest_remaining_secs.filter(|s| *s > 0),
            exercise_elapsed_secs: snapshot.exercise_elapsed_secs,
            sets_logged: snapshot.sets_logged,
        }
    }
}

/// Format duration in seconds to human-readable string
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
