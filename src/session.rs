use serde::{Deserialize, Serialize};

use crate::embed::EmbedRef;
use crate::util::coerce_at_least;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_TOTAL_COUNT: u32 = 10;

pub const MIN_MINUTES: u32 = 1;
pub const MIN_COMPLETED: u32 = 0;
pub const MIN_TOTAL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Pomodoro,
    Counter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn flipped(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

/// Everything the study screen shows. Tick registration lives in the timer
/// engine, not here, so this stays plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub video: Option<EmbedRef>,
    pub theatre_mode: bool,
    pub progress_visible: bool,
    pub completed_count: u32,
    pub total_count: u32,
    pub timer_mode: TimerMode,
    pub running: bool,
    pub phase: Phase,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub seconds_remaining: u64,
    pub elapsed_seconds: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            video: None,
            theatre_mode: true,
            progress_visible: true,
            completed_count: 0,
            total_count: DEFAULT_TOTAL_COUNT,
            timer_mode: TimerMode::Pomodoro,
            running: false,
            phase: Phase::Work,
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            seconds_remaining: DEFAULT_WORK_MINUTES as u64 * 60,
            elapsed_seconds: 0,
        }
    }
}

impl SessionState {
    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Seconds shown on the clock for the current mode.
    pub fn display_seconds(&self) -> u64 {
        match self.timer_mode {
            TimerMode::Pomodoro => self.seconds_remaining,
            TimerMode::Counter => self.elapsed_seconds,
        }
    }

    /// Resets the counter belonging to the current mode.
    pub fn reset_counter(&mut self) {
        match self.timer_mode {
            TimerMode::Pomodoro => {
                self.phase = Phase::Work;
                self.seconds_remaining = self.work_minutes as u64 * 60;
            }
            TimerMode::Counter => self.elapsed_seconds = 0,
        }
    }

    /// One second of timer progress. Returns true when the pomodoro phase
    /// flipped on this tick.
    pub fn advance(&mut self) -> bool {
        match self.timer_mode {
            TimerMode::Pomodoro => {
                self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
                if self.seconds_remaining == 0 {
                    self.phase = self.phase.flipped();
                    self.seconds_remaining = self.minutes_for(self.phase) as u64 * 60;
                    return true;
                }
                false
            }
            TimerMode::Counter => {
                self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
                false
            }
        }
    }

    /// Applies a work-minutes field edit. Returns true when the visible
    /// countdown was reloaded.
    pub fn set_work_minutes(&mut self, raw: &str) -> bool {
        self.work_minutes = coerce_at_least(raw, MIN_MINUTES);
        self.reload_if_idle(Phase::Work)
    }

    pub fn set_break_minutes(&mut self, raw: &str) -> bool {
        self.break_minutes = coerce_at_least(raw, MIN_MINUTES);
        self.reload_if_idle(Phase::Break)
    }

    fn reload_if_idle(&mut self, edited: Phase) -> bool {
        if self.running || self.phase != edited {
            return false;
        }
        self.seconds_remaining = self.minutes_for(edited) as u64 * 60;
        true
    }

    pub fn set_completed(&mut self, raw: &str) {
        self.completed_count = coerce_at_least(raw, MIN_COMPLETED);
    }

    pub fn set_total(&mut self, raw: &str) {
        self.total_count = coerce_at_least(raw, MIN_TOTAL);
    }

    /// Unclamped; completing more than the total reads above 100.
    pub fn progress_percent(&self) -> f64 {
        self.completed_count as f64 / self.total_count.max(MIN_TOTAL) as f64 * 100.0
    }

    pub fn progress_label(&self) -> String {
        format!("{}%", self.progress_percent().round() as u64)
    }

    /// Bar fill in [0, 1].
    pub fn progress_ratio(&self) -> f64 {
        (self.progress_percent() / 100.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SessionState::default();
        assert_eq!(s.work_minutes, 25);
        assert_eq!(s.break_minutes, 5);
        assert_eq!(s.total_count, 10);
        assert_eq!(s.timer_mode, TimerMode::Pomodoro);
        assert!(s.theatre_mode);
        assert!(s.progress_visible);
        assert!(!s.running);
        assert_eq!(s.phase, Phase::Work);
        assert_eq!(s.seconds_remaining, 1500);
        assert_eq!(s.video, None);
    }

    #[test]
    fn test_work_phase_flips_on_the_tick_that_reaches_zero() {
        let mut s = SessionState {
            work_minutes: 1,
            seconds_remaining: 60,
            ..Default::default()
        };

        for _ in 0..59 {
            assert!(!s.advance());
        }
        assert_eq!(s.phase, Phase::Work);
        assert_eq!(s.seconds_remaining, 1);

        assert!(s.advance());
        assert_eq!(s.phase, Phase::Break);
        assert_eq!(s.seconds_remaining, 5 * 60);
    }

    #[test]
    fn test_break_phase_flips_back_to_work() {
        let mut s = SessionState {
            phase: Phase::Break,
            seconds_remaining: 1,
            work_minutes: 2,
            ..Default::default()
        };
        assert!(s.advance());
        assert_eq!(s.phase, Phase::Work);
        assert_eq!(s.seconds_remaining, 120);
    }

    #[test]
    fn test_counter_counts_up_and_leaves_countdown_alone() {
        let mut s = SessionState {
            timer_mode: TimerMode::Counter,
            ..Default::default()
        };
        for _ in 0..3700 {
            s.advance();
        }
        assert_eq!(s.elapsed_seconds, 3700);
        assert_eq!(s.display_seconds(), 3700);
        assert_eq!(s.seconds_remaining, 1500);
    }

    #[test]
    fn test_reset_counter_per_mode() {
        let mut s = SessionState {
            phase: Phase::Break,
            seconds_remaining: 10,
            elapsed_seconds: 99,
            ..Default::default()
        };
        s.reset_counter();
        assert_eq!(s.phase, Phase::Work);
        assert_eq!(s.seconds_remaining, 1500);
        assert_eq!(s.elapsed_seconds, 99);

        s.timer_mode = TimerMode::Counter;
        s.reset_counter();
        assert_eq!(s.elapsed_seconds, 0);
    }

    #[test]
    fn test_minutes_edit_reloads_when_idle_and_phase_matches() {
        let mut s = SessionState::default();
        assert!(s.set_work_minutes("50"));
        assert_eq!(s.seconds_remaining, 3000);

        // break is not the current phase
        assert!(!s.set_break_minutes("10"));
        assert_eq!(s.break_minutes, 10);
        assert_eq!(s.seconds_remaining, 3000);
    }

    #[test]
    fn test_minutes_edit_while_running_keeps_countdown() {
        let mut s = SessionState {
            running: true,
            seconds_remaining: 42,
            ..Default::default()
        };
        assert!(!s.set_work_minutes("1"));
        assert_eq!(s.work_minutes, 1);
        assert_eq!(s.seconds_remaining, 42);
    }

    #[test]
    fn test_minutes_are_floored() {
        let mut s = SessionState::default();
        s.set_work_minutes("0");
        assert_eq!(s.work_minutes, 1);
        s.set_break_minutes("abc");
        assert_eq!(s.break_minutes, 1);
        s.set_work_minutes("-20");
        assert_eq!(s.work_minutes, 1);
    }

    #[test]
    fn test_counts_are_floored() {
        let mut s = SessionState::default();
        s.set_total("0");
        assert_eq!(s.total_count, 1);
        s.set_total("");
        assert_eq!(s.total_count, 1);
        s.set_completed("-1");
        assert_eq!(s.completed_count, 0);
        s.set_completed("x");
        assert_eq!(s.completed_count, 0);
    }

    #[test]
    fn test_progress_over_total_is_not_clamped_in_label() {
        let s = SessionState {
            completed_count: 12,
            total_count: 10,
            ..Default::default()
        };
        assert_eq!(s.progress_label(), "120%");
        assert_eq!(s.progress_ratio(), 1.0);
    }

    #[test]
    fn test_progress_rounding() {
        let s = SessionState {
            completed_count: 1,
            total_count: 8,
            ..Default::default()
        };
        assert_eq!(s.progress_label(), "13%");
        assert_eq!(s.progress_ratio(), 0.125);

        let s = SessionState {
            completed_count: 1,
            total_count: 3,
            ..Default::default()
        };
        assert_eq!(s.progress_label(), "33%");
    }

    #[test]
    fn test_progress_never_divides_by_zero() {
        let s = SessionState {
            completed_count: 3,
            total_count: 0,
            ..Default::default()
        };
        assert_eq!(s.progress_label(), "300%");
        assert!(s.progress_percent().is_finite());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Work.to_string(), "Work");
        assert_eq!(TimerMode::Counter.to_string(), "Counter");
    }
}
