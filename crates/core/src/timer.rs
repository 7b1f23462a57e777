use chrono::{DateTime, Duration, Utc};

/// Countdown for exam mode.
///
/// The timer does not schedule anything itself: the owner calls [`ExamTimer::tick`]
/// once per second and drops the timer to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamTimer {
    started_at: DateTime<Utc>,
    duration: Duration,
}

/// Result of a single timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining: Duration },
    Expired,
}

impl TimerTick {
    /// `mm:ss` text for this tick; `00:00` once expired.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            TimerTick::Running { remaining } => format_remaining(*remaining),
            TimerTick::Expired => format_remaining(Duration::zero()),
        }
    }
}

impl ExamTimer {
    /// Start a countdown of `duration` from `now`.
    #[must_use]
    pub fn start(now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            started_at: now,
            duration,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Deadline, clamped to the latest representable instant.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at
            .checked_add_signed(self.duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Time left at `now`; negative once the deadline has passed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.ends_at().signed_duration_since(now)
    }

    #[must_use]
    pub fn tick(&self, now: DateTime<Utc>) -> TimerTick {
        let remaining = self.remaining(now);
        if remaining <= Duration::zero() {
            TimerTick::Expired
        } else {
            TimerTick::Running { remaining }
        }
    }
}

/// Format a duration as zero-padded `mm:ss`, flooring partial seconds.
///
/// Negative durations render as `00:00`. Minutes are not capped at 59.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn full_duration_renders_thirty_minutes() {
        let timer = ExamTimer::start(fixed_now(), Duration::minutes(30));
        assert_eq!(timer.tick(fixed_now()).display(), "30:00");
    }

    #[test]
    fn display_floors_partial_seconds() {
        let timer = ExamTimer::start(fixed_now(), Duration::minutes(30));
        let now = fixed_now() + Duration::milliseconds(1_500);
        // 29:58.5 left
        assert_eq!(timer.tick(now).display(), "29:58");
    }

    #[test]
    fn expires_at_or_after_deadline() {
        let timer = ExamTimer::start(fixed_now(), Duration::seconds(2));
        assert!(matches!(
            timer.tick(fixed_now() + Duration::seconds(1)),
            TimerTick::Running { .. }
        ));
        assert_eq!(timer.tick(fixed_now() + Duration::seconds(2)), TimerTick::Expired);
        assert_eq!(timer.tick(fixed_now() + Duration::seconds(5)), TimerTick::Expired);
        assert_eq!(TimerTick::Expired.display(), "00:00");
    }

    #[test]
    fn oversized_duration_saturates_instead_of_overflowing() {
        let timer = ExamTimer::start(fixed_now(), Duration::MAX);
        assert_eq!(timer.ends_at(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(
            timer.tick(fixed_now() + Duration::seconds(1)),
            TimerTick::Running { .. }
        ));
    }

    #[test]
    fn long_durations_keep_counting_minutes() {
        assert_eq!(format_remaining(Duration::minutes(125) + Duration::seconds(7)), "125:07");
        assert_eq!(format_remaining(Duration::seconds(-3)), "00:00");
    }
}
