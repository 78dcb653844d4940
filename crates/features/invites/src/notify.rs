//! Deadline notification sweep.
//!
//! The configured "minutes before deadline" checkpoints split each
//! invite's time axis into intervals; a pending invite is notified at
//! most once per interval. The interval arithmetic is pure so it can be
//! tested without a clock or a database.

use chrono::{DateTime, Duration, Utc};

/// Checkpoint instants for a deadline, ascending, with the deadline
/// itself as the final fence.
#[must_use]
pub fn build_checkpoints(minutes_before: &[i64], deadline: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut points: Vec<DateTime<Utc>> =
        minutes_before.iter().map(|m| deadline - Duration::minutes(*m)).collect();
    points.push(deadline);
    points.sort_unstable();
    points.dedup();
    points
}

/// Index of the interval `at` falls into, or `None` outside the
/// checkpoint window (before the first checkpoint or past the deadline).
#[must_use]
pub fn interval_index(checkpoints: &[DateTime<Utc>], at: DateTime<Utc>) -> Option<usize> {
    let (Some(first), Some(last)) = (checkpoints.first(), checkpoints.last()) else {
        return None;
    };
    if at < *first || at >= *last {
        return None;
    }
    checkpoints.iter().rposition(|point| at >= *point)
}

/// Whether a notification is due now, given the moment the last one went
/// out. At most one notification per interval.
#[must_use]
pub fn notification_due(
    checkpoints: &[DateTime<Utc>],
    now: DateTime<Utc>,
    last_notified: Option<DateTime<Utc>>,
) -> bool {
    let Some(current) = interval_index(checkpoints, now) else {
        return false;
    };
    match last_notified.and_then(|last| interval_index(checkpoints, last)) {
        Some(previous) => current > previous,
        None => true,
    }
}

/// Whole days between two instants, for the email copy.
#[must_use]
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap()
    }

    fn at(days_before: i64, hours: i64) -> DateTime<Utc> {
        deadline() - Duration::days(days_before) - Duration::hours(hours)
    }

    #[test]
    fn checkpoints_are_sorted_and_fenced() {
        // A day and a week before, deliberately unsorted.
        let points = build_checkpoints(&[1440, 10080], deadline());
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*points.last().unwrap(), deadline());
    }

    #[test]
    fn outside_the_window_nothing_is_due() {
        let points = build_checkpoints(&[1440, 10080], deadline());

        // Long before the first checkpoint.
        assert_eq!(interval_index(&points, at(30, 0)), None);
        // Past the deadline.
        assert_eq!(interval_index(&points, deadline() + Duration::hours(1)), None);
        assert!(!notification_due(&points, at(30, 0), None));
    }

    #[test]
    fn first_contact_in_a_window_is_due() {
        let points = build_checkpoints(&[1440, 10080], deadline());

        // Between the week mark and the day mark.
        assert_eq!(interval_index(&points, at(3, 0)), Some(0));
        assert!(notification_due(&points, at(3, 0), None));

        // Inside the final day.
        assert_eq!(interval_index(&points, at(0, 5)), Some(1));
        assert!(notification_due(&points, at(0, 5), None));
    }

    #[test]
    fn repeated_contact_in_the_same_interval_is_suppressed() {
        let points = build_checkpoints(&[1440, 10080], deadline());

        let earlier = at(4, 0);
        let later = at(2, 0);
        assert!(!notification_due(&points, later, Some(earlier)));
    }

    #[test]
    fn crossing_into_a_later_interval_fires_again() {
        let points = build_checkpoints(&[1440, 10080], deadline());

        let week_window = at(3, 0);
        let day_window = at(0, 6);
        assert!(notification_due(&points, day_window, Some(week_window)));
    }

    #[test]
    fn stale_history_outside_the_window_counts_as_never() {
        let points = build_checkpoints(&[1440], deadline());

        let ancient = at(60, 0);
        assert!(notification_due(&points, at(0, 10), Some(ancient)));
    }

    #[test]
    fn duplicate_checkpoints_collapse() {
        let points = build_checkpoints(&[1440, 1440], deadline());
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn day_difference_for_copy() {
        assert_eq!(days_between(at(3, 0), deadline()), 3);
        assert_eq!(days_between(deadline(), deadline()), 0);
    }
}
