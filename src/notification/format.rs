//! Pure text formatting for tick timestamps.
//!
//! All functions take `now` explicitly and never fail: a value the feed
//! reported that does not parse as an instant is echoed back raw rather than
//! propagated as an error.

use chrono::{DateTime, Local, TimeDelta, Utc};

use crate::models::TickValue;

/// Nominal time between galaxy ticks. The estimate is always last tick plus
/// this period; no attempt is made to learn the real cadence from history.
const NOMINAL_TICK_PERIOD_HOURS: i64 = 24;

/// Renders an absolute UTC timestamp as `2025-01-01 00:00:00 UTC`.
fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Renders the same instant in the host's local zone, with the UTC offset
/// since chrono carries no zone names.
fn format_local_instant(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Whole hours and minutes of a non-negative duration, `Xh Ym` or `Ym` when
/// under an hour (floor division).
fn format_hours_minutes(duration: TimeDelta) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats the current tick in UTC and host-local time, with the elapsed
/// wall-clock time since it occurred.
pub fn format_tick_announcement(tick: &TickValue, now: DateTime<Utc>) -> String {
    let Some(instant) = tick.as_instant() else {
        return format!("**Last Galaxy Tick:** {tick}");
    };

    let elapsed = now.signed_duration_since(instant);
    format!(
        "**Last Galaxy Tick:** {}\n**Last Galaxy Tick LOCAL:** {}\n**Time ago:** {} ago",
        format_instant(instant),
        format_local_instant(instant),
        format_hours_minutes(elapsed)
    )
}

/// Formats the estimated next tick: last tick, last tick plus the nominal
/// 24-hour period, and a countdown relative to `now`.
pub fn format_next_tick_estimate(tick: &TickValue, now: DateTime<Utc>) -> String {
    let Some(instant) = tick.as_instant() else {
        return format!("**Last Tick:** {tick}");
    };

    let estimate = instant + TimeDelta::hours(NOMINAL_TICK_PERIOD_HOURS);
    let remaining = estimate.signed_duration_since(now);
    let countdown = if remaining < TimeDelta::zero() {
        format!("overdue by {}", format_hours_minutes(-remaining))
    } else {
        format!("~{}", format_hours_minutes(remaining))
    };

    format!(
        "**Last Tick:** {}\n**Estimated Next Tick:** {}\n**Time Until:** {}\n\n\
         *This is an estimate. Actual tick time may vary.*",
        format_instant(instant),
        format_instant(estimate),
        countdown
    )
}
