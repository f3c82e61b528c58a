//! Clock arithmetic on times of day.
//!
//! A timeline never wraps past midnight: `advance` reports a crossing as
//! `None`, `advance_clamped` pins the result to the last second of the day.

use chrono::{Duration, NaiveTime};

pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).expect("valid end of day")
}

pub fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

/// `time + by`, or `None` if that crosses midnight
pub fn advance(time: NaiveTime, by: Duration) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(by);
    (wrapped == 0).then_some(next)
}

pub fn advance_clamped(time: NaiveTime, by: Duration) -> NaiveTime {
    match advance(time, by) {
        Some(next) => next,
        None if by < Duration::zero() => midnight(),
        None => end_of_day(),
    }
}

/// `time - by`, floored at 00:00
pub fn retreat_clamped(time: NaiveTime, by: Duration) -> NaiveTime {
    advance_clamped(time, -by)
}
