//! Page age and the outdated check.
//!
//! Ages are whole calendar days. The time of day is dropped on both sides:
//! the page's date is taken in the offset the API reported, `today` is the
//! caller's local date. A page is outdated only when its age is strictly
//! greater than the allowed maximum.

use chrono::{DateTime, FixedOffset, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    UpToDate,
    Outdated,
}

/// Outcome of checking one page against its maximum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub age_days: i64,
    pub max_age: u32,
    pub staleness: Staleness,
}

impl Evaluation {
    pub fn is_outdated(&self) -> bool {
        self.staleness == Staleness::Outdated
    }
}

/// Days between the last change and `today`. Negative if the change is dated
/// after `today`.
pub fn age_days(last_change: &DateTime<FixedOffset>, today: NaiveDate) -> i64 {
    today
        .signed_duration_since(last_change.date_naive())
        .num_days()
}

pub fn evaluate(last_change: &DateTime<FixedOffset>, max_age: u32, today: NaiveDate) -> Evaluation {
    let age_days = age_days(last_change, today);
    let staleness = if age_days > i64::from(max_age) {
        Staleness::Outdated
    } else {
        Staleness::UpToDate
    };
    Evaluation {
        age_days,
        max_age,
        staleness,
    }
}
