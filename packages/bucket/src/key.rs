//! Bucket keys and labels.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use gitpulse_commit_models::Granularity;

/// Monday of the week containing `date`. A Sunday maps to the Monday six
/// days earlier.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(days_from_monday))
        .unwrap_or(date)
}

/// First calendar day (UTC) of the bucket `date` falls in.
#[must_use]
pub fn bucket_anchor(date: DateTime<Utc>, granularity: Granularity) -> NaiveDate {
    let day = date.date_naive();
    match granularity {
        Granularity::Day => day,
        Granularity::Week => week_start(day),
        Granularity::Month => day.with_day(1).unwrap_or(day),
        Granularity::Year => day.with_ordinal(1).unwrap_or(day),
    }
}

#[must_use]
pub fn bucket_id(anchor: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day | Granularity::Week => anchor.format("%Y-%m-%d").to_string(),
        Granularity::Month => anchor.format("%Y-%m").to_string(),
        Granularity::Year => anchor.format("%Y").to_string(),
    }
}

/// Human readable rendering of a bucket.
///
/// * day: `Monday, January 6, 2025`
/// * week: `Week of Jan 6 - Jan 12, 2025` (year of the week's last day)
/// * month: `January 2025`
/// * year: `2025`
#[must_use]
pub fn bucket_label(anchor: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => anchor.format("%A, %B %-d, %Y").to_string(),
        Granularity::Week => {
            let end = anchor.checked_add_days(Days::new(6)).unwrap_or(anchor);
            format!(
                "Week of {} - {}",
                anchor.format("%b %-d"),
                end.format("%b %-d, %Y")
            )
        }
        Granularity::Month => anchor.format("%B %Y").to_string(),
        Granularity::Year => anchor.format("%Y").to_string(),
    }
}
