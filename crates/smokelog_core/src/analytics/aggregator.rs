//! Rolling-window counters and calendar-bucketed series over a record
//! snapshot.
//!
//! # Responsibility
//! - Count records in today/7-day/30-day windows anchored at `now`.
//! - Bucket records per local day, per local hour-of-day and per local month.
//!
//! # Invariants
//! - All windows are anchored to the injected `now`; the clock is never read.
//! - The calendar is the timezone carried by `now`. Every query projects
//!   record instants into that same timezone.
//! - A record lands in at most one bucket of a series; out-of-range records
//!   are dropped, never clipped into an edge bucket.
//! - Queries are pure: repeated calls on one instance return equal output.

use crate::model::record::SmokingRecord;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc};
use log::debug;
use serde::Serialize;

const WEEK_WINDOW_DAYS: u64 = 7;
const MONTH_WINDOW_DAYS: u64 = 30;
const HOURS_PER_DAY: usize = 24;

/// Rolling-window counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    /// Records on `now`'s calendar day.
    pub today_count: usize,
    /// Records at or after local midnight seven days before `now`.
    pub week_count: usize,
    /// Records at or after local midnight thirty days before `now`.
    pub month_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// `YYYY-MM-DD` in the aggregator's calendar.
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    /// Hour of day, `0..=23`.
    pub hour: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    /// `YYYY-MM` in the aggregator's calendar.
    pub month: String,
    pub count: usize,
}

/// Immutable snapshot of records plus the reference instant.
///
/// Construct a new instance whenever the underlying store changes; the
/// snapshot never observes later writes.
#[derive(Debug, Clone)]
pub struct Aggregator<Tz: TimeZone> {
    records: Vec<SmokingRecord>,
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> Aggregator<Tz> {
    /// Takes ownership of a record snapshot anchored at `now`.
    pub fn new(records: Vec<SmokingRecord>, now: DateTime<Tz>) -> Self {
        debug!(
            "event=analytics_snapshot module=analytics records={} now={}",
            records.len(),
            now.naive_utc()
        );
        Self { records, now }
    }

    /// Copies a borrowed record slice into a fresh snapshot.
    pub fn from_slice(records: &[SmokingRecord], now: DateTime<Tz>) -> Self {
        Self::new(records.to_vec(), now)
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Counts records in the today, 7-day and 30-day windows.
    ///
    /// `today_count` is calendar-day equality. The week and month windows
    /// start at local midnight N days back and have no upper bound, so
    /// future-dated records are included.
    pub fn stats(&self) -> Stats {
        let today = self.today();
        let week_start = today.checked_sub_days(Days::new(WEEK_WINDOW_DAYS));
        let month_start = today.checked_sub_days(Days::new(MONTH_WINDOW_DAYS));

        let mut stats = Stats::default();
        for date in self.record_dates() {
            if date == today {
                stats.today_count += 1;
            }
            if is_on_or_after(date, week_start) {
                stats.week_count += 1;
            }
            if is_on_or_after(date, month_start) {
                stats.month_count += 1;
            }
        }
        stats
    }

    /// Per-day counts for the `days` calendar days ending on `now`'s day.
    ///
    /// Oldest first, exactly `days` entries. `days == 0` yields an empty
    /// series.
    pub fn daily(&self, days: u16) -> Vec<DailyBucket> {
        if days == 0 {
            return Vec::new();
        }
        let Some(first) = self
            .today()
            .checked_sub_days(Days::new(u64::from(days) - 1))
        else {
            return Vec::new();
        };

        let mut counts = vec![0usize; usize::from(days)];
        for date in self.record_dates() {
            let offset = date.signed_duration_since(first).num_days();
            if let Some(slot) = usize::try_from(offset)
                .ok()
                .and_then(|index| counts.get_mut(index))
            {
                *slot += 1;
            }
        }

        first
            .iter_days()
            .zip(counts)
            .map(|(date, count)| DailyBucket {
                date: day_key(date),
                count,
            })
            .collect()
    }

    /// Counts per local hour-of-day across the whole history.
    ///
    /// Always 24 entries; the counts sum to `total_count()`.
    pub fn hourly(&self) -> Vec<HourlyBucket> {
        let tz = self.now.timezone();
        let mut counts = [0usize; HOURS_PER_DAY];
        for record in &self.records {
            let hour = record.timestamp.with_timezone(&tz).hour() as usize;
            counts[hour] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(hour, count)| HourlyBucket {
                hour: hour as u8,
                count,
            })
            .collect()
    }

    /// Per-month counts for the `months` calendar months ending on `now`'s
    /// month.
    ///
    /// Oldest first, exactly `months` entries, rolling over year
    /// boundaries. `months == 0` yields an empty series.
    pub fn monthly(&self, months: u16) -> Vec<MonthlyBucket> {
        let months = i64::from(months);
        let first = month_index(self.today()) - months + 1;

        let mut counts = vec![0usize; months as usize];
        for date in self.record_dates() {
            let offset = month_index(date) - first;
            if let Some(slot) = usize::try_from(offset)
                .ok()
                .and_then(|index| counts.get_mut(index))
            {
                *slot += 1;
            }
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(offset, count)| MonthlyBucket {
                month: month_key(first + offset as i64),
                count,
            })
            .collect()
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn record_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let tz = self.now.timezone();
        self.records
            .iter()
            .map(move |record| local_date(&record.timestamp, &tz))
    }
}

impl Aggregator<Utc> {
    /// Convenience constructor for UTC-anchored analytics.
    pub fn utc(records: Vec<SmokingRecord>, now: DateTime<Utc>) -> Self {
        Self::new(records, now)
    }
}

fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

fn is_on_or_after(date: NaiveDate, start: Option<NaiveDate>) -> bool {
    // A window starting before the calendar's minimum date covers everything.
    start.map_or(true, |start| date >= start)
}

/// Months since year 0, so consecutive months differ by one.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn month_key(index: i64) -> String {
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::{month_index, month_key, Aggregator};
    use crate::model::record::SmokingRecord;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn month_key_rolls_back_over_year_boundary() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(month_key(month_index(jan)), "2024-01");
        assert_eq!(month_key(month_index(jan) - 1), "2023-12");
        assert_eq!(month_key(month_index(jan) - 13), "2022-12");
    }

    #[test]
    fn empty_snapshot_yields_zero_stats_and_full_length_series() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let aggregator = Aggregator::utc(Vec::<SmokingRecord>::new(), now);

        let stats = aggregator.stats();
        assert_eq!(stats.today_count, 0);
        assert_eq!(stats.week_count, 0);
        assert_eq!(stats.month_count, 0);
        assert_eq!(aggregator.daily(5).len(), 5);
        assert_eq!(aggregator.hourly().len(), 24);
        assert_eq!(aggregator.monthly(3).len(), 3);
    }

    #[test]
    fn zero_length_series_are_empty() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let record = SmokingRecord::with_id("a", now).unwrap();
        let aggregator = Aggregator::utc(vec![record], now);

        assert!(aggregator.daily(0).is_empty());
        assert!(aggregator.monthly(0).is_empty());
    }

    #[test]
    fn daily_crosses_leap_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let aggregator = Aggregator::utc(vec![SmokingRecord::with_id("a", leap).unwrap()], now);

        let daily = aggregator.daily(2);
        assert_eq!(daily[0].date, "2024-02-29");
        assert_eq!(daily[0].count, 1);
        assert_eq!(daily[1].date, "2024-03-01");
        assert_eq!(daily[1].count, 0);
    }
}
