use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use smokelog_core::{Aggregator, DailyBucket, MonthlyBucket, SmokingRecord};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn record(id: &str, timestamp: DateTime<Utc>) -> SmokingRecord {
    SmokingRecord::with_id(id, timestamp).unwrap()
}

fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn anchor() -> DateTime<Utc> {
    at(2024, 1, 15, 12, 0, 0)
}

fn sample_records() -> Vec<SmokingRecord> {
    vec![
        record("1", at(2024, 1, 15, 10, 0, 0)),
        record("2", at(2024, 1, 15, 14, 0, 0)),
        record("3", at(2024, 1, 14, 10, 0, 0)),
        record("4", at(2024, 1, 10, 10, 0, 0)),
        record("5", at(2023, 12, 15, 10, 0, 0)),
    ]
}

fn daily(date: &str, count: usize) -> DailyBucket {
    DailyBucket {
        date: date.to_string(),
        count,
    }
}

fn monthly(month: &str, count: usize) -> MonthlyBucket {
    MonthlyBucket {
        month: month.to_string(),
        count,
    }
}

#[test]
fn stats_count_today_week_and_month_windows() {
    let aggregator = Aggregator::new(sample_records(), anchor());

    let stats = aggregator.stats();
    assert_eq!(stats.today_count, 2);
    assert_eq!(stats.week_count, 4);
    assert_eq!(stats.month_count, 4);
}

#[test]
fn daily_series_ends_on_today_oldest_first() {
    let aggregator = Aggregator::new(sample_records(), anchor());

    assert_eq!(
        aggregator.daily(3),
        vec![
            daily("2024-01-13", 0),
            daily("2024-01-14", 1),
            daily("2024-01-15", 2),
        ]
    );
}

#[test]
fn monthly_series_spans_year_boundary() {
    let aggregator = Aggregator::new(sample_records(), anchor());

    assert_eq!(
        aggregator.monthly(2),
        vec![monthly("2023-12", 1), monthly("2024-01", 4)]
    );
}

#[test]
fn hourly_uses_calendar_of_now_and_counts_every_record() {
    let utc = Aggregator::new(sample_records(), anchor());
    let hourly = utc.hourly();
    assert_eq!(hourly.len(), 24);
    assert_eq!(hourly[10].count, 4);
    assert_eq!(hourly[14].count, 1);

    let tokyo = Aggregator::new(sample_records(), anchor().with_timezone(&jst()));
    let hourly = tokyo.hourly();
    assert_eq!(hourly.len(), 24);
    assert_eq!(hourly[19].count, 4);
    assert_eq!(hourly[23].count, 1);
    assert_eq!(hourly[0].count, 0);
    assert_eq!(hourly.iter().map(|bucket| bucket.count).sum::<usize>(), 5);
    assert!(hourly
        .iter()
        .enumerate()
        .all(|(index, bucket)| usize::from(bucket.hour) == index));
}

#[test]
fn sample_scenario_matches_in_offset_calendar() {
    let aggregator = Aggregator::new(sample_records(), anchor().with_timezone(&jst()));

    let stats = aggregator.stats();
    assert_eq!(
        (stats.today_count, stats.week_count, stats.month_count),
        (2, 4, 4)
    );
    assert_eq!(
        aggregator.daily(3),
        vec![
            daily("2024-01-13", 0),
            daily("2024-01-14", 1),
            daily("2024-01-15", 2),
        ]
    );
    assert_eq!(
        aggregator.monthly(2),
        vec![monthly("2023-12", 1), monthly("2024-01", 4)]
    );
}

#[test]
fn day_boundaries_follow_the_offset_of_now() {
    // 16:00Z is already the next day at +09:00.
    let late_utc = record("late", at(2024, 1, 14, 16, 0, 0));

    let utc = Aggregator::new(vec![late_utc.clone()], anchor());
    assert_eq!(utc.stats().today_count, 0);
    assert_eq!(utc.daily(2), vec![daily("2024-01-14", 1), daily("2024-01-15", 0)]);

    let tokyo = Aggregator::new(vec![late_utc], anchor().with_timezone(&jst()));
    assert_eq!(tokyo.stats().today_count, 1);
    assert_eq!(
        tokyo.daily(2),
        vec![daily("2024-01-14", 0), daily("2024-01-15", 1)]
    );
}

#[test]
fn rolling_windows_start_at_local_midnight() {
    let records = vec![
        record("week-in", at(2024, 1, 8, 0, 0, 0)),
        record("week-out", at(2024, 1, 7, 23, 59, 59)),
        record("month-in", at(2023, 12, 16, 0, 0, 0)),
        record("month-out", at(2023, 12, 15, 23, 59, 59)),
    ];
    let aggregator = Aggregator::new(records, anchor());

    let stats = aggregator.stats();
    assert_eq!(stats.today_count, 0);
    assert_eq!(stats.week_count, 1);
    assert_eq!(stats.month_count, 3);
}

#[test]
fn future_records_count_in_rolling_windows_but_not_in_series() {
    let records = vec![
        record("now", anchor()),
        record("future", at(2024, 2, 1, 9, 0, 0)),
    ];
    let aggregator = Aggregator::new(records, anchor());

    let stats = aggregator.stats();
    assert_eq!(stats.today_count, 1);
    assert_eq!(stats.week_count, 2);
    assert_eq!(stats.month_count, 2);

    let daily_total: usize = aggregator.daily(7).iter().map(|b| b.count).sum();
    assert_eq!(daily_total, 1);
    let monthly_total: usize = aggregator.monthly(1).iter().map(|b| b.count).sum();
    assert_eq!(monthly_total, 1);
}

#[test]
fn daily_series_is_contiguous_and_sums_records_in_range() {
    let now = at(2024, 3, 1, 6, 0, 0);
    let records = vec![
        record("a", at(2023, 3, 1, 0, 0, 0)),
        record("b", at(2023, 2, 28, 23, 59, 59)),
        record("c", at(2024, 2, 29, 12, 0, 0)),
        record("d", at(2024, 3, 1, 5, 0, 0)),
    ];
    let aggregator = Aggregator::new(records, now);

    // 2023-03-01 ..= 2024-03-01 is 367 days (2024 is a leap year).
    let series = aggregator.daily(367);
    assert_eq!(series.len(), 367);
    assert_eq!(series[0].date, "2023-03-01");
    assert_eq!(series[366].date, "2024-03-01");

    let dates: Vec<NaiveDate> = series
        .iter()
        .map(|bucket| NaiveDate::parse_from_str(&bucket.date, "%Y-%m-%d").unwrap())
        .collect();
    assert!(dates
        .windows(2)
        .all(|pair| pair[0].succ_opt() == Some(pair[1])));

    let total: usize = series.iter().map(|bucket| bucket.count).sum();
    assert_eq!(total, 3);
}

#[test]
fn monthly_series_is_contiguous_across_years() {
    let now = at(2024, 3, 10, 0, 0, 0);
    let records = vec![
        record("jan-2023", at(2023, 1, 20, 0, 0, 0)),
        record("dec-2022", at(2022, 12, 31, 23, 0, 0)),
        record("mar-2024", at(2024, 3, 1, 0, 0, 0)),
    ];
    let aggregator = Aggregator::new(records, now);

    let fourteen = aggregator.monthly(14);
    assert_eq!(fourteen.len(), 14);
    assert_eq!(fourteen[0].month, "2023-02");
    assert_eq!(fourteen[13].month, "2024-03");

    let fifteen = aggregator.monthly(15);
    assert_eq!(fifteen[0], monthly("2023-01", 1));
    assert!(fifteen.iter().any(|bucket| bucket.month == "2023-12"));
    assert!(fifteen.windows(2).all(|pair| pair[0].month < pair[1].month));
    assert_eq!(fifteen.iter().map(|bucket| bucket.count).sum::<usize>(), 2);
}

#[test]
fn monthly_series_from_month_end_has_no_duplicate_keys() {
    let aggregator = Aggregator::new(Vec::new(), at(2024, 3, 31, 12, 0, 0));

    let keys: Vec<String> = aggregator
        .monthly(3)
        .into_iter()
        .map(|bucket| bucket.month)
        .collect();
    assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
}

#[test]
fn repeated_queries_return_identical_results() {
    let aggregator = Aggregator::new(sample_records(), anchor().with_timezone(&jst()));

    assert_eq!(aggregator.stats(), aggregator.stats());
    assert_eq!(aggregator.daily(30), aggregator.daily(30));
    assert_eq!(aggregator.hourly(), aggregator.hourly());
    assert_eq!(aggregator.monthly(12), aggregator.monthly(12));
}

#[test]
fn snapshot_copy_is_independent_of_caller_records() {
    let mut records = sample_records();
    let aggregator = Aggregator::from_slice(&records, anchor());

    records.clear();
    assert_eq!(aggregator.total_count(), 5);
    assert_eq!(aggregator.stats().today_count, 2);
}

#[test]
fn series_serialize_as_label_count_pairs() {
    let aggregator = Aggregator::new(sample_records(), anchor());

    let json = serde_json::to_value(aggregator.daily(1)).unwrap();
    assert_eq!(json, serde_json::json!([{ "date": "2024-01-15", "count": 2 }]));

    let json = serde_json::to_value(aggregator.stats()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "today_count": 2, "week_count": 4, "month_count": 4 })
    );
}
