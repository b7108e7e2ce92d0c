//! Filtering and statistics over a list of readings.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::debug;

use bp_tracker_data::repository::line_format::is_valid_timestamp;

use crate::entities::blood_pressure::{
    Averages, BloodPressureInsights, BloodPressureReading, HighestEvents, ReadingAggregate,
    ReadingKind, Stats,
};
use crate::services::classifier::{categorize_blood_pressure, classify_single, compute_derived};

/// Errors raised while building a filter from user input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Time of day that is not `HHMM`
    #[error("Invalid time of day {0:?}, expected HHMM")]
    BadTimeOfDay(String),

    /// Date that is neither `YYYYMMDD` nor `YYYYMMDD.HHMM`
    #[error("Invalid date {0:?}, expected YYYYMMDD or YYYYMMDD.HHMM")]
    BadDate(String),

    /// Range whose start comes after its end
    #[error("Range start {begin} is after range end {end}")]
    ReversedRange { begin: String, end: String },
}

/// Errors raised while computing statistics
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// Nothing left to aggregate
    #[error("No valid readings to report")]
    NoValidData,
}

fn is_time_of_day(value: &str) -> bool {
    value.len() == 4
        && value.bytes().all(|b| b.is_ascii_digit())
        && &value[..2] < "24"
        && &value[2..] < "60"
}

fn is_date_bound(value: &str) -> bool {
    match value.len() {
        8 => {
            value.bytes().all(|b| b.is_ascii_digit())
                && NaiveDate::parse_from_str(value, "%Y%m%d").is_ok()
        }
        _ => is_valid_timestamp(value),
    }
}

fn ordered(begin: &str, end: &str) -> Result<(), FilterError> {
    if begin > end {
        return Err(FilterError::ReversedRange {
            begin: begin.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

/// Compare a timestamp against a bound that may be a bare date; only as
/// many characters as the bound has take part.
fn prefix(timestamp: &str, bound: &str) -> String {
    timestamp.chars().take(bound.len()).collect()
}

/// Filters applied to readings before aggregation.
///
/// Applied in order: time of day, date range, not-before, then the last N
/// survivors. Readings without a timestamp never pass a timestamp filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingFilter {
    /// Inclusive `HHMM` window
    pub time_of_day: Option<(String, String)>,

    /// Inclusive date window, bounds `YYYYMMDD` or `YYYYMMDD.HHMM`
    pub date_range: Option<(String, String)>,

    /// Earliest date or timestamp to keep
    pub not_before: Option<String>,

    /// Keep only this many of the most recent readings; 0 keeps all
    pub last_n: Option<usize>,
}

impl ReadingFilter {
    /// A filter that lets everything through
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_of_day(mut self, begin: &str, end: &str) -> Result<Self, FilterError> {
        for value in [begin, end] {
            if !is_time_of_day(value) {
                return Err(FilterError::BadTimeOfDay(value.to_string()));
            }
        }
        ordered(begin, end)?;
        self.time_of_day = Some((begin.to_string(), end.to_string()));
        Ok(self)
    }

    pub fn with_date_range(mut self, begin: &str, end: &str) -> Result<Self, FilterError> {
        for value in [begin, end] {
            if !is_date_bound(value) {
                return Err(FilterError::BadDate(value.to_string()));
            }
        }
        ordered(&prefix(begin, end), end)?;
        self.date_range = Some((begin.to_string(), end.to_string()));
        Ok(self)
    }

    pub fn with_not_before(mut self, bound: &str) -> Result<Self, FilterError> {
        if !is_date_bound(bound) {
            return Err(FilterError::BadDate(bound.to_string()));
        }
        self.not_before = Some(bound.to_string());
        Ok(self)
    }

    pub fn with_last_n(mut self, n: usize) -> Self {
        self.last_n = Some(n);
        self
    }

    /// Whether any timestamp based filter is set
    pub fn filters_by_time(&self) -> bool {
        self.time_of_day.is_some() || self.date_range.is_some() || self.not_before.is_some()
    }

    /// Whether the filter can drop any reading at all
    pub fn is_active(&self) -> bool {
        self.filters_by_time() || self.last_n.is_some_and(|n| n > 0)
    }

    fn keeps(&self, reading: &BloodPressureReading) -> bool {
        if let Some((begin, end)) = &self.time_of_day {
            match reading.time_of_day() {
                Some(time) if begin.as_str() <= time && time <= end.as_str() => {}
                _ => return false,
            }
        }

        if let Some((begin, end)) = &self.date_range {
            if !reading.has_timestamp()
                || prefix(&reading.timestamp, begin) < *begin
                || prefix(&reading.timestamp, end) > *end
            {
                return false;
            }
        }

        if let Some(bound) = &self.not_before {
            if !reading.has_timestamp() || prefix(&reading.timestamp, bound) < *bound {
                return false;
            }
        }

        true
    }
}

/// Apply a filter, keeping file order
pub fn filter_readings(
    readings: &[BloodPressureReading],
    filter: &ReadingFilter,
) -> Vec<BloodPressureReading> {
    let mut kept: Vec<BloodPressureReading> = readings
        .iter()
        .filter(|reading| filter.keeps(reading))
        .cloned()
        .collect();

    if let Some(n) = filter.last_n.filter(|n| *n > 0) {
        if kept.len() > n {
            kept.drain(..kept.len() - n);
        }
    }

    debug!("Filter kept {} of {} readings", kept.len(), readings.len());
    kept
}

fn stats(values: impl Iterator<Item = u16> + Clone) -> Result<Stats, AggregateError> {
    let low = values.clone().min().ok_or(AggregateError::NoValidData)?;
    let high = values.clone().max().ok_or(AggregateError::NoValidData)?;
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    let average = (sum as f64 / count as f64).round() as u16;

    Ok(Stats { low, high, average })
}

/// Low, high and rounded average of systolic, diastolic and pulse
pub fn aggregate(readings: &[BloodPressureReading]) -> Result<ReadingAggregate, AggregateError> {
    Ok(ReadingAggregate {
        systolic: stats(readings.iter().map(|r| r.systolic))?,
        diastolic: stats(readings.iter().map(|r| r.diastolic))?,
        pulse: stats(readings.iter().map(|r| r.pulse))?,
    })
}

/// Aggregate plus the classification of the averages
pub fn summarize(readings: &[BloodPressureReading]) -> Result<BloodPressureInsights, AggregateError> {
    let aggregate = aggregate(readings)?;
    let systolic = aggregate.systolic.average;
    let diastolic = aggregate.diastolic.average;

    Ok(BloodPressureInsights {
        aggregate,
        reading_count: readings.len(),
        systolic_category: classify_single(systolic, ReadingKind::Systolic),
        diastolic_category: classify_single(diastolic, ReadingKind::Diastolic),
        derived: compute_derived(systolic, diastolic),
        category: categorize_blood_pressure(systolic, diastolic),
        generated_at: Local::now(),
    })
}

/// Readings with the highest systolic, diastolic and pulse, first one on
/// ties, and the reading with the latest timestamp
pub fn highest_events(readings: &[BloodPressureReading]) -> Result<HighestEvents, AggregateError> {
    let first = readings.first().ok_or(AggregateError::NoValidData)?;

    let mut systolic = first;
    let mut diastolic = first;
    let mut pulse = first;
    for reading in readings {
        if reading.systolic > systolic.systolic {
            systolic = reading;
        }
        if reading.diastolic > diastolic.diastolic {
            diastolic = reading;
        }
        if reading.pulse > pulse.pulse {
            pulse = reading;
        }
    }

    // `0.0` sorts before every real timestamp; later lines win ties
    let latest = readings
        .iter()
        .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
        .unwrap_or(first);

    Ok(HighestEvents {
        systolic: systolic.clone(),
        diastolic: diastolic.clone(),
        pulse: pulse.clone(),
        latest: latest.clone(),
    })
}

/// Averages of the last `n` readings; 0 or more than available means all
pub fn averages_of_last(readings: &[BloodPressureReading], n: usize) -> Result<Averages, AggregateError> {
    if readings.is_empty() {
        return Err(AggregateError::NoValidData);
    }

    let n = if n == 0 || n > readings.len() { readings.len() } else { n };
    let window = &readings[readings.len() - n..];

    let (sys, dia, pulse) = window.iter().fold((0u64, 0u64, 0u64), |(s, d, p), r| {
        (
            s + u64::from(r.systolic),
            d + u64::from(r.diastolic),
            p + u64::from(r.pulse),
        )
    });

    Ok(Averages {
        systolic: sys as f64 / n as f64,
        diastolic: dia as f64 / n as f64,
        pulse: pulse as f64 / n as f64,
        count: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::blood_pressure::{BloodPressureCategory, SingleCategory, UnifiedStatus};

    fn reading(systolic: u16, diastolic: u16, pulse: u16, timestamp: &str) -> BloodPressureReading {
        BloodPressureReading {
            systolic,
            diastolic,
            pulse,
            timestamp: timestamp.to_string(),
        }
    }

    fn good_data() -> Vec<BloodPressureReading> {
        vec![
            reading(120, 65, 55, "20220914.1407"),
            reading(120, 64, 60, "20220914.1753"),
            reading(140, 64, 65, "20220915.1408"),
            reading(140, 62, 60, "20220915.1714"),
        ]
    }

    #[test]
    fn test_aggregate_two_readings() {
        let readings = vec![reading(120, 65, 55, "0.0"), reading(140, 62, 60, "0.0")];
        let result = aggregate(&readings).unwrap();

        assert_eq!(result.systolic, Stats { low: 120, high: 140, average: 130 });
        assert_eq!(result.diastolic, Stats { low: 62, high: 65, average: 64 });
        assert_eq!(result.pulse, Stats { low: 55, high: 60, average: 58 });
    }

    #[test]
    fn test_aggregate_empty_is_no_data() {
        assert_eq!(aggregate(&[]), Err(AggregateError::NoValidData));
    }

    #[test]
    fn test_aggregate_three_readings() {
        let readings = vec![
            reading(100, 80, 60, "0.0"),
            reading(110, 90, 70, "0.0"),
            reading(120, 100, 80, "0.0"),
        ];
        let result = aggregate(&readings).unwrap();
        assert_eq!(result.systolic, Stats { low: 100, high: 120, average: 110 });
        assert_eq!(result.diastolic, Stats { low: 80, high: 100, average: 90 });
        assert_eq!(result.pulse, Stats { low: 60, high: 80, average: 70 });
    }

    #[test]
    fn test_summarize_classifies_averages() {
        let insights = summarize(&good_data()).unwrap();

        assert_eq!(insights.reading_count, 4);
        assert_eq!(insights.aggregate.systolic.average, 130);
        assert_eq!(insights.aggregate.diastolic.average, 64);
        assert_eq!(insights.systolic_category, SingleCategory::PreHypertension);
        assert_eq!(insights.diastolic_category, SingleCategory::LowNormal);
        assert_eq!(insights.derived.status, UnifiedStatus::PreHypertension);
        assert_eq!(insights.derived.pulse_pressure, 66);
        assert_eq!(insights.category, BloodPressureCategory::Hypertension1);
    }

    #[test]
    fn test_time_of_day_filter() {
        let readings = vec![
            reading(115, 67, 66, "20220914.0800"),
            reading(116, 67, 66, "20220914.0839"),
            reading(117, 67, 66, "20220914.0901"),
            reading(118, 67, 66, "0.0"),
        ];

        let filter = ReadingFilter::new().with_time_of_day("0800", "0900").unwrap();
        let kept = filter_readings(&readings, &filter);
        assert_eq!(kept.iter().map(|r| r.systolic).collect::<Vec<_>>(), vec![115, 116]);

        let filter = ReadingFilter::new().with_time_of_day("0900", "1000").unwrap();
        let kept = filter_readings(&readings, &filter);
        assert_eq!(kept.iter().map(|r| r.systolic).collect::<Vec<_>>(), vec![117]);
    }

    #[test]
    fn test_date_range_filter() {
        let readings = vec![
            reading(115, 67, 66, "20220914.0839"),
            reading(116, 67, 66, "0.0"),
        ];

        let inside = ReadingFilter::new()
            .with_date_range("20220913.0800", "20220916.0900")
            .unwrap();
        assert_eq!(filter_readings(&readings, &inside).len(), 1);

        let outside = ReadingFilter::new()
            .with_date_range("20220910.0800", "20220913.0900")
            .unwrap();
        assert!(filter_readings(&readings, &outside).is_empty());
    }

    #[test]
    fn test_date_range_with_bare_dates_includes_end_day() {
        let readings = vec![
            reading(115, 67, 66, "20220913.2359"),
            reading(116, 67, 66, "20220914.0000"),
            reading(117, 67, 66, "20220916.2300"),
            reading(118, 67, 66, "20220917.0000"),
        ];
        let filter = ReadingFilter::new().with_date_range("20220914", "20220916").unwrap();
        let kept = filter_readings(&readings, &filter);
        assert_eq!(kept.iter().map(|r| r.systolic).collect::<Vec<_>>(), vec![116, 117]);
    }

    #[test]
    fn test_not_before_filter() {
        let readings = vec![
            reading(115, 67, 66, "20220914.0839"),
            reading(116, 67, 66, "0.0"),
        ];

        let early = ReadingFilter::new().with_not_before("20220913.0800").unwrap();
        assert_eq!(filter_readings(&readings, &early).len(), 1);

        let late = ReadingFilter::new().with_not_before("20220915.0800").unwrap();
        assert!(filter_readings(&readings, &late).is_empty());
    }

    #[test]
    fn test_unstamped_readings_pass_without_time_filters() {
        let readings = vec![reading(115, 67, 66, "0.0"), reading(116, 67, 66, "0.0")];
        let filter = ReadingFilter::new().with_last_n(0);
        assert!(!filter.filters_by_time());
        assert!(!filter.is_active());
        assert_eq!(filter_readings(&readings, &filter).len(), 2);

        assert!(ReadingFilter::new().with_last_n(1).is_active());
        assert!(ReadingFilter::new().with_not_before("20220914").unwrap().is_active());
    }

    #[test]
    fn test_last_n_applies_after_other_filters() {
        let readings = vec![
            reading(110, 60, 60, "20220914.0800"),
            reading(120, 60, 60, "20220914.2000"),
            reading(130, 60, 60, "20220915.0800"),
            reading(140, 60, 60, "20220915.2000"),
            reading(150, 60, 60, "20220916.0800"),
        ];
        let filter = ReadingFilter::new()
            .with_time_of_day("0700", "0900")
            .unwrap()
            .with_last_n(2);

        let kept = filter_readings(&readings, &filter);
        assert_eq!(kept.iter().map(|r| r.systolic).collect::<Vec<_>>(), vec![130, 150]);
    }

    #[test]
    fn test_last_n_larger_than_data_keeps_all() {
        let filter = ReadingFilter::new().with_last_n(10);
        assert_eq!(filter_readings(&good_data(), &filter).len(), 4);
    }

    #[test]
    fn test_filter_rejects_bad_bounds() {
        assert_eq!(
            ReadingFilter::new().with_time_of_day("8:00", "0900"),
            Err(FilterError::BadTimeOfDay("8:00".to_string()))
        );
        assert_eq!(
            ReadingFilter::new().with_time_of_day("0800", "2460"),
            Err(FilterError::BadTimeOfDay("2460".to_string()))
        );
        assert_eq!(
            ReadingFilter::new().with_date_range("2022-09-13", "20220916"),
            Err(FilterError::BadDate("2022-09-13".to_string()))
        );
        assert!(matches!(
            ReadingFilter::new().with_time_of_day("1000", "0900"),
            Err(FilterError::ReversedRange { .. })
        ));
        assert!(matches!(
            ReadingFilter::new().with_date_range("20220917", "20220916.2300"),
            Err(FilterError::ReversedRange { .. })
        ));
        assert!(ReadingFilter::new().with_not_before("20221301").is_err());
    }

    #[test]
    fn test_highest_events() {
        let data = vec![
            reading(110, 59, 68, "20220812.1323"),
            reading(124, 62, 62, "20220810.0840"),
            reading(134, 63, 57, "20220812.0758"),
            reading(134, 62, 57, "20220812.1128"),
            reading(100, 59, 62, "20220809.1640"),
        ];
        let events = highest_events(&data).unwrap();

        assert_eq!(events.systolic, data[2]);
        assert_eq!(events.diastolic, data[2]);
        assert_eq!(events.pulse, data[0]);
        assert_eq!(events.latest, data[0]);
    }

    #[test]
    fn test_highest_events_latest_ignores_unstamped() {
        let data = vec![reading(110, 59, 68, "20220812.1323"), reading(120, 60, 60, "0.0")];
        assert_eq!(highest_events(&data).unwrap().latest, data[0]);
        assert_eq!(highest_events(&[]), Err(AggregateError::NoValidData));
    }

    #[test]
    fn test_averages_of_last() {
        let all = averages_of_last(&good_data(), 0).unwrap();
        assert_eq!(all.count, 4);
        assert_eq!(all.systolic, 130.0);
        assert_eq!(all.diastolic, 63.75);
        assert_eq!(all.pulse, 60.0);

        let last_two = averages_of_last(&good_data(), 2).unwrap();
        assert_eq!(last_two.count, 2);
        assert_eq!(last_two.systolic, 140.0);
        assert_eq!(last_two.diastolic, 63.0);

        let last_three = averages_of_last(&good_data(), 3).unwrap();
        assert_eq!(last_three.to_string(), "133/63 62");

        assert_eq!(averages_of_last(&good_data(), 99).unwrap().count, 4);
        assert_eq!(averages_of_last(&[], 3), Err(AggregateError::NoValidData));
    }
}
