use crate::models::{Entry, Metric, Statistics, StatsPayload};
use chrono::NaiveDate;
use serde::Serialize;

/// Date span covered by a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeDescriptor {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_count: i64,
}

impl RangeDescriptor {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            day_count: inclusive_days(start_date, end_date),
        }
    }
}

/// Mean of every present, finite value per metric. A metric with no such
/// values stays `None`.
pub fn compute_aggregates(entries: &[Entry]) -> Statistics {
    let mut stats = Statistics {
        total_entries: Some(entries.len() as u64),
        ..Statistics::default()
    };

    for metric in Metric::ALL {
        let (sum, count) = entries
            .iter()
            .filter_map(|entry| metric.value(entry))
            .filter(|value| value.is_finite())
            .fold((0.0_f64, 0u32), |(sum, count), value| (sum + value, count + 1));

        let mean = (count > 0).then(|| sum / f64::from(count));
        stats.set(metric, mean);
    }

    stats
}

/// `None` when there is nothing to describe.
pub fn compute_range_descriptor(entries: &[Entry]) -> Option<RangeDescriptor> {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|entry| entry.date).collect();
    dates.sort_unstable();
    let (first, last) = (dates.first()?, dates.last()?);
    Some(RangeDescriptor::between(*first, *last))
}

/// Builds the same shape the statistics endpoint serves, from local data.
pub fn local_payload(entries: &[Entry]) -> Option<StatsPayload> {
    let range = compute_range_descriptor(entries)?;
    Some(StatsPayload {
        window_days: Some(range.day_count),
        start_date: Some(range.start_date.to_string()),
        end_date: Some(range.end_date.to_string()),
        stats: compute_aggregates(entries),
    })
}

/// Never less than one day.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weighed(date: NaiveDate, weight: Option<f64>) -> Entry {
        Entry {
            weight,
            ..Entry::new(date)
        }
    }

    #[test]
    fn empty_input_has_no_data_for_every_metric() {
        let stats = compute_aggregates(&[]);
        for metric in Metric::ALL {
            assert_eq!(stats.get(metric), None, "{metric:?}");
        }
        assert_eq!(stats.total_entries, Some(0));
    }

    #[test]
    fn missing_values_are_skipped_not_zeroed() {
        let entries = vec![
            weighed(day(2026, 1, 1), Some(70.0)),
            weighed(day(2026, 1, 2), None),
            weighed(day(2026, 1, 3), Some(72.0)),
        ];
        let stats = compute_aggregates(&entries);
        assert_eq!(stats.avg_weight, Some(71.0));
        assert_eq!(stats.avg_steps, None);
        assert_eq!(stats.total_entries, Some(3));
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let entries = vec![
            weighed(day(2026, 1, 1), Some(f64::NAN)),
            weighed(day(2026, 1, 2), Some(f64::INFINITY)),
            weighed(day(2026, 1, 3), Some(68.5)),
        ];
        assert_eq!(compute_aggregates(&entries).avg_weight, Some(68.5));
    }

    #[test]
    fn single_entry_mean_is_its_value() {
        let entry = Entry {
            sleep_total: Some(7.5),
            steps: Some(8000.0),
            ..Entry::new(day(2026, 1, 1))
        };
        let stats = compute_aggregates(&[entry]);
        assert_eq!(stats.avg_sleep, Some(7.5));
        assert_eq!(stats.avg_steps, Some(8000.0));
    }

    #[test]
    fn descriptor_sorts_before_spanning() {
        let entries = vec![
            Entry::new(day(2026, 2, 10)),
            Entry::new(day(2026, 2, 1)),
            Entry::new(day(2026, 2, 5)),
        ];
        let range = compute_range_descriptor(&entries).expect("range");
        assert_eq!(range.start_date, day(2026, 2, 1));
        assert_eq!(range.end_date, day(2026, 2, 10));
        assert_eq!(range.day_count, 10);
    }

    #[test]
    fn descriptor_of_nothing_is_none() {
        assert_eq!(compute_range_descriptor(&[]), None);
        assert_eq!(local_payload(&[]), None);
    }
}
