//! Turns statistics into what the stats panel shows: one text cell per
//! metric and a caption describing the date span.

use crate::models::{Entry, Metric, StatsPayload};
use crate::stats::{compute_aggregates, compute_range_descriptor, inclusive_days, RangeDescriptor};
use crate::window::WindowSelector;
use chrono::NaiveDate;
use serde::Serialize;

pub const PLACEHOLDER: &str = "--";
pub const ALL_TIME: &str = "All time";
pub const NO_DATA_IN_RANGE: &str = "No data in range";
pub const NO_DATA_IN_ZOOM: &str = "No data in selected zoom range";
pub const UNAVAILABLE: &str = "Statistics unavailable";
pub const LOADING: &str = "Loading";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    Loading,
    Ready,
    /// The selected window has no entries.
    NoData,
    /// The zoomed range has no entries.
    NoDataInZoom,
    /// The statistics request failed.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCell {
    pub metric: Metric,
    pub key: &'static str,
    pub value: Option<f64>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsPanel {
    pub state: PanelState,
    pub cells: Vec<MetricCell>,
    pub caption: String,
}

impl StatsPanel {
    pub fn loading() -> Self {
        Self::placeholder(PanelState::Loading, PLACEHOLDER, LOADING)
    }

    pub fn no_data() -> Self {
        Self::placeholder(PanelState::NoData, PLACEHOLDER, NO_DATA_IN_RANGE)
    }

    pub fn no_data_in_zoom() -> Self {
        Self::placeholder(PanelState::NoDataInZoom, "no data", NO_DATA_IN_ZOOM)
    }

    pub fn unavailable() -> Self {
        Self::placeholder(PanelState::Unavailable, PLACEHOLDER, UNAVAILABLE)
    }

    fn placeholder(state: PanelState, text: &str, caption: &str) -> Self {
        let cells = Metric::ALL
            .into_iter()
            .map(|metric| MetricCell {
                metric,
                key: metric.stat_key(),
                value: None,
                text: text.to_owned(),
            })
            .collect();
        Self {
            state,
            cells,
            caption: caption.to_owned(),
        }
    }

    pub fn cell(&self, metric: Metric) -> Option<&MetricCell> {
        self.cells.iter().find(|cell| cell.metric == metric)
    }
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self::loading()
    }
}

/// Panel for a statistics payload. `entries` is the loaded collection,
/// used to describe an all-time payload that carries no dates.
pub fn present_payload(
    payload: &StatsPayload,
    window: WindowSelector,
    entries: &[Entry],
) -> StatsPanel {
    let cells = Metric::ALL
        .into_iter()
        .map(|metric| {
            let value = payload.stats.get(metric);
            let text = match metric {
                Metric::Sleep => value.map_or_else(|| PLACEHOLDER.to_owned(), format_sleep_hhmm),
                _ => format_stat_value(value),
            };
            MetricCell {
                metric,
                key: metric.stat_key(),
                value,
                text,
            }
        })
        .collect();

    StatsPanel {
        state: PanelState::Ready,
        cells,
        caption: caption(payload, window, entries),
    }
}

/// Panel for entries inside a zoomed range, computed without the network.
pub fn present_zoom(in_range: &[Entry]) -> StatsPanel {
    let Some(range) = compute_range_descriptor(in_range) else {
        return StatsPanel::no_data_in_zoom();
    };
    let payload = StatsPayload {
        window_days: Some(range.day_count),
        start_date: Some(range.start_date.to_string()),
        end_date: Some(range.end_date.to_string()),
        stats: compute_aggregates(in_range),
    };
    present_payload(&payload, WindowSelector::AllTime, in_range)
}

/// Prefers the payload's own day count, then the span between its dates,
/// then the span of the loaded entries when showing all time.
pub fn caption(payload: &StatsPayload, window: WindowSelector, entries: &[Entry]) -> String {
    let start = payload.start_date.as_deref().filter(|s| !s.trim().is_empty());
    let end = payload.end_date.as_deref().filter(|s| !s.trim().is_empty());

    if let (Some(start), Some(end)) = (start, end) {
        let days = payload
            .window_days
            .filter(|days| *days > 0)
            .or_else(|| span_between(start, end));
        return span_caption(start, end, days);
    }

    if window.is_all_time() {
        if let Some(RangeDescriptor {
            start_date,
            end_date,
            day_count,
        }) = compute_range_descriptor(entries)
        {
            return span_caption(&start_date.to_string(), &end_date.to_string(), Some(day_count));
        }
    }

    ALL_TIME.to_owned()
}

pub fn format_stat_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => PLACEHOLDER.to_owned(),
    }
}

/// Decimal hours as `HH:MM`, carrying a rounded-up 60th minute.
pub fn format_sleep_hhmm(hours: f64) -> String {
    if !hours.is_finite() {
        return PLACEHOLDER.to_owned();
    }
    let mut whole = hours.floor() as i64;
    let mut minutes = ((hours - hours.floor()) * 60.0).round() as i64;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    format!("{whole:02}:{minutes:02}")
}

fn span_between(start: &str, end: &str) -> Option<i64> {
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").ok()?;
    Some(inclusive_days(start, end))
}

fn span_caption(start: &str, end: &str, days: Option<i64>) -> String {
    match days {
        Some(1) => format!("{start} → {end} (1 day)"),
        Some(days) => format!("{start} → {end} ({days} days)"),
        None => format!("{start} → {end}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Statistics;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sleep_formatting_rounds_and_carries() {
        assert_eq!(format_sleep_hhmm(7.98), "07:59");
        assert_eq!(format_sleep_hhmm(7.999999), "08:00");
        assert_eq!(format_sleep_hhmm(7.5), "07:30");
        assert_eq!(format_sleep_hhmm(0.0), "00:00");
        assert_eq!(format_sleep_hhmm(f64::NAN), "--");
    }

    #[test]
    fn stat_values_use_two_decimals() {
        assert_eq!(format_stat_value(Some(71.0)), "71.00");
        assert_eq!(format_stat_value(Some(8045.833)), "8045.83");
        assert_eq!(format_stat_value(None), "--");
    }

    #[test]
    fn caption_prefers_explicit_day_count() {
        let payload = StatsPayload {
            window_days: Some(30),
            start_date: Some("2026-01-15".into()),
            end_date: Some("2026-02-13".into()),
            ..StatsPayload::default()
        };
        assert_eq!(
            caption(&payload, "30d".parse().unwrap(), &[]),
            "2026-01-15 → 2026-02-13 (30 days)"
        );
    }

    #[test]
    fn caption_derives_days_from_dates() {
        let payload = StatsPayload {
            start_date: Some("2026-02-01".into()),
            end_date: Some("2026-02-07".into()),
            ..StatsPayload::default()
        };
        assert_eq!(
            caption(&payload, WindowSelector::AllTime, &[]),
            "2026-02-01 → 2026-02-07 (7 days)"
        );

        let unreadable = StatsPayload {
            start_date: Some("Feb 1".into()),
            end_date: Some("2026-02-07".into()),
            ..StatsPayload::default()
        };
        assert_eq!(
            caption(&unreadable, WindowSelector::AllTime, &[]),
            "Feb 1 → 2026-02-07"
        );
    }

    #[test]
    fn caption_for_all_time_falls_back_to_loaded_entries() {
        let entries = vec![Entry::new(day(2026, 2, 3)), Entry::new(day(2026, 1, 30))];
        let payload = StatsPayload::default();
        assert_eq!(
            caption(&payload, WindowSelector::AllTime, &entries),
            "2026-01-30 → 2026-02-03 (5 days)"
        );
        assert_eq!(caption(&payload, WindowSelector::AllTime, &[]), ALL_TIME);
    }

    #[test]
    fn payload_panel_formats_each_metric() {
        let payload = StatsPayload {
            stats: Statistics {
                avg_weight: Some(72.144),
                avg_sleep: Some(7.36),
                ..Statistics::default()
            },
            ..StatsPayload::default()
        };
        let panel = present_payload(&payload, WindowSelector::AllTime, &[]);
        assert_eq!(panel.state, PanelState::Ready);
        assert_eq!(panel.cell(Metric::Weight).unwrap().text, "72.14");
        assert_eq!(panel.cell(Metric::Sleep).unwrap().text, "07:22");
        assert_eq!(panel.cell(Metric::Steps).unwrap().text, "--");
        assert_eq!(panel.caption, ALL_TIME);
    }

    #[test]
    fn empty_zoom_is_an_explicit_state() {
        let panel = present_zoom(&[]);
        assert_eq!(panel.state, PanelState::NoDataInZoom);
        assert_eq!(panel.caption, NO_DATA_IN_ZOOM);
        assert!(panel.cells.iter().all(|cell| cell.value.is_none() && cell.text == "no data"));
    }

    #[test]
    fn zoom_panel_describes_the_entries_it_averaged() {
        let entries = vec![
            Entry {
                weight: Some(70.0),
                ..Entry::new(day(2024, 1, 2))
            },
            Entry {
                weight: Some(72.0),
                ..Entry::new(day(2024, 1, 4))
            },
        ];
        let panel = present_zoom(&entries);
        assert_eq!(panel.cell(Metric::Weight).unwrap().value, Some(71.0));
        assert_eq!(panel.caption, "2024-01-02 → 2024-01-04 (3 days)");
    }
}
