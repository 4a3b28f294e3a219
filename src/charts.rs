use crate::errors::PaneError;
use crate::models::Entry;
use crate::presenter::format_sleep_hhmm;
use crate::window::VisibleRange;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;

pub const MOVING_AVERAGE_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Weight,
    BodyFat,
    Steps,
    Sleep,
    Calories,
    TrainingVolume,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Weight,
        ChartKind::BodyFat,
        ChartKind::Steps,
        ChartKind::Sleep,
        ChartKind::Calories,
        ChartKind::TrainingVolume,
    ];

    /// Element id the page mounts the chart under.
    pub fn id(self) -> &'static str {
        match self {
            ChartKind::Weight => "weightChart",
            ChartKind::BodyFat => "bodyFatChart",
            ChartKind::Steps => "stepsChart",
            ChartKind::Sleep => "sleepChart",
            ChartKind::Calories => "caloriesChart",
            ChartKind::TrainingVolume => "trainingVolumeChart",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Weight => "Weight (kg)",
            ChartKind::BodyFat => "Body Fat (%)",
            ChartKind::Steps => "Steps",
            ChartKind::Sleep => "Sleep (HH:MM)",
            ChartKind::Calories => "Calories (kcal)",
            ChartKind::TrainingVolume => "Training Volume (kg)",
        }
    }

    fn value(self, entry: &Entry) -> Option<f64> {
        match self {
            ChartKind::Weight => entry.weight,
            ChartKind::BodyFat => entry.body_fat,
            ChartKind::Steps => entry.steps,
            ChartKind::Sleep => entry.sleep_total,
            ChartKind::Calories => entry.calories,
            ChartKind::TrainingVolume => entry.training_volume,
        }
    }
}

/// Daily values of one chart plus their trailing average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
    pub moving_average: Vec<Option<f64>>,
    /// `HH:MM` labels, only for sleep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Expects `entries` sorted by date.
pub fn build_series(kind: ChartKind, entries: &[Entry]) -> ChartSeries {
    let dates = entries.iter().map(|entry| entry.date).collect();
    let values: Vec<Option<f64>> = entries
        .iter()
        .map(|entry| kind.value(entry).filter(|v| v.is_finite()))
        .collect();
    let moving_average = moving_average(&values, MOVING_AVERAGE_DAYS);
    let labels = (kind == ChartKind::Sleep).then(|| {
        values
            .iter()
            .map(|value| value.map(format_sleep_hhmm).unwrap_or_default())
            .collect()
    });

    ChartSeries {
        kind,
        dates,
        values,
        moving_average,
        labels,
    }
}

/// Trailing mean over up to `window` points, expanding at the start.
/// Missing points are skipped; a window with none yields `None`.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = values[start..=i]
                .iter()
                .flatten()
                .copied()
                .fold((0.0_f64, 0u32), |(sum, count), v| (sum + v, count + 1));
            (count > 0).then(|| sum / f64::from(count))
        })
        .collect()
}

/// An x-axis change, either requested of a pane or reported by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AxisUpdate {
    Range(VisibleRange),
    AutoRange,
}

impl AxisUpdate {
    /// Decodes a chart relayout event. Returns `None` for events that do
    /// not touch the x-axis range (y-axis drags, hover, legend clicks).
    pub fn from_relayout(update: &Value) -> Option<Self> {
        let object = update.as_object()?;

        if object.get("xaxis.autorange").and_then(Value::as_bool) == Some(true) {
            return Some(AxisUpdate::AutoRange);
        }

        if let Some(Value::Array(bounds)) = object.get("xaxis.range") {
            if let [start, end] = bounds.as_slice() {
                return Some(AxisUpdate::Range(VisibleRange::new(
                    axis_text(start)?,
                    axis_text(end)?,
                )));
            }
        }

        let start = object.get("xaxis.range[0]")?;
        let end = object.get("xaxis.range[1]")?;
        Some(AxisUpdate::Range(VisibleRange::new(axis_text(start)?, axis_text(end)?)))
    }

    pub fn range(&self) -> Option<&VisibleRange> {
        match self {
            AxisUpdate::Range(range) => Some(range),
            AxisUpdate::AutoRange => None,
        }
    }
}

impl From<Option<VisibleRange>> for AxisUpdate {
    fn from(range: Option<VisibleRange>) -> Self {
        range.map_or(AxisUpdate::AutoRange, AxisUpdate::Range)
    }
}

fn axis_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// One chart on the page. Implementations wrap whatever does the drawing.
pub trait ChartPane: Send + Sync {
    fn kind(&self) -> ChartKind;

    fn id(&self) -> &str {
        self.kind().id()
    }

    /// Replaces the plotted data and sets the x-axis.
    fn draw(&self, series: ChartSeries, axis: &AxisUpdate) -> Result<(), PaneError>;

    /// Moves the x-axis without touching the data.
    fn relayout(&self, axis: &AxisUpdate) -> Result<(), PaneError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct PaneSnapshot {
    pub id: &'static str,
    pub title: &'static str,
    pub axis: AxisUpdate,
    pub series: Option<ChartSeries>,
}

/// A pane that keeps what it was told to show, for serving to a browser.
#[derive(Debug)]
pub struct RecordedPane {
    kind: ChartKind,
    state: Mutex<(AxisUpdate, Option<ChartSeries>)>,
}

impl RecordedPane {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            state: Mutex::new((AxisUpdate::AutoRange, None)),
        }
    }

    pub fn snapshot(&self) -> PaneSnapshot {
        let (axis, series) = match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        PaneSnapshot {
            id: self.kind.id(),
            title: self.kind.title(),
            axis,
            series,
        }
    }

    fn update(
        &self,
        f: impl FnOnce(&mut (AxisUpdate, Option<ChartSeries>)),
    ) -> Result<(), PaneError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PaneError::NotMounted(self.kind.id().to_owned()))?;
        f(&mut *state);
        Ok(())
    }
}

impl ChartPane for RecordedPane {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn draw(&self, series: ChartSeries, axis: &AxisUpdate) -> Result<(), PaneError> {
        self.update(|state| *state = (axis.clone(), Some(series)))
    }

    fn relayout(&self, axis: &AxisUpdate) -> Result<(), PaneError> {
        self.update(|state| state.0 = axis.clone())
    }
}
