use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One calendar day's measurements, keyed by `date`.
///
/// Sleep is always held as decimal hours; the wire formats the API may use
/// for it are reconciled in [`Entry::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Entry {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    pub calories: Option<f64>,
    pub steps: Option<f64>,
    pub sleep_total: Option<f64>,
    pub training_volume: Option<f64>,
    pub sleep_quality: Option<String>,
    pub observations: Option<String>,
}

impl Entry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// Decodes one entry object as served by the API.
    ///
    /// Returns `None` when `date` is missing or not `YYYY-MM-DD`. Metric
    /// fields that are not finite JSON numbers decode as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let date = object
            .get("date")
            .and_then(Value::as_str)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())?;

        let number = |key: &str| object.get(key).and_then(finite_number);
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let sleep_total = number("sleep_total_decimal").or_else(|| match object.get("sleep_total") {
            Some(Value::String(raw)) => parse_sleep_hhmm(raw),
            Some(other) => finite_number(other),
            None => None,
        });

        Some(Self {
            date,
            weight: number("weight"),
            body_fat: number("body_fat"),
            calories: number("calories"),
            steps: number("steps"),
            sleep_total,
            training_volume: number("training_volume"),
            sleep_quality: text("sleep_quality"),
            observations: text("observations"),
        })
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Entry::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("entry requires a YYYY-MM-DD date"))
    }
}

/// A tracked metric and the statistics key the API reports it under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Weight,
    BodyFat,
    Calories,
    Steps,
    Sleep,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Weight,
        Metric::BodyFat,
        Metric::Calories,
        Metric::Steps,
        Metric::Sleep,
    ];

    pub fn stat_key(self) -> &'static str {
        match self {
            Metric::Weight => "avg_weight",
            Metric::BodyFat => "avg_body_fat",
            Metric::Calories => "avg_calories",
            Metric::Steps => "avg_steps",
            Metric::Sleep => "avg_sleep",
        }
    }

    pub fn value(self, entry: &Entry) -> Option<f64> {
        match self {
            Metric::Weight => entry.weight,
            Metric::BodyFat => entry.body_fat,
            Metric::Calories => entry.calories,
            Metric::Steps => entry.steps,
            Metric::Sleep => entry.sleep_total,
        }
    }
}

/// Per-metric means. `None` means no data, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_body_fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_steps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_sleep: Option<f64>,
    #[serde(default)]
    pub total_entries: Option<u64>,
}

impl Statistics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => self.avg_weight,
            Metric::BodyFat => self.avg_body_fat,
            Metric::Calories => self.avg_calories,
            Metric::Steps => self.avg_steps,
            Metric::Sleep => self.avg_sleep,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Weight => &mut self.avg_weight,
            Metric::BodyFat => &mut self.avg_body_fat,
            Metric::Calories => &mut self.avg_calories,
            Metric::Steps => &mut self.avg_steps,
            Metric::Sleep => &mut self.avg_sleep,
        };
        *slot = value;
    }
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatsPayload {
    #[serde(default)]
    pub window_days: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub stats: Statistics,
}

/// What the entry form submits. `sleep_total` travels as `HH:MM` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntryPayload {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    pub calories: Option<i64>,
    pub training_volume: Option<f64>,
    pub steps: Option<i64>,
    pub sleep_total: Option<String>,
    #[serde(default)]
    pub sleep_quality: Option<String>,
    pub observations: Option<String>,
}

/// Raw text fields of the entry form, before coercion.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EntryForm {
    pub date: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub body_fat: String,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub training_volume: String,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub sleep_total: String,
    #[serde(default)]
    pub sleep_quality: String,
    #[serde(default)]
    pub observations: String,
}

impl EntryForm {
    /// Coerces form text into a payload. Blank, unparseable and zero
    /// numbers are dropped; only a bad date rejects the form.
    pub fn into_payload(self) -> Option<EntryPayload> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        Some(EntryPayload {
            date,
            weight: form_float(&self.weight),
            body_fat: form_float(&self.body_fat),
            calories: form_int(&self.calories),
            training_volume: form_float(&self.training_volume),
            steps: form_int(&self.steps),
            sleep_total: form_text(&self.sleep_total),
            sleep_quality: form_text(&self.sleep_quality),
            observations: form_text(&self.observations),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    Created,
    Updated,
}

impl SaveMode {
    pub fn message(self) -> &'static str {
        match self {
            SaveMode::Created => "Entry added!",
            SaveMode::Updated => "Entry updated!",
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveMode::Created => f.write_str("created"),
            SaveMode::Updated => f.write_str("updated"),
        }
    }
}

/// Parses `HH:MM` (hours 00-23, minutes 00-59) into decimal hours.
pub fn parse_sleep_hhmm(raw: &str) -> Option<f64> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(f64::from(hours) + f64::from(minutes) / 60.0)
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(finite_number))
}

fn form_float(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

fn form_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|v| *v != 0)
}

fn form_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
