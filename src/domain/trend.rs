// Trend series domain models
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time granularity of a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Minute,
    Hour,
}

impl Interval {
    /// Bucket count requested for this interval: an hour of minutes, a day of hours.
    pub fn default_bucket_count(self) -> u32 {
        match self {
            Interval::Minute => 60,
            Interval::Hour => 24,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Minute => "minute",
            Interval::Hour => "hour",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(Interval::Minute),
            "hour" => Ok(Interval::Hour),
            other => Err(format!("unknown interval '{}'", other)),
        }
    }
}

/// One of the two independently toggleable trend displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Revenue,
    Orders,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Revenue, Axis::Orders];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Revenue => "revenue",
            Axis::Orders => "orders",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single time-windowed aggregate point.
///
/// Upstream entries may be partial, so both numeric fields are optional and
/// anything that is not a finite number deserializes to `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendBucket {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub orders: Option<f64>,
}

impl TrendBucket {
    pub fn new(label: impl Into<String>, revenue: Option<f64>, orders: Option<f64>) -> Self {
        Self {
            bucket: None,
            label: label.into(),
            revenue,
            orders,
        }
    }

    /// The numeric value this bucket carries for `axis`, if any.
    pub fn value_for(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Revenue => self.revenue,
            Axis::Orders => self.orders,
        }
    }
}

/// Chronologically ordered buckets for one interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub interval: Interval,
    pub buckets: Vec<TrendBucket>,
}

impl TrendSeries {
    pub fn new(interval: Interval, buckets: Vec<TrendBucket>) -> Self {
        Self { interval, buckets }
    }
}

/// Raw `/metrics/trends` response body.
///
/// `interval` is kept as a raw string so that a payload with a missing or
/// unrecognized interval still parses; callers fall back to the interval
/// they asked for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendPayload {
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub data: Vec<TrendBucket>,
}

impl TrendPayload {
    pub fn into_series(self, requested: Interval) -> TrendSeries {
        let interval = self
            .interval
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(requested);
        TrendSeries::new(interval, self.data)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite()))
}
