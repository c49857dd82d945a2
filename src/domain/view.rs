// View-model projection - pure derivations from current state into chart data
use super::metrics::MetricsSnapshot;
use super::trend::{Axis, Interval, TrendSeries};
use serde::{Deserialize, Serialize};

/// Parallel label/value sequences for one trend axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedTrend {
    pub axis: Axis,
    pub interval: Interval,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ProjectedTrend {
    pub fn empty(axis: Axis, interval: Interval) -> Self {
        Self {
            axis,
            interval,
            labels: Vec::new(),
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StatusBreakdown {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

/// Projects `series` onto `axis`.
///
/// Buckets that lack the axis value are dropped rather than plotted as zero.
pub fn project_trend(series: &TrendSeries, axis: Axis) -> ProjectedTrend {
    let (labels, values) = series
        .buckets
        .iter()
        .filter_map(|b| b.value_for(axis).map(|v| (b.label.clone(), v)))
        .unzip();

    ProjectedTrend {
        axis,
        interval: series.interval,
        labels,
        values,
    }
}

pub fn project_status_breakdown(snapshot: &MetricsSnapshot) -> StatusBreakdown {
    let (labels, counts) = snapshot
        .orders_by_status
        .iter()
        .map(|(status, count)| (status.clone(), *count))
        .unzip();
    StatusBreakdown { labels, counts }
}

/// Largest fractional precision `CurrencyFormat` renders; higher values are clamped.
pub const MAX_FRACTION_DIGITS: u32 = 9;

/// Monetary formatting rules for one locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub group_separator: char,
    pub decimal_separator: char,
    pub fraction_digits: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            group_separator: ',',
            decimal_separator: '.',
            fraction_digits: 2,
        }
    }
}

impl CurrencyFormat {
    /// Formats `amount`; a missing or non-finite amount renders as zero.
    pub fn format(&self, amount: Option<f64>) -> String {
        let amount = amount.filter(|a| a.is_finite()).unwrap_or(0.0);
        let digits = self.fraction_digits.min(MAX_FRACTION_DIGITS);
        let scale = 10u128.pow(digits);
        let minor_units = (amount.abs() * scale as f64).round() as u128;
        let whole = (minor_units / scale).to_string();
        let fraction = minor_units % scale;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(digit);
        }

        let sign = if amount < 0.0 && minor_units > 0 { "-" } else { "" };
        if digits == 0 {
            format!("{}{}{}", sign, self.symbol, grouped)
        } else {
            format!(
                "{}{}{}{}{:0width$}",
                sign,
                self.symbol,
                grouped,
                self.decimal_separator,
                fraction,
                width = digits as usize
            )
        }
    }
}

/// Formats `amount` with the default (en-US) rules.
pub fn format_currency(amount: Option<f64>) -> String {
    CurrencyFormat::default().format(amount)
}
