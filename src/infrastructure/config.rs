use crate::domain::trend::Interval;
use crate::domain::view::{CurrencyFormat, MAX_FRACTION_DIGITS};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub analytics: AnalyticsSettings,
    pub orders: OrdersSettings,
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Order service, consulted only when the batch metrics endpoint fails.
#[derive(Debug, Deserialize, Clone)]
pub struct OrdersSettings {
    pub base_url: String,
    #[serde(default = "default_revenue_path")]
    pub revenue_path: String,
    #[serde(default = "default_orders_path")]
    pub orders_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_interval")]
    pub default_interval: Interval,
    #[serde(default = "default_recent_orders_window")]
    pub recent_orders_window: usize,
    #[serde(default)]
    pub currency: CurrencyFormat,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            default_interval: default_interval(),
            recent_orders_window: default_recent_orders_window(),
            currency: CurrencyFormat::default(),
        }
    }
}

impl DashboardConfig {
    /// Rejects settings that deserialize but cannot be honored.
    pub fn validate(&self) -> anyhow::Result<()> {
        let digits = self.display.currency.fraction_digits;
        if digits > MAX_FRACTION_DIGITS {
            anyhow::bail!(
                "display.currency.fraction_digits is {}, at most {} is supported",
                digits,
                MAX_FRACTION_DIGITS
            );
        }
        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_revenue_path() -> String {
    "/api/orders/revenue/total".to_string()
}

fn default_orders_path() -> String {
    "/api/orders".to_string()
}

fn default_interval() -> Interval {
    Interval::Hour
}

fn default_recent_orders_window() -> usize {
    10
}

/// Loads `config/dashboard.*`, overridden by `DASHBOARD__SECTION__KEY` variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
