// Error taxonomy for the metrics synchronization core
use crate::domain::trend::Axis;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    /// A single fetch or push source failed. Caught at its own boundary.
    #[error("{source_name} unavailable: {message}")]
    SourceUnavailable {
        source_name: &'static str,
        message: String,
    },

    /// Both the batch metrics endpoint and the fallback computation failed.
    #[error("order metrics unavailable: primary and fallback sources failed")]
    FallbackExhausted,

    /// A trend response arrived after a newer interval switch on the same axis.
    #[error("stale {axis} trend response (sequence {sequence})")]
    StaleResponse { axis: Axis, sequence: u64 },

    #[error("realtime subscription already closed")]
    SubscriptionClosed,
}

impl DashboardError {
    pub fn unavailable(source_name: &'static str, err: &anyhow::Error) -> Self {
        DashboardError::SourceUnavailable {
            source_name,
            message: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
