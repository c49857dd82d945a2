// Domain layer - Plain data and pure projections
pub mod metrics;
pub mod trend;
pub mod view;
