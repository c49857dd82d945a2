// Application state for HTTP handlers
use crate::application::dashboard_service::MetricsDashboard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<MetricsDashboard>,
}
