// Metrics synchronization core for the order dashboard
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
