pub mod data_manager;
pub mod metrics;
pub mod statsapi;
