//! Terminal dashboard for the pre-aggregated statistics of a game backend.

pub mod model;
pub mod service;
pub mod ui;
