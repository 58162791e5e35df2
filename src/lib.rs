//! LendHub Item Lending Server
//!
//! A Rust implementation of the LendHub peer-to-peer lending server,
//! providing a REST JSON API for listing items, booking them for a time
//! interval, and walking bookings through their approval lifecycle.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
