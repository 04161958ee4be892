//! FitTrack Library
//!
//! Workout, nutrition and body metrics tracking behind a JSON HTTP API,
//! with interchangeable storage backends.

pub mod build_info;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod storage;

pub use routes::{router, AppState};
