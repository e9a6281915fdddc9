//! Subscription Projection - seven-year financial projection for a two-channel subscription business
//!
//! This library provides:
//! - Parameter bundles with year-indexed acquisition, retention, and referral inputs
//! - A sequential year-by-year projection engine (retention, revenue, financing, tax, bonus)
//! - A 22-column ledger with running cumulative cash, summaries, and chart series
//! - Scenario batches and single-field sensitivity sweeps
//! - CSV / JSON loaders and renderers

pub mod error;
pub mod params;
pub mod projection;
pub mod scenario;
pub mod output;
pub mod config;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use params::{ParameterBundle, YearSeries};
pub use projection::{compute, ProjectionConfig, ProjectionEngine, ProjectionResult, YearRecord};
pub use scenario::ScenarioRunner;
pub use config::AppConfig;
