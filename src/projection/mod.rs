//! Projection engine for the seven-year ledger

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::{
    compute, ProjectionConfig, ProjectionEngine, BONUS_RATE, DIRECT_SHARE,
    LOAN_REPAYMENT_FINAL_YEAR, PROJECTION_YEARS, TAX_RATE,
};
pub use records::{ChartPoint, ProjectionResult, ProjectionSummary, YearRecord, CHART_METRICS};
