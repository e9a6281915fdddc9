//! State carried from one projection year to the next

use crate::params::ParameterBundle;
use super::records::YearRecord;

/// Running totals between years
///
/// Only the prior year's channel totals feed retention; cash is a strict
/// running sum seeded from the loan principal.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Year about to be computed (1-indexed)
    pub year: u32,

    /// Prior year's total direct customers
    pub prev_total_direct: f64,

    /// Prior year's total affiliation customers
    pub prev_total_affiliation: f64,

    /// Cash balance after the last computed year
    pub cumulative_cash: f64,
}

impl ProjectionState {
    /// Initialize state before year 1
    pub fn from_params(params: &ParameterBundle) -> Self {
        Self {
            year: 1,
            prev_total_direct: 0.0,
            prev_total_affiliation: 0.0,
            cumulative_cash: params.loan_principal,
        }
    }

    /// Whether a prior year exists to retain customers from
    pub fn has_prior_year(&self) -> bool {
        self.year > 1
    }

    /// Carry a finished year forward
    pub fn advance(&mut self, record: &YearRecord) {
        self.prev_total_direct = record.total_direct;
        self.prev_total_affiliation = record.total_affiliation;
        self.cumulative_cash = record.cumulative_cash;
        self.year += 1;
    }
}
