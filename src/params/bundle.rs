//! Input parameter bundle for a projection run

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::projection::PROJECTION_YEARS;

/// Default starting cash balance when no loan principal is supplied
pub const DEFAULT_LOAN_PRINCIPAL: f64 = 2_500_000.0;

// Field names used in error reporting and in the JSON/CSV inputs
pub const NEW_CUSTOMERS: &str = "new_customers";
pub const DIRECT_RETENTION_BY_YEAR: &str = "direct_retention_by_year";
pub const AFFILIATION_RETENTION_BY_YEAR: &str = "affiliation_retention_by_year";
pub const ADDITIONAL_REFERRALS_PER_YEAR: &str = "additional_referrals_per_year";

/// Values keyed by projection year (1-indexed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearSeries(BTreeMap<u32, f64>);

impl YearSeries {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Same value for every year of the horizon
    pub fn constant(value: f64) -> Self {
        Self((1..=PROJECTION_YEARS).map(|year| (year, value)).collect())
    }

    /// Same value for every year in `years`
    pub fn constant_over(years: impl IntoIterator<Item = u32>, value: f64) -> Self {
        Self(years.into_iter().map(|year| (year, value)).collect())
    }

    pub fn insert(&mut self, year: u32, value: f64) -> Option<f64> {
        self.0.insert(year, value)
    }

    pub fn remove(&mut self, year: u32) -> Option<f64> {
        self.0.remove(&year)
    }

    pub fn get(&self, year: u32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    /// Look up a year, failing with the owning field's name when absent
    pub fn require(&self, field: &str, year: u32) -> Result<f64> {
        self.get(year).ok_or_else(|| ProjectionError::missing(field, year))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&year, &value)| (year, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, f64)> for YearSeries {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Net revenue per affiliation customer after the referral partner's cut
pub fn affiliation_net_fee(gross_fee: f64, referral_pct: f64) -> f64 {
    gross_fee * (1.0 - referral_pct)
}

/// Business inputs for one projection run
///
/// Year-indexed fields are keyed 1..=7. Retention rates are only read for
/// years 2..=7 since year 1 has no prior-year customers to retain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBundle {
    /// Starting cumulative cash balance
    pub loan_principal: f64,

    /// New customers acquired each year
    pub new_customers: YearSeries,

    /// Fraction of prior-year direct customers retained
    pub direct_retention_by_year: YearSeries,

    /// Fraction of prior-year affiliation customers retained
    pub affiliation_retention_by_year: YearSeries,

    /// Third-channel referral volume per year
    pub additional_referrals_per_year: YearSeries,

    /// Annual revenue per direct customer
    pub direct_fee: f64,

    /// Annual net revenue per affiliation customer
    pub affiliation_net_fee: f64,

    /// Revenue per unit of third-channel referral volume
    pub channel_b_new_rev: f64,

    /// Fixed annual operating cost
    pub operating_expenses: f64,

    /// Loan service cost, charged through the final repayment year
    pub annual_loan_repayment: f64,

    pub owner_payout_year1: f64,
    pub owner_payout_year2: f64,
}

impl ParameterBundle {
    /// Inputs matching the simulator's stock form values
    pub fn default_inputs() -> Self {
        Self {
            loan_principal: DEFAULT_LOAN_PRINCIPAL,
            new_customers: YearSeries::constant(10.0),
            direct_retention_by_year: YearSeries::constant(0.9),
            affiliation_retention_by_year: YearSeries::constant(0.75),
            additional_referrals_per_year: YearSeries::constant(10.0),
            direct_fee: 39_000.0,
            affiliation_net_fee: affiliation_net_fee(35_000.0, 0.2),
            channel_b_new_rev: 10_000.0,
            operating_expenses: 524_000.0,
            annual_loan_repayment: 553_750.0,
            owner_payout_year1: 525_000.0,
            owner_payout_year2: 520_000.0,
        }
    }

    /// Check that every year the engine will read is present
    pub fn check_complete(&self) -> Result<()> {
        for year in 1..=PROJECTION_YEARS {
            self.new_customers.require(NEW_CUSTOMERS, year)?;
            self.additional_referrals_per_year
                .require(ADDITIONAL_REFERRALS_PER_YEAR, year)?;
            if year > 1 {
                self.direct_retention_by_year
                    .require(DIRECT_RETENTION_BY_YEAR, year)?;
                self.affiliation_retention_by_year
                    .require(AFFILIATION_RETENTION_BY_YEAR, year)?;
            }
        }
        Ok(())
    }

    /// Read a scalar field by its input name
    pub fn scalar(&self, field: &str) -> Option<f64> {
        match field {
            "loan_principal" => Some(self.loan_principal),
            "direct_fee" => Some(self.direct_fee),
            "affiliation_net_fee" => Some(self.affiliation_net_fee),
            "channel_b_new_rev" => Some(self.channel_b_new_rev),
            "operating_expenses" => Some(self.operating_expenses),
            "annual_loan_repayment" => Some(self.annual_loan_repayment),
            "owner_payout_year1" => Some(self.owner_payout_year1),
            "owner_payout_year2" => Some(self.owner_payout_year2),
            _ => None,
        }
    }

    /// Mutable access to a scalar field by its input name
    pub fn scalar_mut(&mut self, field: &str) -> Option<&mut f64> {
        match field {
            "loan_principal" => Some(&mut self.loan_principal),
            "direct_fee" => Some(&mut self.direct_fee),
            "affiliation_net_fee" => Some(&mut self.affiliation_net_fee),
            "channel_b_new_rev" => Some(&mut self.channel_b_new_rev),
            "operating_expenses" => Some(&mut self.operating_expenses),
            "annual_loan_repayment" => Some(&mut self.annual_loan_repayment),
            "owner_payout_year1" => Some(&mut self.owner_payout_year1),
            "owner_payout_year2" => Some(&mut self.owner_payout_year2),
            _ => None,
        }
    }

    /// Copy of this bundle with one scalar field replaced
    pub fn with_scalar(&self, field: &str, value: f64) -> Result<Self> {
        let mut bundle = self.clone();
        let slot = bundle
            .scalar_mut(field)
            .ok_or_else(|| ProjectionError::invalid(field, "not a scalar parameter"))?;
        *slot = value;
        Ok(bundle)
    }
}

impl Default for ParameterBundle {
    fn default() -> Self {
        Self::default_inputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_affiliation_net_fee() {
        assert_relative_eq!(affiliation_net_fee(35_000.0, 0.2), 28_000.0);
        assert_relative_eq!(affiliation_net_fee(35_000.0, 0.0), 35_000.0);
    }

    #[test]
    fn test_default_inputs_are_complete() {
        let bundle = ParameterBundle::default_inputs();
        assert!(bundle.check_complete().is_ok());
        assert_relative_eq!(bundle.affiliation_net_fee, 28_000.0);
        assert_eq!(bundle.new_customers.len(), 7);
    }

    #[test]
    fn test_require_reports_field() {
        let mut series = YearSeries::constant(1.0);
        series.remove(3);
        match series.require("new_customers", 3) {
            Err(ProjectionError::MissingParameter { field, year }) => {
                assert_eq!(field, "new_customers");
                assert_eq!(year, 3);
            }
            other => panic!("expected MissingParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_year_one_retention_not_required() {
        let mut bundle = ParameterBundle::default_inputs();
        bundle.direct_retention_by_year.remove(1);
        bundle.affiliation_retention_by_year.remove(1);
        assert!(bundle.check_complete().is_ok());
    }

    #[test]
    fn test_with_scalar() {
        let bundle = ParameterBundle::default_inputs();
        let changed = bundle.with_scalar("direct_fee", 45_000.0).unwrap();
        assert_relative_eq!(changed.direct_fee, 45_000.0);
        assert_relative_eq!(bundle.direct_fee, 39_000.0);

        assert!(matches!(
            bundle.with_scalar("new_customers", 1.0),
            Err(ProjectionError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_series_json_uses_year_keys() {
        let series = YearSeries::constant_over(1..=2, 0.5);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"1":0.5,"2":0.5}"#);
        let back: YearSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }
}
