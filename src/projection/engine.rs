//! Core projection engine for the seven-year subscription ledger

use log::{debug, info};

use crate::error::Result;
use crate::params::{
    ParameterBundle, ADDITIONAL_REFERRALS_PER_YEAR, AFFILIATION_RETENTION_BY_YEAR,
    DIRECT_RETENTION_BY_YEAR, NEW_CUSTOMERS,
};
use super::records::{ProjectionResult, YearRecord};
use super::state::ProjectionState;

/// Fixed projection horizon in years
pub const PROJECTION_YEARS: u32 = 7;

/// Share of new customers acquired through the direct channel
pub const DIRECT_SHARE: f64 = 0.4;

/// Tax rate on positive profit before tax
pub const TAX_RATE: f64 = 0.25;

/// Bonus rate on positive post-tax profit
pub const BONUS_RATE: f64 = 0.08;

/// Last year in which the annual loan repayment is charged
pub const LOAN_REPAYMENT_FINAL_YEAR: u32 = 5;

/// Policy constants applied by the engine
///
/// `Default` gives the standard contract; the fields exist so a caller can
/// study alternative policies without touching the fold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Direct share of new customers (affiliation gets the remainder)
    pub direct_share: f64,

    /// Tax rate, applied only when profit before tax is positive
    pub tax_rate: f64,

    /// Bonus rate, applied only when post-tax profit is positive
    pub bonus_rate: f64,

    /// Loan repayment is charged in years 1 through this year
    pub loan_repayment_final_year: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            direct_share: DIRECT_SHARE,
            tax_rate: TAX_RATE,
            bonus_rate: BONUS_RATE,
            loan_repayment_final_year: LOAN_REPAYMENT_FINAL_YEAR,
        }
    }
}

impl ProjectionConfig {
    /// Financing cost for a year
    ///
    /// Year 1 and 2 add the owner payout for that year on top of the loan
    /// repayment; the repayment alone runs through the final repayment year;
    /// later years carry no financing cost.
    pub fn financing_cost(&self, params: &ParameterBundle, year: u32) -> f64 {
        match year {
            1 => params.annual_loan_repayment + params.owner_payout_year1,
            2 => params.annual_loan_repayment + params.owner_payout_year2,
            y if y <= self.loan_repayment_final_year => params.annual_loan_repayment,
            _ => 0.0,
        }
    }

    /// Tax owed on a year's profit before tax
    pub fn tax(&self, profit_before_tax: f64) -> f64 {
        if profit_before_tax > 0.0 {
            profit_before_tax * self.tax_rate
        } else {
            0.0
        }
    }

    /// Bonus paid out of a year's post-tax profit
    pub fn bonus(&self, post_tax_profit: f64) -> f64 {
        if post_tax_profit > 0.0 {
            post_tax_profit * self.bonus_rate
        } else {
            0.0
        }
    }
}

/// Main projection engine
///
/// Stateless between calls: every `compute` starts a fresh fold from the
/// bundle's loan principal.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given policy constants
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for years 1 through 7
    pub fn compute(&self, params: &ParameterBundle) -> Result<ProjectionResult> {
        let mut result = ProjectionResult::new();
        let mut state = ProjectionState::from_params(params);

        for _year in 1..=PROJECTION_YEARS {
            let record = self.project_year(params, &state)?;
            debug!(
                "Year {}: revenue {:.2}, net profit {:.2}, cumulative cash {:.2}",
                record.year, record.total_revenue, record.net_profit, record.cumulative_cash
            );
            state.advance(&record);
            result.add_record(record);
        }

        info!(
            "Projected {} years, final cumulative cash {:.2}",
            result.records.len(),
            state.cumulative_cash
        );
        Ok(result)
    }

    /// Calculate one year's ledger row from the carried state
    fn project_year(&self, params: &ParameterBundle, state: &ProjectionState) -> Result<YearRecord> {
        let year = state.year;

        // Customers
        let new_customers = params.new_customers.require(NEW_CUSTOMERS, year)?;
        let new_direct = new_customers * self.config.direct_share;
        let new_affiliation = new_customers * (1.0 - self.config.direct_share);

        let (retained_direct, retained_affiliation) = if state.has_prior_year() {
            let direct_rate = params
                .direct_retention_by_year
                .require(DIRECT_RETENTION_BY_YEAR, year)?;
            let affiliation_rate = params
                .affiliation_retention_by_year
                .require(AFFILIATION_RETENTION_BY_YEAR, year)?;
            (
                state.prev_total_direct * direct_rate,
                state.prev_total_affiliation * affiliation_rate,
            )
        } else {
            (0.0, 0.0)
        };

        let total_direct = new_direct + retained_direct;
        let total_affiliation = new_affiliation + retained_affiliation;
        let total_customers = total_direct + total_affiliation;

        // Revenue
        let referrals = params
            .additional_referrals_per_year
            .require(ADDITIONAL_REFERRALS_PER_YEAR, year)?;
        let direct_revenue = total_direct * params.direct_fee;
        let affiliation_net_revenue = total_affiliation * params.affiliation_net_fee;
        let channel_b_revenue = referrals * params.channel_b_new_rev;
        let total_revenue = direct_revenue + affiliation_net_revenue + channel_b_revenue;

        // Expenses
        let financing_costs = self.config.financing_cost(params, year);
        let total_expenses = params.operating_expenses + financing_costs;

        // Profit
        let profit_before_tax = total_revenue - total_expenses;
        let tax = self.config.tax(profit_before_tax);
        let post_tax_profit = profit_before_tax - tax;
        let bonus = self.config.bonus(post_tax_profit);
        let net_profit = post_tax_profit - bonus;

        Ok(YearRecord {
            year,
            new_customers,
            new_direct,
            retained_direct,
            total_direct,
            new_affiliation,
            retained_affiliation,
            total_affiliation,
            total_customers,
            direct_revenue,
            affiliation_net_revenue,
            channel_b_revenue,
            total_revenue,
            operating_costs: params.operating_expenses,
            financing_costs,
            total_expenses,
            profit_before_tax,
            tax,
            post_tax_profit,
            bonus,
            net_profit,
            cumulative_cash: state.cumulative_cash + net_profit,
        })
    }
}

/// Run the projection with the standard policy constants
pub fn compute(params: &ParameterBundle) -> Result<ProjectionResult> {
    ProjectionEngine::default().compute(params)
}
