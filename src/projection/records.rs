//! Year-by-year ledger output

use serde::{Deserialize, Serialize};

/// Metrics plotted against year by the presentation layer
pub const CHART_METRICS: [&str; 3] = ["Total Revenue", "Total Expenses", "Net Profit"];

/// One row of the projection ledger
///
/// Serialized names match the simulator's column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    #[serde(rename = "Year")]
    pub year: u32,

    // Customers
    #[serde(rename = "New Customers")]
    pub new_customers: f64,
    #[serde(rename = "New Direct")]
    pub new_direct: f64,
    #[serde(rename = "Retained Direct")]
    pub retained_direct: f64,
    #[serde(rename = "Total Direct")]
    pub total_direct: f64,
    #[serde(rename = "New Affiliation")]
    pub new_affiliation: f64,
    #[serde(rename = "Retained Affiliation")]
    pub retained_affiliation: f64,
    #[serde(rename = "Total Affiliation")]
    pub total_affiliation: f64,
    #[serde(rename = "Total Customers")]
    pub total_customers: f64,

    // Revenue
    #[serde(rename = "Direct Revenue")]
    pub direct_revenue: f64,
    #[serde(rename = "Affiliation Net Revenue")]
    pub affiliation_net_revenue: f64,
    #[serde(rename = "Channel B Revenue")]
    pub channel_b_revenue: f64,
    #[serde(rename = "Total Revenue")]
    pub total_revenue: f64,

    // Expenses
    #[serde(rename = "Operating Costs")]
    pub operating_costs: f64,
    #[serde(rename = "Financing Costs")]
    pub financing_costs: f64,
    #[serde(rename = "Total Expenses")]
    pub total_expenses: f64,

    // Profit
    #[serde(rename = "Profit Before Tax")]
    pub profit_before_tax: f64,
    #[serde(rename = "Tax")]
    pub tax: f64,
    #[serde(rename = "Post-Tax Profit")]
    pub post_tax_profit: f64,
    #[serde(rename = "Bonus")]
    pub bonus: f64,
    #[serde(rename = "Net Profit")]
    pub net_profit: f64,
    #[serde(rename = "Cumulative Cash")]
    pub cumulative_cash: f64,
}

impl YearRecord {
    /// Column headers in ledger order
    pub const COLUMNS: [&'static str; 22] = [
        "Year",
        "New Customers",
        "New Direct",
        "Retained Direct",
        "Total Direct",
        "New Affiliation",
        "Retained Affiliation",
        "Total Affiliation",
        "Total Customers",
        "Direct Revenue",
        "Affiliation Net Revenue",
        "Channel B Revenue",
        "Total Revenue",
        "Operating Costs",
        "Financing Costs",
        "Total Expenses",
        "Profit Before Tax",
        "Tax",
        "Post-Tax Profit",
        "Bonus",
        "Net Profit",
        "Cumulative Cash",
    ];

    /// Field values in the same order as `COLUMNS`
    pub fn values(&self) -> [f64; 22] {
        [
            self.year as f64,
            self.new_customers,
            self.new_direct,
            self.retained_direct,
            self.total_direct,
            self.new_affiliation,
            self.retained_affiliation,
            self.total_affiliation,
            self.total_customers,
            self.direct_revenue,
            self.affiliation_net_revenue,
            self.channel_b_revenue,
            self.total_revenue,
            self.operating_costs,
            self.financing_costs,
            self.total_expenses,
            self.profit_before_tax,
            self.tax,
            self.post_tax_profit,
            self.bonus,
            self.net_profit,
            self.cumulative_cash,
        ]
    }

    /// Value of a charted metric by its column name
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "Total Revenue" => Some(self.total_revenue),
            "Total Expenses" => Some(self.total_expenses),
            "Net Profit" => Some(self.net_profit),
            _ => None,
        }
    }
}

/// One (year, metric, amount) point of the long-format chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

/// Complete projection output, ordered by year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub records: Vec<YearRecord>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Add a year record
    pub fn add_record(&mut self, record: YearRecord) {
        self.records.push(record);
    }

    /// Record for a given year
    pub fn year(&self, year: u32) -> Option<&YearRecord> {
        self.records.iter().find(|r| r.year == year)
    }

    /// Long-format series for revenue, expenses and net profit against year
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        self.records
            .iter()
            .flat_map(|r| {
                CHART_METRICS.iter().filter_map(move |&metric| {
                    r.metric(metric).map(|amount| ChartPoint {
                        year: r.year,
                        metric: metric.to_string(),
                        amount,
                    })
                })
            })
            .collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_revenue: f64 = self.records.iter().map(|r| r.total_revenue).sum();
        let total_expenses: f64 = self.records.iter().map(|r| r.total_expenses).sum();
        let total_tax: f64 = self.records.iter().map(|r| r.tax).sum();
        let total_bonus: f64 = self.records.iter().map(|r| r.bonus).sum();
        let total_net_profit: f64 = self.records.iter().map(|r| r.net_profit).sum();

        let final_cumulative_cash = self.records.last().map(|r| r.cumulative_cash).unwrap_or(0.0);

        let lowest = self
            .records
            .iter()
            .min_by(|a, b| a.cumulative_cash.total_cmp(&b.cumulative_cash));

        let first_profitable_year = self
            .records
            .iter()
            .find(|r| r.net_profit > 0.0)
            .map(|r| r.year);

        ProjectionSummary {
            total_years: self.records.len() as u32,
            total_revenue,
            total_expenses,
            total_tax,
            total_bonus,
            total_net_profit,
            final_cumulative_cash,
            min_cumulative_cash: lowest.map(|r| r.cumulative_cash).unwrap_or(0.0),
            min_cash_year: lowest.map(|r| r.year),
            first_profitable_year,
        }
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_tax: f64,
    pub total_bonus: f64,
    pub total_net_profit: f64,
    pub final_cumulative_cash: f64,
    pub min_cumulative_cash: f64,
    pub min_cash_year: Option<u32>,
    pub first_profitable_year: Option<u32>,
}
