//! Load parameter bundles from JSON documents and year tables from CSV
//!
//! JSON is walked as a `serde_json::Value` rather than deserialized straight
//! into `ParameterBundle` so that a bad or missing field is reported by name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::bundle::{
    affiliation_net_fee, ParameterBundle, YearSeries, ADDITIONAL_REFERRALS_PER_YEAR,
    AFFILIATION_RETENTION_BY_YEAR, DEFAULT_LOAN_PRINCIPAL, DIRECT_RETENTION_BY_YEAR,
    NEW_CUSTOMERS,
};
use crate::error::{ProjectionError, Result};
use crate::projection::PROJECTION_YEARS;

/// Keys read from a JSON bundle; anything else is reported and skipped
const KNOWN_KEYS: &[&str] = &[
    "loan_principal",
    NEW_CUSTOMERS,
    DIRECT_RETENTION_BY_YEAR,
    AFFILIATION_RETENTION_BY_YEAR,
    ADDITIONAL_REFERRALS_PER_YEAR,
    "direct_fee",
    "affiliation_net_fee",
    "affiliation_gross_fee",
    "affiliation_referral_pct",
    "channel_b_new_rev",
    "operating_expenses",
    "annual_loan_repayment",
    "owner_payout_year1",
    "owner_payout_year2",
];

/// Build a bundle from a parsed JSON object
pub fn bundle_from_value(value: &Value) -> Result<ParameterBundle> {
    let obj = value
        .as_object()
        .ok_or_else(|| ProjectionError::invalid("parameters", "expected a JSON object"))?;

    for key in obj.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!("Ignoring unused parameter '{}'", key);
        }
    }

    let loan_principal = match obj.get("loan_principal") {
        Some(value) => number("loan_principal", value)?,
        None => DEFAULT_LOAN_PRINCIPAL,
    };

    Ok(ParameterBundle {
        loan_principal,
        new_customers: series(obj, NEW_CUSTOMERS)?,
        direct_retention_by_year: series(obj, DIRECT_RETENTION_BY_YEAR)?,
        affiliation_retention_by_year: series(obj, AFFILIATION_RETENTION_BY_YEAR)?,
        additional_referrals_per_year: series(obj, ADDITIONAL_REFERRALS_PER_YEAR)?,
        direct_fee: scalar(obj, "direct_fee")?,
        affiliation_net_fee: net_fee(obj)?,
        channel_b_new_rev: scalar(obj, "channel_b_new_rev")?,
        operating_expenses: scalar(obj, "operating_expenses")?,
        annual_loan_repayment: scalar(obj, "annual_loan_repayment")?,
        owner_payout_year1: scalar(obj, "owner_payout_year1")?,
        owner_payout_year2: scalar(obj, "owner_payout_year2")?,
    })
}

/// Parse a bundle from JSON text
pub fn bundle_from_json_str(text: &str) -> Result<ParameterBundle> {
    let value: Value = serde_json::from_str(text)?;
    bundle_from_value(&value)
}

/// Load a bundle from any reader (e.g., string buffer, request body)
pub fn load_bundle_from_reader<R: Read>(reader: R) -> Result<ParameterBundle> {
    let value: Value = serde_json::from_reader(reader)?;
    bundle_from_value(&value)
}

/// Load a bundle from a JSON file
pub fn load_bundle<P: AsRef<Path>>(path: P) -> Result<ParameterBundle> {
    let file = File::open(path)?;
    load_bundle_from_reader(std::io::BufReader::new(file))
}

/// Net fee given directly, or derived from gross fee and referral percentage
fn net_fee(obj: &Map<String, Value>) -> Result<f64> {
    if obj.contains_key("affiliation_net_fee") {
        return scalar(obj, "affiliation_net_fee");
    }
    if obj.contains_key("affiliation_gross_fee") {
        let gross = scalar(obj, "affiliation_gross_fee")?;
        let pct = scalar(obj, "affiliation_referral_pct")?;
        return Ok(affiliation_net_fee(gross, pct));
    }
    Err(ProjectionError::invalid(
        "affiliation_net_fee",
        "required scalar is absent",
    ))
}

fn scalar(obj: &Map<String, Value>, field: &str) -> Result<f64> {
    match obj.get(field) {
        Some(value) => number(field, value),
        None => Err(ProjectionError::invalid(field, "required scalar is absent")),
    }
}

fn number(field: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProjectionError::invalid(field, "number out of range")),
        Value::Object(_) => Err(ProjectionError::invalid(
            field,
            "expected a number, found a mapping",
        )),
        other => Err(ProjectionError::invalid(
            field,
            format!("expected a number, found {}", kind(other)),
        )),
    }
}

fn series(obj: &Map<String, Value>, field: &str) -> Result<YearSeries> {
    let entries = match obj.get(field) {
        Some(Value::Object(entries)) => entries,
        Some(Value::Number(_)) => {
            return Err(ProjectionError::invalid(
                field,
                "expected a mapping by year, found a scalar",
            ))
        }
        Some(other) => {
            return Err(ProjectionError::invalid(
                field,
                format!("expected a mapping by year, found {}", kind(other)),
            ))
        }
        None => return Err(ProjectionError::invalid(field, "required mapping is absent")),
    };

    let mut out = YearSeries::new();
    for (key, value) in entries {
        let year: u32 = key.trim().parse().map_err(|_| {
            ProjectionError::invalid(field, format!("year key '{}' is not an integer", key))
        })?;
        if !(1..=PROJECTION_YEARS).contains(&year) {
            debug!("{}: year {} is outside the projection horizon", field, year);
        }
        out.insert(year, number(field, value)?);
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

/// Raw CSV row of per-year inputs
#[derive(Debug, Deserialize)]
struct YearRow {
    #[serde(rename = "Year")]
    year: u32,
    #[serde(rename = "NewCustomers")]
    new_customers: f64,
    #[serde(rename = "DirectRetention")]
    direct_retention: Option<f64>,
    #[serde(rename = "AffiliationRetention")]
    affiliation_retention: Option<f64>,
    #[serde(rename = "AdditionalReferrals")]
    additional_referrals: f64,
}

/// Year-indexed inputs read from a CSV table
///
/// Retention cells may be left blank for year 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearInputs {
    pub new_customers: YearSeries,
    pub direct_retention_by_year: YearSeries,
    pub affiliation_retention_by_year: YearSeries,
    pub additional_referrals_per_year: YearSeries,
}

impl YearInputs {
    /// Replace the year-indexed fields of a bundle with this table
    pub fn apply_to(self, bundle: &mut ParameterBundle) {
        bundle.new_customers = self.new_customers;
        bundle.direct_retention_by_year = self.direct_retention_by_year;
        bundle.affiliation_retention_by_year = self.affiliation_retention_by_year;
        bundle.additional_referrals_per_year = self.additional_referrals_per_year;
    }
}

/// Load year inputs from any reader
pub fn load_year_inputs_from_reader<R: Read>(reader: R) -> Result<YearInputs> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut inputs = YearInputs::default();

    for result in csv_reader.deserialize() {
        let row: YearRow = result?;
        inputs.new_customers.insert(row.year, row.new_customers);
        inputs
            .additional_referrals_per_year
            .insert(row.year, row.additional_referrals);
        if let Some(rate) = row.direct_retention {
            inputs.direct_retention_by_year.insert(row.year, rate);
        }
        if let Some(rate) = row.affiliation_retention {
            inputs.affiliation_retention_by_year.insert(row.year, rate);
        }
    }

    Ok(inputs)
}

/// Load year inputs from a CSV file
pub fn load_year_inputs<P: AsRef<Path>>(path: P) -> Result<YearInputs> {
    let file = File::open(path)?;
    load_year_inputs_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn full_json() -> Value {
        json!({
            "loan_principal": 2_500_000,
            "new_customers": {"1": 10, "2": 10, "3": 10, "4": 10, "5": 10, "6": 10, "7": 10},
            "direct_retention_by_year": {"2": 0.9, "3": 0.9, "4": 0.9, "5": 0.9, "6": 0.9, "7": 0.9},
            "affiliation_retention_by_year": {"2": 0.75, "3": 0.75, "4": 0.75, "5": 0.75, "6": 0.75, "7": 0.75},
            "additional_referrals_per_year": {"1": 10, "2": 10, "3": 10, "4": 10, "5": 10, "6": 10, "7": 10},
            "direct_fee": 39000,
            "affiliation_net_fee": 28000,
            "channel_b_new_rev": 10000,
            "operating_expenses": 524000,
            "annual_loan_repayment": 553750,
            "owner_payout_year1": 525000,
            "owner_payout_year2": 520000
        })
    }

    fn expect_invalid(result: Result<ParameterBundle>, expected_field: &str) {
        match result {
            Err(ProjectionError::InvalidParameter { field, .. }) => {
                assert_eq!(field, expected_field)
            }
            other => panic!("expected InvalidParameter for {}, got {:?}", expected_field, other),
        }
    }

    #[test]
    fn test_full_bundle_parses() {
        let bundle = bundle_from_value(&full_json()).unwrap();
        assert_relative_eq!(bundle.loan_principal, 2_500_000.0);
        assert_relative_eq!(bundle.direct_fee, 39_000.0);
        assert_eq!(bundle.new_customers.get(7), Some(10.0));
        assert_eq!(bundle.direct_retention_by_year.get(1), None);
        assert!(bundle.check_complete().is_ok());
    }

    #[test]
    fn test_loan_principal_defaults() {
        let mut value = full_json();
        value.as_object_mut().unwrap().remove("loan_principal");
        let bundle = bundle_from_value(&value).unwrap();
        assert_relative_eq!(bundle.loan_principal, DEFAULT_LOAN_PRINCIPAL);
    }

    #[test]
    fn test_net_fee_derived_from_gross() {
        let mut value = full_json();
        let obj = value.as_object_mut().unwrap();
        obj.remove("affiliation_net_fee");
        obj.insert("affiliation_gross_fee".into(), json!(35000));
        obj.insert("affiliation_referral_pct".into(), json!(0.2));
        let bundle = bundle_from_value(&value).unwrap();
        assert_relative_eq!(bundle.affiliation_net_fee, 28_000.0);
    }

    #[test]
    fn test_missing_scalar_is_invalid() {
        let mut value = full_json();
        value.as_object_mut().unwrap().remove("operating_expenses");
        expect_invalid(bundle_from_value(&value), "operating_expenses");
    }

    #[test]
    fn test_missing_net_and_gross_fee_is_invalid() {
        let mut value = full_json();
        value.as_object_mut().unwrap().remove("affiliation_net_fee");
        expect_invalid(bundle_from_value(&value), "affiliation_net_fee");
    }

    #[test]
    fn test_scalar_where_mapping_expected() {
        let mut value = full_json();
        value["new_customers"] = json!(10);
        expect_invalid(bundle_from_value(&value), "new_customers");
    }

    #[test]
    fn test_mapping_where_scalar_expected() {
        let mut value = full_json();
        value["direct_fee"] = json!({"1": 39000});
        expect_invalid(bundle_from_value(&value), "direct_fee");
    }

    #[test]
    fn test_string_value_is_invalid() {
        let mut value = full_json();
        value["channel_b_new_rev"] = json!("10000");
        expect_invalid(bundle_from_value(&value), "channel_b_new_rev");
    }

    #[test]
    fn test_non_integer_year_key() {
        let mut value = full_json();
        value["additional_referrals_per_year"] = json!({"one": 10});
        expect_invalid(bundle_from_value(&value), "additional_referrals_per_year");
    }

    #[test]
    fn test_top_level_must_be_object() {
        expect_invalid(bundle_from_value(&json!([1, 2, 3])), "parameters");
    }

    #[test]
    fn test_unused_keys_are_tolerated() {
        let mut value = full_json();
        value["channel_b_retained_rev"] = json!(4000);
        assert!(bundle_from_value(&value).is_ok());
    }

    #[test]
    fn test_bundle_from_json_str() {
        let text = serde_json::to_string(&full_json()).unwrap();
        let bundle = bundle_from_json_str(&text).unwrap();
        assert_relative_eq!(bundle.owner_payout_year2, 520_000.0);

        assert!(matches!(
            bundle_from_json_str("{not json"),
            Err(ProjectionError::Json(_))
        ));
    }

    #[test]
    fn test_load_year_inputs_from_reader() {
        let data = "\
Year,NewCustomers,DirectRetention,AffiliationRetention,AdditionalReferrals
1,12,,,5
2,14,0.85,0.7,6
3,16,0.8,0.65,7
";
        let inputs = load_year_inputs_from_reader(data.as_bytes()).unwrap();
        assert_eq!(inputs.new_customers.get(3), Some(16.0));
        assert_eq!(inputs.direct_retention_by_year.get(1), None);
        assert_eq!(inputs.affiliation_retention_by_year.get(2), Some(0.7));
        assert_eq!(inputs.additional_referrals_per_year.len(), 3);

        let mut bundle = ParameterBundle::default_inputs();
        inputs.apply_to(&mut bundle);
        assert_eq!(bundle.new_customers.get(1), Some(12.0));
        // Only three years supplied
        assert!(matches!(
            bundle.check_complete(),
            Err(ProjectionError::MissingParameter { year: 4, .. })
        ));
    }

    #[test]
    fn test_load_sample_files() {
        let mut bundle = load_bundle("data/sample_params.json").expect("Failed to load sample params");
        assert_relative_eq!(bundle.affiliation_net_fee, 28_000.0);
        assert!(bundle.check_complete().is_ok());

        let years = load_year_inputs("data/sample_years.csv").expect("Failed to load sample years");
        years.apply_to(&mut bundle);
        assert_eq!(bundle.new_customers.get(7), Some(22.0));
        assert!(bundle.check_complete().is_ok());
    }

    #[test]
    fn test_load_bundle_missing_file() {
        assert!(matches!(
            load_bundle("data/does_not_exist.json"),
            Err(ProjectionError::Io(_))
        ));
    }

    #[test]
    fn test_year_inputs_bad_number() {
        let data = "Year,NewCustomers,DirectRetention,AffiliationRetention,AdditionalReferrals\n1,ten,,,5\n";
        assert!(matches!(
            load_year_inputs_from_reader(data.as_bytes()),
            Err(ProjectionError::Csv(_))
        ));
    }
}
