//! Projection inputs and their loaders

mod bundle;
pub mod loader;

pub use bundle::{
    affiliation_net_fee, ParameterBundle, YearSeries, ADDITIONAL_REFERRALS_PER_YEAR,
    AFFILIATION_RETENTION_BY_YEAR, DEFAULT_LOAN_PRINCIPAL, DIRECT_RETENTION_BY_YEAR,
    NEW_CUSTOMERS,
};
pub use loader::{
    bundle_from_json_str, bundle_from_value, load_bundle, load_bundle_from_reader,
    load_year_inputs, load_year_inputs_from_reader, YearInputs,
};
