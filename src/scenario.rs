//! Scenario runner for comparing several parameter bundles
//!
//! Holds one engine configuration and evaluates independent bundles against
//! it. Each bundle is still folded year by year; only separate bundles are
//! spread across threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::ParameterBundle;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionSummary};

/// Outcome of one point in a sensitivity sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub field: String,
    pub value: f64,
    pub summary: ProjectionSummary,
}

/// Runs projections against a fixed engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let points = runner.sweep(&base, "direct_fee", &[35_000.0, 39_000.0, 45_000.0])?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with the standard policy constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with custom policy constants
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Run a single projection
    pub fn run(&self, params: &ParameterBundle) -> Result<ProjectionResult> {
        self.engine.compute(params)
    }

    /// Run projections for several bundles, preserving input order
    pub fn run_batch(&self, bundles: &[ParameterBundle]) -> Vec<Result<ProjectionResult>> {
        bundles
            .par_iter()
            .map(|params| self.engine.compute(params))
            .collect()
    }

    /// Vary one scalar field over `values`, holding everything else fixed
    pub fn sweep(
        &self,
        base: &ParameterBundle,
        field: &str,
        values: &[f64],
    ) -> Result<Vec<SensitivityPoint>> {
        let bundles = values
            .iter()
            .map(|&value| base.with_scalar(field, value))
            .collect::<Result<Vec<_>>>()?;

        self.run_batch(&bundles)
            .into_iter()
            .zip(values)
            .map(|(result, &value)| {
                Ok(SensitivityPoint {
                    field: field.to_string(),
                    value,
                    summary: result?.summary(),
                })
            })
            .collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }
}
