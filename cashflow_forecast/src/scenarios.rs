//! Stress and upside variants of the baseline forecast

use crate::config::ScenarioFactors;
use serde::Serialize;

/// Scenario names in output order
pub const SCENARIO_NAMES: [&str; 4] = ["baseline", "optimistic", "pessimistic", "severe_stress"];

/// Named forecast sequences over the same horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    pub baseline: Vec<f64>,
    pub optimistic: Vec<f64>,
    pub pessimistic: Vec<f64>,
    pub severe_stress: Vec<f64>,
}

impl ScenarioSet {
    /// Look a scenario up by name
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        match name {
            "baseline" => Some(&self.baseline),
            "optimistic" => Some(&self.optimistic),
            "pessimistic" => Some(&self.pessimistic),
            "severe_stress" => Some(&self.severe_stress),
            _ => None,
        }
    }

    /// `(name, values)` pairs in [`SCENARIO_NAMES`] order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[f64])> {
        [
            self.baseline.as_slice(),
            self.optimistic.as_slice(),
            self.pessimistic.as_slice(),
            self.severe_stress.as_slice(),
        ]
        .into_iter()
        .zip(SCENARIO_NAMES)
        .map(|(values, name)| (name, values))
    }

    /// Number of months in each scenario
    pub fn horizon(&self) -> usize {
        self.baseline.len()
    }
}

/// Scales a baseline forecast by fixed multipliers
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioGenerator {
    factors: ScenarioFactors,
}

impl ScenarioGenerator {
    pub fn new(factors: ScenarioFactors) -> Self {
        Self { factors }
    }

    /// Multiply `baseline` element-wise by each scenario factor
    pub fn generate(&self, baseline: &[f64]) -> ScenarioSet {
        let scale = |factor: f64| baseline.iter().map(|v| v * factor).collect::<Vec<f64>>();
        ScenarioSet {
            baseline: scale(self.factors.baseline),
            optimistic: scale(self.factors.optimistic),
            pessimistic: scale(self.factors.pessimistic),
            severe_stress: scale(self.factors.severe_stress),
        }
    }
}
