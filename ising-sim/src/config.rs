use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::geometry::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataSettings {
    pub saves_folder: PathBuf,
    /// File name for each run's table; `{index}`, `{temperature}` and
    /// `{field}` are substituted.
    pub filename_pattern: String,
    /// Macro-steps per run.
    #[validate(range(min = 1))]
    pub macro_sample_count: usize,
    /// Micro-samples recorded inside each macro-step.
    #[validate(range(min = 1))]
    pub micro_sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitialConditions {
    pub temperature0: f64,
    pub temperature_step: f64,
    pub field0: f64,
    pub field_step: f64,
    #[validate(range(min = 1))]
    pub simulation_count: usize,
    #[validate(range(min = 1))]
    pub max_concurrent: usize,
    /// Base seed; run `i` uses `seed + i`. Drawn at random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LatticeSettings {
    #[validate(range(min = 2))]
    pub grid_edge_length: usize,
    #[validate(range(min = 1))]
    pub attempt_density_per_site: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[validate(range(min = 1))]
    pub frames_per_second: u64,
    pub enable_visualization: bool,
}

fn validate_settings(cfg: &Settings) -> std::result::Result<(), ValidationError> {
    if cfg.total_attempts() < cfg.data.macro_sample_count {
        return Err(ValidationError::new(
            "gridEdgeLength^2 * attemptDensityPerSite must be >= macroSampleCount",
        ));
    }
    let temps = [
        cfg.initial_conditions.temperature0,
        cfg.temperature(cfg.initial_conditions.simulation_count.saturating_sub(1)),
    ];
    if temps.iter().any(|&t| !(t.is_finite() && t > 0.0)) {
        return Err(ValidationError::new(
            "every temperature in the sweep must be finite and > 0",
        ));
    }
    Ok(())
}

/// Batch settings, read from a JSON document with the groups `data`,
/// `initialConditions`, `lattice` and `display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_settings"))]
pub struct Settings {
    #[validate]
    pub data: DataSettings,
    #[validate]
    pub initial_conditions: InitialConditions,
    #[validate]
    pub lattice: LatticeSettings,
    #[validate]
    pub display: DisplaySettings,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn extent(&self) -> Position {
        let edge = self.lattice.grid_edge_length as i64;
        Position::new(edge, edge)
    }

    /// Attempts per run: `edge^2 * density`.
    pub fn total_attempts(&self) -> usize {
        let edge = self.lattice.grid_edge_length;
        edge * edge * self.lattice.attempt_density_per_site
    }

    pub fn attempts_per_macro_step(&self) -> usize {
        self.total_attempts() / self.data.macro_sample_count
    }

    /// Macro-steps per run. Equals `macroSampleCount` whenever it divides the
    /// total attempt count.
    pub fn max_steps(&self) -> usize {
        self.total_attempts() / self.attempts_per_macro_step()
    }

    pub fn temperature(&self, index: usize) -> f64 {
        let ic = &self.initial_conditions;
        ic.temperature0 + index as f64 * ic.temperature_step
    }

    pub fn field(&self, index: usize) -> f64 {
        let ic = &self.initial_conditions;
        ic.field0 + index as f64 * ic.field_step
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.display.frames_per_second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": {
            "savesFolder": "saves",
            "filenamePattern": "run_{index}.tsv",
            "macroSampleCount": 100,
            "microSampleCount": 10
        },
        "initialConditions": {
            "temperature0": 1.0,
            "temperatureStep": 0.25,
            "field0": 0.0,
            "fieldStep": 0.01,
            "simulationCount": 8,
            "maxConcurrent": 4
        },
        "lattice": { "gridEdgeLength": 64, "attemptDensityPerSite": 500 },
        "display": { "framesPerSecond": 20, "enableVisualization": false }
    }"#;

    #[test]
    fn test_parse_and_derive() {
        let s = Settings::from_json(SAMPLE).unwrap();
        assert_eq!(s.initial_conditions.seed, None);
        assert_eq!(s.extent(), Position::new(64, 64));
        assert_eq!(s.total_attempts(), 64 * 64 * 500);
        assert_eq!(s.attempts_per_macro_step(), 64 * 64 * 5);
        assert_eq!(s.max_steps(), 100);
        assert_eq!(s.temperature(4), 2.0);
        assert!((s.field(3) - 0.03).abs() < 1e-12);
        assert_eq!(s.redraw_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_rejects_bad_values() {
        let no_micro = SAMPLE.replace("\"microSampleCount\": 10", "\"microSampleCount\": 0");
        assert!(matches!(
            Settings::from_json(&no_micro),
            Err(crate::error::IsingError::Validation(_))
        ));

        let bad_concurrency = SAMPLE.replace("\"maxConcurrent\": 4", "\"maxConcurrent\": 0");
        assert!(Settings::from_json(&bad_concurrency).is_err());

        let tiny_grid = SAMPLE.replace("\"gridEdgeLength\": 64", "\"gridEdgeLength\": 1");
        assert!(Settings::from_json(&tiny_grid).is_err());

        let too_many_steps = SAMPLE
            .replace("\"gridEdgeLength\": 64", "\"gridEdgeLength\": 2")
            .replace("\"attemptDensityPerSite\": 500", "\"attemptDensityPerSite\": 1");
        assert!(Settings::from_json(&too_many_steps).is_err());

        let cold = SAMPLE.replace("\"temperatureStep\": 0.25", "\"temperatureStep\": -0.5");
        assert!(Settings::from_json(&cold).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ \"data\": "),
            Err(crate::error::IsingError::Json(_))
        ));
        let missing = SAMPLE.replace("\"display\"", "\"graphics\"");
        assert!(Settings::from_json(&missing).is_err());
    }
}
