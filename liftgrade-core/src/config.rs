//! Tunable defaults for grading and prescription adjustment.
//!
//! Everything here deserializes from JSON with every field optional, so a
//! config file only needs to name what it overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::db::models::Prescription;

/// Exercise-type scaling pair. Grades use the midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub min: f64,
    pub max: f64,
}

impl Multiplier {
    pub const NEUTRAL: Multiplier = Multiplier { min: 1.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Inclusive rep band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub min: i32,
    pub max: i32,
}

impl RepRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Values used whenever a prescription row or exercise type leaves a field unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrescriptionDefaults {
    pub min_reps: i32,
    pub max_reps: i32,
    pub multiplier: Multiplier,
}

impl Default for PrescriptionDefaults {
    fn default() -> Self {
        Self {
            min_reps: 8,
            max_reps: 12,
            multiplier: Multiplier::NEUTRAL,
        }
    }
}

/// A prescription row with the current rep range filled in. An unset goal
/// range stays unset and follows the current range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectivePrescription {
    pub min_reps: i32,
    pub max_reps: i32,
    pub goal_min_reps: Option<i32>,
    pub goal_max_reps: Option<i32>,
    pub goal_weight: Option<f64>,
}

impl PrescriptionDefaults {
    pub fn resolve(&self, row: &Prescription) -> EffectivePrescription {
        EffectivePrescription {
            min_reps: row.min_reps.unwrap_or(self.min_reps),
            max_reps: row.max_reps.unwrap_or(self.max_reps),
            goal_min_reps: row.goal_min_reps,
            goal_max_reps: row.goal_max_reps,
            // a zero goal weight counts as never set
            goal_weight: row.goal_weight.filter(|w| *w != 0.0),
        }
    }
}

/// Numeric policy for overload and deload decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionPolicy {
    /// Rep band every overload resets to.
    pub overload_reset: RepRange,
    /// Lowest min/max a deload may shrink the range to.
    pub deload_floor: RepRange,
    pub rep_step: i32,
    /// Overage within `small_overage..=small_overage_max` earns `small_increase`,
    /// at or above `large_overage` earns `large_increase`, anything else nothing.
    pub small_overage: f64,
    pub small_overage_max: f64,
    pub large_overage: f64,
    pub small_increase: f64,
    pub large_increase: f64,
    pub deload_factor: f64,
    /// Weights at or below this round to `light_step`, heavier ones to `heavy_step`.
    pub light_threshold: f64,
    pub light_step: f64,
    pub heavy_step: f64,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            overload_reset: RepRange::new(8, 12),
            deload_floor: RepRange::new(8, 12),
            rep_step: 2,
            small_overage: 1.0,
            small_overage_max: 3.0,
            large_overage: 4.0,
            small_increase: 0.05,
            large_increase: 0.10,
            deload_factor: 0.975,
            light_threshold: 20.0,
            light_step: 2.5,
            heavy_step: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    pub defaults: PrescriptionDefaults,
    pub policy: ProgressionPolicy,
}

impl AdaptationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid adaptation config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&raw)?;
        info!("Loaded adaptation config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No adaptation config given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub database_url: Option<String>,
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok(),
            config_path: env::var("LIFTGRADE_CONFIG").ok().map(PathBuf::from),
            log_level: env::var("LIFTGRADE_LOG").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Prescription {
        Prescription {
            id: 1,
            workout_template_id: 1,
            exercise_id: 1,
            min_reps: None,
            max_reps: Some(10),
            goal_min_reps: None,
            goal_max_reps: Some(15),
            goal_weight: Some(0.0),
        }
    }

    #[test]
    fn resolve_fills_unset_fields() {
        let effective = PrescriptionDefaults::default().resolve(&row());
        assert_eq!(effective.min_reps, 8);
        assert_eq!(effective.max_reps, 10);
        assert_eq!(effective.goal_min_reps, None);
        assert_eq!(effective.goal_max_reps, Some(15));
        assert_eq!(effective.goal_weight, None);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = AdaptationConfig::from_json(
            r#"{"defaults":{"min_reps":6},"policy":{"heavy_step":2.5}}"#,
        )
        .unwrap();
        assert_eq!(config.defaults.min_reps, 6);
        assert_eq!(config.defaults.max_reps, 12);
        assert_eq!(config.defaults.multiplier, Multiplier::NEUTRAL);
        assert_eq!(config.policy.heavy_step, 2.5);
        assert_eq!(config.policy.deload_factor, 0.975);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(
            AdaptationConfig::from_json("{}").unwrap(),
            AdaptationConfig::default()
        );
        assert!(AdaptationConfig::from_json("{").is_err());
    }

    #[test]
    fn midpoint() {
        assert_eq!(Multiplier::new(0.5, 1.5).midpoint(), 1.0);
        assert_eq!(Multiplier::default().midpoint(), 1.0);
    }
}
