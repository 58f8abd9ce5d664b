//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::calculation::DailyCalculator;
use crate::error::{EngineError, EngineResult};
use crate::models::{DayPlanConfig, MonthlyEvaluationRules, ShiftCandidate};

use super::types::{DayPlanFile, EngineConfig, EngineSettings};

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// resolves shift detection references between day plans and validates every
/// plan before it can reach a calculation.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml            # Calculation version
/// ├── evaluation_rules.yaml  # Monthly credit-type policy (optional)
/// └── day_plans/
///     └── std.yaml           # One day plan per file
/// ```
///
/// # Example
///
/// ```no_run
/// use zmi_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let plan = loader.get_day_plan("STD").unwrap();
/// println!("Target: {} minutes", plan.target_minutes);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `day_plans` directory is missing
    /// - Any file contains invalid YAML
    /// - A day plan code is defined twice, reserved or invalid
    /// - A shift candidate references an unknown day plan
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;

        let rules_path = path.join("evaluation_rules.yaml");
        let evaluation_rules = if rules_path.exists() {
            Some(Self::load_yaml::<MonthlyEvaluationRules>(&rules_path)?)
        } else {
            None
        };

        let files = Self::load_day_plan_files(&path.join("day_plans"))?;
        let day_plans = Self::resolve_day_plans(files)?;

        info!(
            path = %path.display(),
            day_plans = day_plans.len(),
            calculation_version = settings.calculation_version,
            "Loaded engine configuration"
        );

        Ok(Self {
            config: EngineConfig::new(settings, evaluation_rules, day_plans),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all day plan files, in file name order.
    fn load_day_plan_files(dir: &Path) -> EngineResult<Vec<DayPlanFile>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no day plan files found)", dir_str),
            });
        }

        paths.iter().map(|path| Self::load_yaml(path)).collect()
    }

    /// Attaches shift candidates and validates every plan.
    ///
    /// Candidate plans are taken without their own alternatives.
    fn resolve_day_plans(files: Vec<DayPlanFile>) -> EngineResult<HashMap<String, DayPlanConfig>> {
        let mut base: HashMap<String, DayPlanConfig> = HashMap::new();
        for file in &files {
            if base.insert(file.code.clone(), file.to_plan()).is_some() {
                return Err(EngineError::InvalidDayPlan {
                    code: file.code.clone(),
                    message: "day plan code is defined more than once".to_string(),
                });
            }
        }

        let mut resolved = HashMap::with_capacity(files.len());
        for file in &files {
            let alternatives = file
                .alternatives
                .iter()
                .map(|alternative| {
                    let plan = base.get(&alternative.plan).cloned().ok_or_else(|| {
                        EngineError::DayPlanNotFound {
                            code: alternative.plan.clone(),
                        }
                    })?;
                    Ok(ShiftCandidate {
                        arrival: alternative.arrival.map(Into::into),
                        departure: alternative.departure.map(Into::into),
                        plan,
                    })
                })
                .collect::<EngineResult<Vec<_>>>()?;

            let plan = file.to_plan().with_alternatives(alternatives);
            plan.validate()?;
            resolved.insert(plan.code.clone(), plan);
        }

        Ok(resolved)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the monthly evaluation rules, if configured.
    pub fn evaluation_rules(&self) -> Option<MonthlyEvaluationRules> {
        self.config.evaluation_rules()
    }

    /// Gets a day plan by its code.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use zmi_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// let plan = loader.get_day_plan("FLEX")?;
    /// println!("Day plan: {}", plan.name);
    /// # Ok::<(), zmi_engine::error::EngineError>(())
    /// ```
    pub fn get_day_plan(&self, code: &str) -> EngineResult<&DayPlanConfig> {
        self.config
            .day_plans()
            .get(code)
            .ok_or_else(|| EngineError::DayPlanNotFound {
                code: code.to_string(),
            })
    }

    /// Returns all day plan codes, sorted.
    pub fn day_plan_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.config.day_plans().keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Creates a daily calculator using the configured calculation version.
    pub fn calculator(&self) -> DailyCalculator {
        DailyCalculator::new(self.settings().calculation_version)
    }
}
