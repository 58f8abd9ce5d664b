//! Configuration loading for the time-tracking engine.
//!
//! This module loads engine settings, monthly evaluation rules and day plans
//! from a directory of YAML files.
//!
//! # Example
//!
//! ```no_run
//! use zmi_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} day plans", config.day_plan_codes().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AlternativeFile, DayPlanFile, EngineConfig, EngineSettings, WindowFile};
