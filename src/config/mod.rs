//! Configuration loading and management for the Timesheet Overtime Allocation Engine.
//!
//! This module provides functionality to load rule sets from YAML files,
//! including overtime rules, default thresholds, and per-show overrides.
//!
//! # Example
//!
//! ```no_run
//! use timesheet_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/standard").unwrap();
//! println!("Loaded rule set: {}", config.engine().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, OvertimeRules, ShowConfig, TimesheetConfig};
