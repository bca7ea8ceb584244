//! Application state for the Timesheet Overtime Allocation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::OvertimeAllocator;
use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded configuration and an allocator built from its overtime
/// rules. Both are read-only, so requests never contend.
#[derive(Clone)]
pub struct AppState {
    /// The loaded timesheet configuration.
    config: Arc<ConfigLoader>,
    allocator: OvertimeAllocator,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        let allocator = OvertimeAllocator::new(config.rules());
        Self {
            config: Arc::new(config),
            allocator,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the allocator configured with the rule set's overtime rules.
    pub fn allocator(&self) -> &OvertimeAllocator {
        &self.allocator
    }
}
