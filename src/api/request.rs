//! Request types for the Timesheet Overtime Allocation Engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::{PayProfileRecord, Thresholds};

/// Request body for the `/calculate` endpoint.
///
/// Thresholds are resolved in order: explicit `thresholds`, then the
/// override for `show_id`, then the rule set defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The show whose threshold override applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    /// Explicit thresholds for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    /// The pay profiles to allocate, as submitted.
    pub profiles: Vec<PayProfileRecord>,
}
