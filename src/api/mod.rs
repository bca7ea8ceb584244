//! HTTP API module for the Timesheet Overtime Allocation Engine.
//!
//! This module provides the REST API endpoint for allocating regular and
//! overtime hours across a crew's pay profiles.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
