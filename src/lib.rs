//! Timesheet Overtime Allocation Engine
//!
//! This crate splits a week of crew hours into regular and overtime hours and
//! prices them per pay profile, handling hourly and flat daily rates and people
//! who hold several concurrent pay profiles on the same show.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
