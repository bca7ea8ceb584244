//! Calculation logic for the Timesheet Overtime Allocation Engine.
//!
//! This module contains the four allocation stages, grouping profiles by
//! person, daily allocation against a shared per-date bucket, weekly
//! reallocation of excess regular hours, and result assembly, together with
//! the [`OvertimeAllocator`] that runs them and the batch entry point
//! [`calculate_timesheet`].

mod allocator;
mod assembly;
mod daily_allocation;
mod grouping;
mod timesheet;
mod weekly_reallocation;

pub use allocator::{Allocation, AllocationFailure, OvertimeAllocator};
pub use assembly::{ProfileLedger, assemble};
pub use daily_allocation::{
    DEFAULT_OVERTIME_MULTIPLIER, DailyBucket, DateAllocation, GroupDailyOutcome,
    ZERO_THRESHOLD_RATE_DIVISOR, allocate_date, allocate_group_days, allocate_profile_day,
    implied_hourly_rate,
};
pub use grouping::{PersonGroup, group_by_person};
pub use timesheet::calculate_timesheet;
pub use weekly_reallocation::{WeeklyReallocation, reallocate_weekly};
