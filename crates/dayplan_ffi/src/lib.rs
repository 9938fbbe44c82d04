//! Flutter-facing bindings for the DayPlan core.

pub mod api;
