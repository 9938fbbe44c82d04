//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dayplan_core` linkage.
//! - Print the current week window from a throwaway in-memory planner.

use dayplan_core::{local_now, MemoryDayRepository, NoopFeedback, PlannerConfig, PlannerSession};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dayplan_core ping={}", dayplan_core::ping());
    println!("dayplan_core version={}", dayplan_core::core_version());

    let session = match PlannerSession::from_config(
        MemoryDayRepository::new(),
        &PlannerConfig::default(),
        Box::new(NoopFeedback),
        local_now(),
    ) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("dayplan_core session error={err}");
            return ExitCode::FAILURE;
        }
    };

    println!("selected={}", session.selected_day().format("%Y-%m-%d"));
    for record in session.week() {
        println!(
            "{} {} tasks={}",
            record.date.format("%Y-%m-%d"),
            record.date.format("%a"),
            record.tasks.len()
        );
    }
    ExitCode::SUCCESS
}
