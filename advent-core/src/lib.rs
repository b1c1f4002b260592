//! Advent Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, den Adventskalender, die Controller-Zustandsmaschine
//! und den SNTP-Codec.

#![no_std]

pub mod calendar;
pub mod controller;
pub mod logic;
pub mod sntp;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use calendar::{AdventSchedule, Year, compute_advent_sundays};
pub use controller::{WreathController, WreathError, run_self_test, run_wreath};
pub use logic::{DateParseError, active_set, apply_active_set, local_date, parse_date};
pub use sntp::SntpError;
pub use traits::{Clock, OutputError, OutputPort, PollDelay};
pub use types::{
    ActiveSet, ClockSource, DEFAULT_POLL_INTERVAL_SECS, LedPosition, OutputState, TickReport,
    WreathConfig, WreathState,
};
