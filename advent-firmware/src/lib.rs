// Library-Root: Adventskranz-Firmware für ESP32-C6
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod clock;
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von advent-core
pub use advent_core::{
    AdventSchedule, Clock, ClockSource, LedPosition, OutputError, OutputPort, PollDelay,
    TickReport, WreathConfig, WreathController, WreathError, WreathState, parse_date,
    run_self_test, run_wreath,
};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Stopp-Anforderung (Stopp-Taste → Adventskranz-Task)
///
/// CriticalSectionRawMutex: das Signal liegt in einem `static` und muss Sync sein.
pub type StopSignal = Signal<CriticalSectionRawMutex, ()>;
