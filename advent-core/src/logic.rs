//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use core::fmt;

use chrono::format::ParseErrorKind;
use chrono::{DateTime, NaiveDate};

use crate::calendar::AdventSchedule;
use crate::traits::{OutputError, OutputPort};
use crate::types::{ActiveSet, LedPosition, OutputState};

/// Berechnet die aktiven LEDs für ein Datum
///
/// Eine LED leuchtet ab ihrem Adventssonntag (einschließlich).
///
/// # Beispiele
///
/// ```
/// # use advent_core::{Year, active_set, compute_advent_sundays};
/// # use chrono::NaiveDate;
/// let schedule = compute_advent_sundays(Year::new(2024).unwrap());
/// let today = NaiveDate::from_ymd_opt(2024, 12, 8).unwrap();
/// assert_eq!(active_set(today, &schedule).len(), 2);
/// ```
pub fn active_set(today: NaiveDate, schedule: &AdventSchedule) -> ActiveSet {
    schedule
        .iter()
        .filter(|(_, sunday)| today >= *sunday)
        .map(|(position, _)| position)
        .collect()
}

/// Schreibt alle vier Ausgänge gemäß der aktiven Menge
///
/// Jede LED wird explizit gesetzt, auch wenn sie sich nicht ändert.
/// Schlägt ein Schreibvorgang fehl, wird der Zyklus abgebrochen und der
/// Fehler zurückgegeben.
pub fn apply_active_set<P: OutputPort>(
    port: &mut P,
    active: ActiveSet,
) -> Result<OutputState, OutputError> {
    for position in LedPosition::ALL {
        port.set(position, active.contains(position))?;
    }
    Ok(OutputState::from(active))
}

/// Lokales Kalenderdatum aus Unix-Sekunden und fester UTC-Verschiebung
pub fn local_date(unix_secs: i64, utc_offset_secs: i32) -> Option<NaiveDate> {
    let local = unix_secs.checked_add(i64::from(utc_offset_secs))?;
    DateTime::from_timestamp(local, 0).map(|dt| dt.date_naive())
}

/// Fehler beim Parsen eines Datums im Format `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParseError {
    /// Eingabe ist leer
    Empty,
    /// Nicht im Format `YYYY-MM-DD`
    InvalidFormat,
    /// Format korrekt, aber kein gültiges Kalenderdatum
    InvalidDate,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty date string"),
            Self::InvalidFormat => f.write_str("invalid date format, expected YYYY-MM-DD"),
            Self::InvalidDate => f.write_str("not a valid calendar date"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DateParseError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DateParseError::Empty => defmt::write!(fmt, "Empty date"),
            DateParseError::InvalidFormat => defmt::write!(fmt, "Expected YYYY-MM-DD"),
            DateParseError::InvalidDate => defmt::write!(fmt, "Invalid calendar date"),
        }
    }
}

/// Parst ein Datum im Format `YYYY-MM-DD` (z.B. "2024-12-08")
///
/// Das Jahr muss vierstellig sein, "24-12-08" wird abgelehnt.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateParseError::Empty);
    }
    if input.len() != 10 {
        return Err(DateParseError::InvalidFormat);
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| match e.kind() {
        ParseErrorKind::OutOfRange | ParseErrorKind::Impossible => DateParseError::InvalidDate,
        _ => DateParseError::InvalidFormat,
    })
}
