//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Ausgänge, Uhr und Wartezeit
//! ohne konkrete Implementierung.

use core::fmt;

use chrono::NaiveDate;

use crate::types::LedPosition;

/// Fehler-Typ für Ausgangs-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Ausgänge konnten nicht initialisiert werden
    InitFailed,
    /// Schreiben auf eine LED ist fehlgeschlagen
    WriteFailed(LedPosition),
    /// Ausgänge konnten nicht freigegeben werden
    ReleaseFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => f.write_str("output initialization failed"),
            Self::WriteFailed(position) => {
                write!(f, "write to LED {} failed", position.ordinal())
            }
            Self::ReleaseFailed => f.write_str("output release failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            OutputError::InitFailed => defmt::write!(fmt, "Init failed"),
            OutputError::WriteFailed(position) => {
                defmt::write!(fmt, "Write failed ({})", position)
            }
            OutputError::ReleaseFailed => defmt::write!(fmt, "Release failed"),
        }
    }
}

/// Trait für die vier LED-Ausgänge des Kranzes
///
/// # Implementierungen
/// - **Production:** GpioOutputPort (ESP32 GPIO)
/// - **Testing:** MockOutputPort (in-memory Mock)
pub trait OutputPort {
    /// Konfiguriert alle Ausgänge und schaltet sie aus
    fn initialize(&mut self) -> Result<(), OutputError>;

    /// Setzt eine LED an (`true`) oder aus (`false`)
    ///
    /// # Fehlerbehandlung
    /// Gibt `OutputError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn set(&mut self, position: LedPosition, lit: bool) -> Result<(), OutputError>;

    /// Gibt die Ausgänge frei und bringt sie in den sicheren Zustand (aus)
    fn release(&mut self) -> Result<(), OutputError>;
}

/// Trait für die Wanduhr
pub trait Clock {
    /// Heutiges lokales Datum, `None` solange keine gültige Zeit vorliegt
    fn today(&self) -> Option<NaiveDate>;
}

/// Trait für asynchrones Warten zwischen den Zyklen
#[allow(async_fn_in_trait)]
pub trait PollDelay {
    async fn delay_ms(&mut self, millis: u64);
}
