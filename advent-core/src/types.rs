//! Core Types für den Adventskranz
//!
//! Datenstrukturen ohne Hardware-Dependencies

use chrono::NaiveDate;

use crate::calendar::AdventSchedule;

/// Standard-Intervall zwischen zwei Prüfungen in Sekunden
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Position einer Kerze (LED) im Kranz, 1. bis 4. Advent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedPosition {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl LedPosition {
    /// Alle Positionen in Reihenfolge
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    /// Ordinalzahl 1..=4
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Array-Index 0..=3
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl TryFrom<u8> for LedPosition {
    type Error = ();

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            _ => Err(()),
        }
    }
}

/// Menge der LEDs, die leuchten sollen
///
/// Wird in jedem Zyklus neu aus Datum und Adventssonntagen berechnet,
/// nie gespeichert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ActiveSet(u8);

impl ActiveSet {
    /// Keine LED aktiv
    pub const EMPTY: Self = Self(0);

    /// Alle vier LEDs aktiv
    pub const FULL: Self = Self(0b1111);

    pub const fn with(self, position: LedPosition) -> Self {
        Self(self.0 | position.bit())
    }

    pub const fn contains(self, position: LedPosition) -> bool {
        self.0 & position.bit() != 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// true wenn jede LED aus `self` auch in `other` aktiv ist
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Aktive Positionen in aufsteigender Reihenfolge
    pub fn iter(self) -> impl Iterator<Item = LedPosition> {
        LedPosition::ALL
            .into_iter()
            .filter(move |position| self.contains(*position))
    }
}

impl FromIterator<LedPosition> for ActiveSet {
    fn from_iter<I: IntoIterator<Item = LedPosition>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Sichtbarer Zustand der vier Ausgänge (an/aus)
///
/// Gehört exklusiv dem Controller und wird pro Zyklus komplett überschrieben.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct OutputState([bool; 4]);

impl OutputState {
    /// Alle LEDs aus
    pub const OFF: Self = Self([false; 4]);

    pub const fn is_lit(&self, position: LedPosition) -> bool {
        self.0[position.index()]
    }

    /// Menge der leuchtenden LEDs
    pub fn active_set(&self) -> ActiveSet {
        self.iter().filter(|(_, lit)| *lit).map(|(p, _)| p).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LedPosition, bool)> + '_ {
        LedPosition::ALL
            .into_iter()
            .map(move |position| (position, self.is_lit(position)))
    }
}

impl From<ActiveSet> for OutputState {
    fn from(active: ActiveSet) -> Self {
        let mut lit = [false; 4];
        for position in active.iter() {
            lit[position.index()] = true;
        }
        Self(lit)
    }
}

/// Quelle für das "heutige" Datum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockSource {
    /// Echte Uhrzeit (z.B. per SNTP synchronisiert)
    #[default]
    WallClock,
    /// Festes Datum in jedem Zyklus (Test/Simulation)
    Fixed(NaiveDate),
}

/// Konfiguration des Controllers, wird beim Start übergeben
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WreathConfig {
    pub clock_source: ClockSource,
    pub poll_interval_secs: u64,
}

impl Default for WreathConfig {
    fn default() -> Self {
        Self {
            clock_source: ClockSource::WallClock,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Zustand des Controllers
///
/// `Stopped` ist terminal: ein neuer Start braucht einen neuen Controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WreathState {
    Running,
    Stopped,
}

/// Ergebnis eines Zyklus (für Logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Verwendetes Datum, `None` solange die Uhr noch nicht synchronisiert ist
    pub date: Option<NaiveDate>,
    /// Adventssonntage des Jahres von `date`
    pub schedule: Option<AdventSchedule>,
    /// Angewendete LED-Menge
    pub active: ActiveSet,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
pub(crate) fn format_date(fmt: defmt::Formatter, date: NaiveDate) {
    use chrono::Datelike;

    defmt::write!(
        fmt,
        "{=i32}-{=u32:02}-{=u32:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedPosition {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "LED {=u8}", self.ordinal())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ActiveSet {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "[");
        for (i, position) in self.iter().enumerate() {
            if i > 0 {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{=u8}", position.ordinal());
        }
        defmt::write!(fmt, "]");
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputState {
    fn format(&self, fmt: defmt::Formatter) {
        for (position, lit) in self.iter() {
            defmt::write!(
                fmt,
                "{=u8}:{=str} ",
                position.ordinal(),
                if lit { "an" } else { "aus" }
            );
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockSource {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ClockSource::WallClock => defmt::write!(fmt, "WallClock"),
            ClockSource::Fixed(date) => {
                defmt::write!(fmt, "Fixed(");
                format_date(fmt, *date);
                defmt::write!(fmt, ")");
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WreathState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WreathState::Running => defmt::write!(fmt, "RUNNING"),
            WreathState::Stopped => defmt::write!(fmt, "STOPPED"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AdventSchedule {
    fn format(&self, fmt: defmt::Formatter) {
        for (position, sunday) in self.iter() {
            defmt::write!(fmt, "{=u8}. Advent: ", position.ordinal());
            format_date(fmt, sunday);
            if position != LedPosition::Fourth {
                defmt::write!(fmt, ", ");
            }
        }
    }
}
