//! Adventskalender: Berechnung der vier Adventssonntage
//!
//! Reine Kalender-Arithmetik ohne Hardware-Dependencies.

use core::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::types::LedPosition;

/// Monat von Weihnachten (Dezember)
pub const CHRISTMAS_MONTH: u32 = 12;

/// Tag von Weihnachten (25.)
pub const CHRISTMAS_DAY: u32 = 25;

/// Abstand zwischen zwei Adventssonntagen in Tagen
pub const DAYS_BETWEEN_SUNDAYS: u64 = 7;

/// Gregorianisches Kalenderjahr mit darstellbarem Weihnachtstag
///
/// Hält intern den 25. Dezember, daher ist die Advents-Berechnung
/// für jedes gültige `Year` total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(NaiveDate);

impl Year {
    /// Erstellt ein Jahr, falls der 25. Dezember im Kalenderbereich liegt
    pub fn new(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, CHRISTMAS_MONTH, CHRISTMAS_DAY).map(Self)
    }

    /// Jahr eines Datums
    ///
    /// Der 25. Dezember liegt für jedes darstellbare Datum im Kalenderbereich
    /// von chrono (`NaiveDate::MAX` ist ein 31. Dezember).
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year()).unwrap_or(Self(NaiveDate::MAX))
    }

    /// Jahreszahl als i32
    pub fn get(self) -> i32 {
        self.0.year()
    }

    /// Weihnachtstag (25. Dezember) dieses Jahres
    pub fn christmas(self) -> NaiveDate {
        self.0
    }
}

/// Die vier Adventssonntage eines Jahres
///
/// Index 0 = 1. Advent, Index 3 = 4. Advent. Aufsteigend sortiert,
/// jeweils genau 7 Tage Abstand. Nur `Serialize`: ein Plan entsteht
/// ausschließlich über `compute_advent_sundays`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AdventSchedule {
    sundays: [NaiveDate; 4],
}

impl AdventSchedule {
    /// Datum des Adventssonntags an einer Position
    pub fn sunday(&self, position: LedPosition) -> NaiveDate {
        self.sundays[position.index()]
    }

    /// 1. Advent (Beginn der Adventszeit)
    pub fn first(&self) -> NaiveDate {
        self.sundays[0]
    }

    /// 4. Advent (letzter Sonntag vor oder an Weihnachten)
    pub fn fourth(&self) -> NaiveDate {
        self.sundays[3]
    }

    /// Alle vier Sonntage als Array (1. bis 4. Advent)
    pub fn dates(&self) -> [NaiveDate; 4] {
        self.sundays
    }

    /// Iteriert über (Position, Datum) in Reihenfolge 1. bis 4. Advent
    pub fn iter(&self) -> impl Iterator<Item = (LedPosition, NaiveDate)> + '_ {
        LedPosition::ALL
            .into_iter()
            .map(move |position| (position, self.sunday(position)))
    }
}

impl fmt::Display for AdventSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, sunday) in self.iter() {
            if position != LedPosition::First {
                f.write_str(", ")?;
            }
            write!(f, "{}. Advent: {}", position.ordinal(), sunday)?;
        }
        Ok(())
    }
}

/// Berechnet die Adventssonntage für das gegebene Jahr
///
/// Der 4. Advent ist der letzte Sonntag an oder vor dem 25. Dezember.
/// Fällt Weihnachten auf einen Sonntag, ist der 4. Advent der 25. Dezember.
///
/// # Beispiele
///
/// ```
/// # use advent_core::{LedPosition, Year, compute_advent_sundays};
/// # use chrono::NaiveDate;
/// let year = Year::new(2024).unwrap();
/// let schedule = compute_advent_sundays(year);
/// assert_eq!(
///     schedule.sunday(LedPosition::First),
///     NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
/// );
/// assert_eq!(schedule.fourth(), NaiveDate::from_ymd_opt(2024, 12, 22).unwrap());
/// ```
pub fn compute_advent_sundays(year: Year) -> AdventSchedule {
    let christmas = year.christmas();

    // Montag = 0 .. Sonntag = 6, (wd + 1) % 7 landet auf dem Sonntag davor
    let offset = (u64::from(christmas.weekday().num_days_from_monday()) + 1) % 7;
    let fourth = christmas - Days::new(offset);

    let mut sundays = [fourth; 4];
    for i in (0..3).rev() {
        sundays[i] = sundays[i + 1] - Days::new(DAYS_BETWEEN_SUNDAYS);
    }

    debug_assert_eq!(fourth.weekday(), Weekday::Sun);
    AdventSchedule { sundays }
}
