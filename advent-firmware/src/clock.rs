// Wanduhr: SNTP-Synchronisationspunkt + monotone Embassy-Zeit
//
// Der ESP32-C6 hat keine batteriegepufferte Uhr. Der SNTP-Task speichert
// bei jeder Synchronisation (Unix-Sekunden, Instant). Die aktuelle Zeit ergibt
// sich aus diesem Punkt plus der seitdem vergangenen Zeit.

use core::cell::Cell;

use advent_core::{Clock, local_date};
use chrono::NaiveDate;
use critical_section::Mutex;
use embassy_time::Instant;

#[derive(Clone, Copy)]
struct SyncPoint {
    unix_secs: u64,
    at: Instant,
}

/// Letzte erfolgreiche Synchronisation (None bis zum ersten SNTP-Sync)
static SYNC_POINT: Mutex<Cell<Option<SyncPoint>>> = Mutex::new(Cell::new(None));

/// Speichert eine frisch synchronisierte Unix-Zeit
pub fn set_unix_time(unix_secs: u64) {
    let point = SyncPoint {
        unix_secs,
        at: Instant::now(),
    };
    critical_section::with(|cs| SYNC_POINT.borrow(cs).set(Some(point)));
}

/// Aktuelle Unix-Zeit in Sekunden, falls bereits synchronisiert
pub fn unix_time() -> Option<u64> {
    let point = critical_section::with(|cs| SYNC_POINT.borrow(cs).get())?;
    Some(point.unix_secs + point.at.elapsed().as_secs())
}

pub fn is_synced() -> bool {
    unix_time().is_some()
}

/// Wanduhr für den Adventskranz-Controller
#[derive(Clone, Copy)]
pub struct SntpClock {
    utc_offset_secs: i32,
}

impl SntpClock {
    pub const fn new(utc_offset_secs: i32) -> Self {
        Self { utc_offset_secs }
    }
}

impl Clock for SntpClock {
    fn today(&self) -> Option<NaiveDate> {
        let unix = i64::try_from(unix_time()?).ok()?;
        local_date(unix, self.utc_offset_secs)
    }
}
