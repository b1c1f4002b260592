// Adventskranz Task - Steuert die vier Kerzen-LEDs über GPIO
use chrono::Datelike;
use defmt::{debug, error, info, warn};
use embassy_time::Timer;
use esp_hal::gpio::Output;

use crate::StopSignal;
use crate::clock::SntpClock;
use crate::config::{
    ADVENT_TEST_DATE, LED_SELF_TEST_ON_BOOT, POLL_INTERVAL_SECS, SELF_TEST_OFF_MS,
    SELF_TEST_ON_MS, UTC_OFFSET_SECS,
};
use crate::hal::GpioOutputPort;
use crate::{
    Clock, ClockSource, OutputPort, PollDelay, TickReport, WreathConfig, WreathController,
    parse_date, run_self_test, run_wreath,
};

/// Wartezeit über den Embassy Timer
pub struct EmbassyDelay;

impl PollDelay for EmbassyDelay {
    async fn delay_ms(&mut self, millis: u64) {
        Timer::after_millis(millis).await;
    }
}

/// Datumsquelle aus der Build-Konfiguration
///
/// ADVENT_TEST_DATE gesetzt und gültig → festes Datum, sonst Wanduhr.
pub fn clock_source_from_config() -> ClockSource {
    let Some(raw) = ADVENT_TEST_DATE else {
        return ClockSource::WallClock;
    };

    match parse_date(raw) {
        Ok(date) => ClockSource::Fixed(date),
        Err(e) => {
            warn!("Wreath: Invalid ADVENT_TEST_DATE '{}': {}", raw, e);
            ClockSource::WallClock
        }
    }
}

/// Adventskranz Logic - Testbare Ablaufsteuerung ohne konkrete Hardware
///
/// - Optionaler LED-Selbsttest beim Start
/// - Startet den Controller (alle LEDs aus)
/// - Prüft alle `POLL_INTERVAL_SECS` das Datum und schaltet die LEDs
/// - Gibt die Ausgänge bei Stopp oder Fehler frei
///
/// # Parameter
/// - `port`: Ausgangs-Port (GPIO oder Mock)
/// - `clock`: Wanduhr
/// - `stop`: Signal für Stopp-Anforderung (BOOT-Taste)
pub async fn wreath_logic<P: OutputPort, C: Clock>(port: &mut P, clock: C, stop: &StopSignal) {
    let mut delay = EmbassyDelay;

    if LED_SELF_TEST_ON_BOOT {
        info!("Wreath: LED self-test...");
        let result = run_self_test(
            port,
            &mut delay,
            SELF_TEST_ON_MS,
            SELF_TEST_OFF_MS,
            |position, lit| info!("{} {}", position, if lit { "an" } else { "aus" }),
        )
        .await;
        if let Err(e) = result {
            error!("Wreath: Self-test failed: {}", e);
        }
    }

    let config = WreathConfig {
        clock_source: clock_source_from_config(),
        poll_interval_secs: POLL_INTERVAL_SECS,
    };
    info!(
        "Wreath: Clock source {}, interval {}s",
        config.clock_source, config.poll_interval_secs
    );

    let mut controller = match WreathController::start(port, clock, config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Wreath: Failed to initialize outputs: {}", e);
            return;
        }
    };
    info!("Wreath: {}", controller.state());

    match run_wreath(&mut controller, &mut delay, stop.wait(), log_tick).await {
        Ok(()) => info!("Wreath: Stopped by operator"),
        Err(e) => error!("Wreath: Stopped after fault: {}", e),
    }
    info!("Wreath: {}, outputs released", controller.state());
}

/// Loggt das Ergebnis eines Zyklus
fn log_tick(report: &TickReport) {
    let (Some(date), Some(schedule)) = (report.date, report.schedule) else {
        warn!("Wreath: Clock not synced yet, all LEDs off");
        return;
    };

    debug!("Adventssonntage {}: {}", date.year(), schedule);
    info!(
        "Wreath: {}-{:02}-{:02} → aktive LEDs {}",
        date.year(),
        date.month(),
        date.day(),
        report.active
    );
}

/// Adventskranz Task - Embassy Task für parallele Ausführung
///
/// Dieser Task übernimmt die Hardware-Initialisierung und ruft dann
/// die testbare `wreath_logic()` Funktion auf.
///
/// # Parameter
/// - `leds`: Output-Pins für 1. bis 4. Advent (bereits low konfiguriert)
/// - `stop`: Signal für Stopp-Anforderung
#[embassy_executor::task]
pub async fn wreath_task(leds: [Output<'static>; 4], stop: &'static StopSignal) {
    let mut port = GpioOutputPort::new(leds);
    let clock = SntpClock::new(UTC_OFFSET_SECS);

    wreath_logic(&mut port, clock, stop).await;
}
