//! Adventskranz-Controller
//!
//! Zustandsmaschine (`Running` → `Stopped`) und Polling-Loop.
//! Der Controller leiht sich den Ausgangs-Port für seine gesamte Lebensdauer
//! und gibt ihn beim Stoppen oder spätestens im `Drop` wieder frei.

use core::fmt;
use core::future::Future;
use core::pin::pin;

use chrono::NaiveDate;
use embassy_futures::select::{Either, select};

use crate::calendar::{Year, compute_advent_sundays};
use crate::logic::{active_set, apply_active_set};
use crate::traits::{Clock, OutputError, OutputPort, PollDelay};
use crate::types::{
    ActiveSet, ClockSource, LedPosition, OutputState, TickReport, WreathConfig, WreathState,
};

/// Fehler des Controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WreathError {
    /// Zyklus auf einem gestoppten Controller angefordert
    NotRunning,
    /// Hardware-Fehler beim Schreiben oder Freigeben
    Output(OutputError),
}

impl From<OutputError> for WreathError {
    fn from(err: OutputError) -> Self {
        Self::Output(err)
    }
}

impl fmt::Display for WreathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => f.write_str("wreath controller is stopped"),
            Self::Output(err) => write!(f, "{err}"),
        }
    }
}

/// Steuert die vier LEDs anhand der Adventssonntage
pub struct WreathController<'a, P: OutputPort, C: Clock> {
    port: &'a mut P,
    clock: C,
    config: WreathConfig,
    state: WreathState,
    output: OutputState,
}

impl<'a, P: OutputPort, C: Clock> WreathController<'a, P, C> {
    /// Initialisiert die Ausgänge (alle aus) und startet im Zustand `Running`
    ///
    /// Schlägt die Initialisierung fehl, wird der Port freigegeben und der
    /// Fehler zurückgegeben.
    pub fn start(port: &'a mut P, clock: C, config: WreathConfig) -> Result<Self, OutputError> {
        if let Err(err) = port.initialize() {
            let _ = port.release();
            return Err(err);
        }

        Ok(Self {
            port,
            clock,
            config,
            state: WreathState::Running,
            output: OutputState::OFF,
        })
    }

    pub fn state(&self) -> WreathState {
        self.state
    }

    /// Zuletzt vollständig geschriebener Ausgangszustand
    pub fn output(&self) -> OutputState {
        self.output
    }

    pub fn config(&self) -> &WreathConfig {
        &self.config
    }

    /// Datum für den aktuellen Zyklus
    pub fn today(&self) -> Option<NaiveDate> {
        match self.config.clock_source {
            ClockSource::WallClock => self.clock.today(),
            ClockSource::Fixed(date) => Some(date),
        }
    }

    /// Ein Polling-Zyklus: Datum holen, Adventssonntage berechnen,
    /// alle vier Ausgänge schreiben
    ///
    /// Ohne gültiges Datum bleiben alle LEDs aus. Ein Schreibfehler ist fatal:
    /// der Port wird freigegeben und der Controller steht danach auf `Stopped`.
    pub fn tick(&mut self) -> Result<TickReport, WreathError> {
        if self.state != WreathState::Running {
            return Err(WreathError::NotRunning);
        }

        let date = self.today();
        // Jeden Zyklus neu berechnen (Jahreswechsel im Dauerbetrieb)
        let schedule = date.map(|today| compute_advent_sundays(Year::of(today)));
        let active = match (date, &schedule) {
            (Some(today), Some(schedule)) => active_set(today, schedule),
            _ => ActiveSet::EMPTY,
        };

        match apply_active_set(&mut *self.port, active) {
            Ok(output) => self.output = output,
            Err(err) => {
                // Pins teilweise beschrieben: nicht weiterlaufen
                let _ = self.stop();
                return Err(err.into());
            }
        }

        Ok(TickReport {
            date,
            schedule,
            active,
        })
    }

    /// Gibt die Ausgänge frei und wechselt nach `Stopped`
    ///
    /// Mehrfacher Aufruf ist harmlos, freigegeben wird nur einmal.
    pub fn stop(&mut self) -> Result<(), OutputError> {
        if self.state == WreathState::Stopped {
            return Ok(());
        }
        self.state = WreathState::Stopped;
        self.output = OutputState::OFF;
        self.port.release()
    }
}

impl<P: OutputPort, C: Clock> Drop for WreathController<'_, P, C> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Polling-Loop des Adventskranzes
///
/// Führt Zyklen im Abstand von `poll_interval_secs` aus, bis `stop`
/// fertig wird oder ein Zyklus fehlschlägt. In beiden Fällen werden die
/// Ausgänge vor der Rückkehr freigegeben. Ist `stop` schon beim Aufruf
/// fertig, läuft kein einziger Zyklus.
///
/// # Parameter
/// - `controller`: gestarteter Controller
/// - `delay`: Wartezeit zwischen den Zyklen (Embassy Timer oder Mock)
/// - `stop`: Future die bei Stopp-Anforderung fertig wird
/// - `on_tick`: wird nach jedem erfolgreichen Zyklus aufgerufen (Logging)
pub async fn run_wreath<P, C, D, S, F>(
    controller: &mut WreathController<'_, P, C>,
    delay: &mut D,
    stop: S,
    mut on_tick: F,
) -> Result<(), WreathError>
where
    P: OutputPort,
    C: Clock,
    D: PollDelay,
    S: Future<Output = ()>,
    F: FnMut(&TickReport),
{
    let mut stop = pin!(stop);
    let interval_ms = controller.config().poll_interval_secs.saturating_mul(1000);

    // Stopp bereits vor dem ersten Zyklus angefordert: keine LED einschalten
    if let Either::First(()) = select(stop.as_mut(), core::future::ready(())).await {
        return controller.stop().map_err(WreathError::from);
    }

    let result = loop {
        match controller.tick() {
            Ok(report) => on_tick(&report),
            Err(err) => break Err(err),
        }

        if let Either::Second(()) = select(delay.delay_ms(interval_ms), stop.as_mut()).await {
            break Ok(());
        }
    };

    let released = controller.stop().map_err(WreathError::from);
    result.and(released)
}

/// LED-Selbsttest: jede LED nacheinander an und wieder aus
///
/// Initialisiert den Port vorher und gibt ihn danach immer frei,
/// auch wenn ein Schreibvorgang fehlschlägt.
pub async fn run_self_test<P, D, F>(
    port: &mut P,
    delay: &mut D,
    on_ms: u64,
    off_ms: u64,
    mut on_step: F,
) -> Result<(), OutputError>
where
    P: OutputPort,
    D: PollDelay,
    F: FnMut(LedPosition, bool),
{
    let result = async {
        port.initialize()?;
        for position in LedPosition::ALL {
            port.set(position, true)?;
            on_step(position, true);
            delay.delay_ms(on_ms).await;

            port.set(position, false)?;
            on_step(position, false);
            delay.delay_ms(off_ms).await;
        }
        Ok::<(), OutputError>(())
    }
    .await;

    let released = port.release();
    result.and(released)
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for WreathError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WreathError::NotRunning => defmt::write!(fmt, "Controller stopped"),
            WreathError::Output(err) => defmt::write!(fmt, "Output error: {}", err),
        }
    }
}
