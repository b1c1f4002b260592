//! Integration Tests für den Adventskranz
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockOutputPort

use std::cell::Cell;

use advent_core::{
    ActiveSet, Clock, ClockSource, LedPosition, OutputError, OutputPort, OutputState, PollDelay,
    TickReport, WreathConfig, WreathController, WreathError, WreathState, Year, active_set,
    apply_active_set, compute_advent_sundays, local_date, parse_date, run_self_test, run_wreath,
    sntp,
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use embassy_futures::{block_on, yield_now};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn year(y: i32) -> Year {
    Year::new(y).unwrap()
}

fn set(ordinals: &[u8]) -> ActiveSet {
    ordinals
        .iter()
        .map(|o| LedPosition::try_from(*o).unwrap())
        .collect()
}

fn fixed_config(today: NaiveDate) -> WreathConfig {
    WreathConfig {
        clock_source: ClockSource::Fixed(today),
        ..WreathConfig::default()
    }
}

// ============================================================================
// Mock Output Port
// ============================================================================

#[derive(Default)]
pub struct MockOutputPort {
    pub pins: [bool; 4],
    pub initialized: bool,
    pub init_count: usize,
    pub release_count: usize,
    pub write_count: usize,
    /// Anzahl der Pegelwechsel (an → aus oder aus → an)
    pub toggle_count: usize,
    /// Alle Schreibvorgänge in Reihenfolge
    pub writes: Vec<(LedPosition, bool)>,
    /// Simuliere Fehler beim n-ten write() (0-basiert, über alle Zyklen)
    pub fail_write_at: Option<usize>,
    pub fail_init: bool,
}

impl MockOutputPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lit(&self) -> ActiveSet {
        LedPosition::ALL
            .into_iter()
            .filter(|p| self.pins[p.index()])
            .collect()
    }
}

impl OutputPort for MockOutputPort {
    fn initialize(&mut self) -> Result<(), OutputError> {
        self.init_count += 1;
        if self.fail_init {
            return Err(OutputError::InitFailed);
        }
        self.pins = [false; 4];
        self.initialized = true;
        Ok(())
    }

    fn set(&mut self, position: LedPosition, lit: bool) -> Result<(), OutputError> {
        if self.fail_write_at == Some(self.write_count) {
            self.fail_write_at = None;
            return Err(OutputError::WriteFailed(position));
        }

        let pin = &mut self.pins[position.index()];
        if *pin != lit {
            self.toggle_count += 1;
        }
        *pin = lit;
        self.write_count += 1;
        self.writes.push((position, lit));
        Ok(())
    }

    fn release(&mut self) -> Result<(), OutputError> {
        self.release_count += 1;
        self.pins = [false; 4];
        self.initialized = false;
        Ok(())
    }
}

// ============================================================================
// Mock Clock + Delay
// ============================================================================

/// Uhr mit festem Wert (None = noch nicht synchronisiert)
pub struct FixedClock(pub Option<NaiveDate>);

impl Clock for FixedClock {
    fn today(&self) -> Option<NaiveDate> {
        self.0
    }
}

/// Uhr die bei jedem Aufruf einen Tag weiterläuft
pub struct SteppingClock {
    start: NaiveDate,
    calls: Cell<u64>,
}

impl SteppingClock {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            calls: Cell::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn today(&self) -> Option<NaiveDate> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        self.start.checked_add_days(Days::new(n))
    }
}

/// Delay das `ready_ticks` mal sofort fertig wird und danach hängt
#[derive(Default)]
pub struct MockDelay {
    pub calls: Vec<u64>,
    pub ready_ticks: usize,
}

impl MockDelay {
    pub fn ready_for(ready_ticks: usize) -> Self {
        Self {
            calls: Vec::new(),
            ready_ticks,
        }
    }

    pub fn always_ready() -> Self {
        Self::ready_for(usize::MAX)
    }
}

impl PollDelay for MockDelay {
    async fn delay_ms(&mut self, millis: u64) {
        self.calls.push(millis);
        if self.calls.len() > self.ready_ticks {
            core::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// Tests: MockOutputPort
// ============================================================================

#[test]
fn test_mock_output_port_write() {
    let mut mock = MockOutputPort::new();
    mock.initialize().unwrap();

    mock.set(LedPosition::Second, true).unwrap();

    assert_eq!(mock.write_count, 1);
    assert_eq!(mock.toggle_count, 1);
    assert_eq!(mock.pins, [false, true, false, false]);
}

#[test]
fn test_mock_output_port_fail() {
    let mut mock = MockOutputPort::new();
    mock.fail_write_at = Some(0);

    let result = mock.set(LedPosition::First, true);
    assert_eq!(result, Err(OutputError::WriteFailed(LedPosition::First)));
    assert_eq!(mock.write_count, 0);

    // Nächster Versuch klappt wieder
    assert!(mock.set(LedPosition::First, true).is_ok());
    assert_eq!(mock.write_count, 1);
}

// ============================================================================
// Tests: compute_advent_sundays()
// ============================================================================

#[test]
fn test_advent_2024() {
    let schedule = compute_advent_sundays(year(2024));
    assert_eq!(schedule.sunday(LedPosition::First), date(2024, 12, 1));
    assert_eq!(schedule.sunday(LedPosition::Second), date(2024, 12, 8));
    assert_eq!(schedule.sunday(LedPosition::Third), date(2024, 12, 15));
    assert_eq!(schedule.sunday(LedPosition::Fourth), date(2024, 12, 22));
}

#[test]
fn test_advent_christmas_sunday_2022() {
    let schedule = compute_advent_sundays(year(2022));
    assert_eq!(schedule.fourth(), date(2022, 12, 25));
}

#[test]
fn test_fourth_advent_is_sunday_before_christmas() {
    for y in 1583..=2500 {
        let schedule = compute_advent_sundays(year(y));
        let christmas = date(y, 12, 25);

        assert_eq!(schedule.fourth().weekday(), Weekday::Sun, "year {y}");
        assert!(schedule.fourth() <= christmas, "year {y}");
        // Höchstens 6 Tage vor Weihnachten
        assert!(schedule.fourth() > christmas - Days::new(7), "year {y}");
    }
}

#[test]
fn test_sundays_seven_days_apart() {
    for y in 1583..=2500 {
        let dates = compute_advent_sundays(year(y)).dates();
        for i in 0..3 {
            assert_eq!((dates[i + 1] - dates[i]).num_days(), 7, "year {y}");
        }
    }
}

#[test]
fn test_first_advent_range() {
    // 1. Advent liegt immer zwischen 27.11. und 04.12.
    for y in 1900..=2100 {
        let first = compute_advent_sundays(year(y)).first();
        assert!(first >= date(y, 11, 27), "year {y}");
        assert!(first <= date(y, 12, 4), "year {y}");
    }

    // 25.12. ist Sonntag → 1. Advent am 04.12.
    assert_eq!(compute_advent_sundays(year(2022)).first(), date(2022, 12, 4));
    assert_eq!(compute_advent_sundays(year(2033)).first(), date(2033, 12, 4));
}

#[test]
fn test_schedule_display() {
    let schedule = compute_advent_sundays(year(2024));
    assert_eq!(
        schedule.to_string(),
        "1. Advent: 2024-12-01, 2. Advent: 2024-12-08, \
         3. Advent: 2024-12-15, 4. Advent: 2024-12-22"
    );
}

// ============================================================================
// Tests: active_set()
// ============================================================================

#[test]
fn test_active_set_scenarios_2024() {
    let schedule = compute_advent_sundays(year(2024));

    assert_eq!(active_set(date(2024, 12, 8), &schedule), set(&[1, 2]));
    assert_eq!(active_set(date(2024, 11, 30), &schedule), set(&[]));
    assert_eq!(active_set(date(2024, 12, 25), &schedule), set(&[1, 2, 3, 4]));
    assert_eq!(active_set(date(2024, 12, 1), &schedule), set(&[1]));
    assert_eq!(active_set(date(2024, 12, 21), &schedule), set(&[1, 2, 3]));
}

#[test]
fn test_active_set_monotonic_within_season() {
    let schedule = compute_advent_sundays(year(2024));
    let mut previous = ActiveSet::EMPTY;
    let mut day = date(2024, 1, 1);

    while day <= date(2024, 12, 31) {
        let current = active_set(day, &schedule);
        assert!(previous.is_subset(current), "LED ging aus am {day}");
        previous = current;
        day = day + Days::new(1);
    }
    assert_eq!(previous, ActiveSet::FULL);
}

// ============================================================================
// Tests: apply_active_set()
// ============================================================================

#[test]
fn test_apply_active_set_writes_every_led() {
    let mut mock = MockOutputPort::new();
    mock.initialize().unwrap();

    let state = apply_active_set(&mut mock, set(&[1, 2])).unwrap();

    assert_eq!(mock.write_count, 4);
    assert_eq!(mock.pins, [true, true, false, false]);
    assert_eq!(state, OutputState::from(set(&[1, 2])));
}

#[test]
fn test_apply_active_set_idempotent() {
    let mut mock = MockOutputPort::new();
    mock.initialize().unwrap();

    let first = apply_active_set(&mut mock, set(&[1, 2, 3])).unwrap();
    let pins_after_first = mock.pins;
    let toggles_after_first = mock.toggle_count;

    let second = apply_active_set(&mut mock, set(&[1, 2, 3])).unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.pins, pins_after_first);
    // Kein Flackern: zweiter Durchlauf ändert keinen Pegel
    assert_eq!(mock.toggle_count, toggles_after_first);
    assert_eq!(mock.write_count, 8);
}

#[test]
fn test_apply_active_set_aborts_on_failure() {
    let mut mock = MockOutputPort::new();
    mock.initialize().unwrap();
    mock.fail_write_at = Some(2);

    let result = apply_active_set(&mut mock, ActiveSet::FULL);

    assert_eq!(result, Err(OutputError::WriteFailed(LedPosition::Third)));
    assert_eq!(mock.write_count, 2);
}

// ============================================================================
// Tests: WreathController
// ============================================================================

#[test]
fn test_controller_start_forces_leds_off() {
    let mut mock = MockOutputPort::new();
    mock.pins = [true; 4];

    let controller =
        WreathController::start(&mut mock, FixedClock(None), WreathConfig::default()).unwrap();
    assert_eq!(controller.state(), WreathState::Running);
    assert_eq!(controller.output(), OutputState::OFF);
    drop(controller);

    assert_eq!(mock.init_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

#[test]
fn test_controller_start_failure_releases() {
    let mut mock = MockOutputPort::new();
    mock.fail_init = true;

    let result = WreathController::start(&mut mock, FixedClock(None), WreathConfig::default());
    assert!(matches!(result, Err(OutputError::InitFailed)));
    drop(result);

    assert_eq!(mock.release_count, 1);
}

#[test]
fn test_controller_tick_fixed_date() {
    let mut mock = MockOutputPort::new();
    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(Some(date(2030, 1, 1))),
        fixed_config(date(2024, 12, 8)),
    )
    .unwrap();

    let report = controller.tick().unwrap();

    // Fixes Datum hat Vorrang vor der Uhr
    assert_eq!(report.date, Some(date(2024, 12, 8)));
    assert_eq!(report.schedule, Some(compute_advent_sundays(year(2024))));
    assert_eq!(report.active, set(&[1, 2]));
    assert_eq!(controller.output().active_set(), set(&[1, 2]));
    drop(controller);
}

#[test]
fn test_controller_tick_wall_clock() {
    let mut mock = MockOutputPort::new();
    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(Some(date(2024, 12, 16))),
        WreathConfig::default(),
    )
    .unwrap();

    let report = controller.tick().unwrap();
    assert_eq!(report.active, set(&[1, 2, 3]));
    drop(controller);

    // Nach Drop freigegeben
    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

#[test]
fn test_controller_unsynced_clock_keeps_leds_off() {
    let mut mock = MockOutputPort::new();
    let mut controller =
        WreathController::start(&mut mock, FixedClock(None), WreathConfig::default()).unwrap();

    let report = controller.tick().unwrap();
    assert_eq!(report.date, None);
    assert!(report.active.is_empty());
    drop(controller);

    assert_eq!(mock.write_count, 4);
    assert!(mock.writes.iter().all(|(_, lit)| !lit));
}

#[test]
fn test_controller_stopped_is_terminal() {
    let mut mock = MockOutputPort::new();
    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(None),
        fixed_config(date(2024, 12, 25)),
    )
    .unwrap();

    controller.tick().unwrap();
    controller.stop().unwrap();

    assert_eq!(controller.state(), WreathState::Stopped);
    assert_eq!(controller.output(), OutputState::OFF);
    assert_eq!(controller.tick(), Err(WreathError::NotRunning));
    drop(controller);

    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.write_count, 4);
}

#[test]
fn test_controller_write_fault_stops_and_releases() {
    let mut mock = MockOutputPort::new();
    // Zweiter Zyklus: LED 1 und 2 geschrieben, LED 3 schlägt fehl
    mock.fail_write_at = Some(6);
    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(None),
        fixed_config(date(2024, 12, 25)),
    )
    .unwrap();

    controller.tick().unwrap();
    assert_eq!(controller.output(), OutputState::from(ActiveSet::FULL));

    assert_eq!(
        controller.tick(),
        Err(WreathError::Output(OutputError::WriteFailed(
            LedPosition::Third
        )))
    );
    assert_eq!(controller.state(), WreathState::Stopped);
    assert_eq!(controller.output(), OutputState::OFF);
    assert_eq!(controller.tick(), Err(WreathError::NotRunning));
    drop(controller);

    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
    assert!(!mock.initialized);
}

// ============================================================================
// Tests: run_wreath()
// ============================================================================

#[test]
fn test_run_stops_on_signal_and_releases() {
    let mut mock = MockOutputPort::new();
    let mut delay = MockDelay::ready_for(2);
    let mut reports: Vec<TickReport> = Vec::new();

    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(None),
        fixed_config(date(2024, 12, 8)),
    )
    .unwrap();

    let result = block_on(run_wreath(
        &mut controller,
        &mut delay,
        yield_now(),
        |report| reports.push(*report),
    ));

    assert_eq!(result, Ok(()));
    assert_eq!(controller.state(), WreathState::Stopped);
    drop(controller);

    // Stopp wird ab der zweiten Abfrage fertig.
    // 3 Zyklen: zwei Delays fertig, beim dritten kommt der Stopp
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.active == set(&[1, 2])));
    assert_eq!(delay.calls, vec![60_000; 3]);
    assert_eq!(mock.write_count, 12);
    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

#[test]
fn test_run_stop_before_first_cycle_keeps_leds_off() {
    let mut mock = MockOutputPort::new();
    let mut delay = MockDelay::always_ready();
    let mut ticks = 0;

    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(None),
        fixed_config(date(2024, 12, 25)),
    )
    .unwrap();

    // Stopp schon angefordert (z.B. Taste während des Selbsttests)
    let result = block_on(run_wreath(
        &mut controller,
        &mut delay,
        core::future::ready(()),
        |_| ticks += 1,
    ));

    assert_eq!(result, Ok(()));
    assert_eq!(controller.state(), WreathState::Stopped);
    drop(controller);

    assert_eq!(ticks, 0);
    assert!(delay.calls.is_empty());
    assert_eq!(mock.write_count, 0);
    assert_eq!(mock.toggle_count, 0);
    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

#[test]
fn test_run_releases_on_write_fault() {
    let mut mock = MockOutputPort::new();
    // Zweiter Zyklus, zweite LED
    mock.fail_write_at = Some(5);
    let mut delay = MockDelay::always_ready();

    let mut controller = WreathController::start(
        &mut mock,
        FixedClock(None),
        fixed_config(date(2024, 12, 25)),
    )
    .unwrap();

    let result = block_on(run_wreath(
        &mut controller,
        &mut delay,
        core::future::pending::<()>(),
        |_| {},
    ));

    assert_eq!(
        result,
        Err(WreathError::Output(OutputError::WriteFailed(
            LedPosition::Second
        )))
    );
    assert_eq!(controller.state(), WreathState::Stopped);
    drop(controller);

    assert_eq!(delay.calls.len(), 1);
    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

#[test]
fn test_run_custom_poll_interval() {
    let mut mock = MockOutputPort::new();
    let mut delay = MockDelay::ready_for(0);
    let config = WreathConfig {
        clock_source: ClockSource::Fixed(date(2024, 12, 1)),
        poll_interval_secs: 5,
    };

    let mut controller = WreathController::start(&mut mock, FixedClock(None), config).unwrap();
    let result = block_on(run_wreath(
        &mut controller,
        &mut delay,
        yield_now(),
        |_| {},
    ));
    drop(controller);

    assert_eq!(result, Ok(()));
    assert_eq!(delay.calls, vec![5_000]);
}

#[test]
fn test_run_monotonic_until_year_rollover() {
    let mut mock = MockOutputPort::new();
    // 25.11.2024 bis 05.01.2025, ein Tag pro Zyklus
    let mut delay = MockDelay::ready_for(41);
    let mut reports: Vec<TickReport> = Vec::new();

    let mut controller = WreathController::start(
        &mut mock,
        SteppingClock::new(date(2024, 11, 25)),
        WreathConfig::default(),
    )
    .unwrap();

    block_on(run_wreath(
        &mut controller,
        &mut delay,
        yield_now(),
        |report| reports.push(*report),
    ))
    .unwrap();
    drop(controller);

    assert_eq!(reports.len(), 42);

    let (season, next_year): (Vec<&TickReport>, Vec<&TickReport>) = reports
        .iter()
        .partition(|r| r.date.is_some_and(|d| d.year() == 2024));

    for pair in season.windows(2) {
        assert!(pair[0].active.is_subset(pair[1].active));
    }
    assert_eq!(season.last().map(|r| r.active), Some(ActiveSet::FULL));

    // Neues Jahr: Schedule wird neu berechnet, alle LEDs aus
    assert!(next_year.iter().all(|r| r.active.is_empty()));
    assert!(
        next_year
            .iter()
            .all(|r| r.schedule == Some(compute_advent_sundays(year(2025))))
    );
    assert_eq!(mock.pins, [false; 4]);
}

// ============================================================================
// Tests: run_self_test()
// ============================================================================

#[test]
fn test_self_test_sequence() {
    let mut mock = MockOutputPort::new();
    let mut delay = MockDelay::always_ready();
    let mut steps = Vec::new();

    block_on(run_self_test(&mut mock, &mut delay, 1000, 1000, |p, lit| {
        steps.push((p.ordinal(), lit))
    }))
    .unwrap();

    assert_eq!(
        steps,
        vec![
            (1, true),
            (1, false),
            (2, true),
            (2, false),
            (3, true),
            (3, false),
            (4, true),
            (4, false),
        ]
    );
    assert_eq!(mock.writes.len(), 8);
    assert_eq!(delay.calls, vec![1000; 8]);
    assert_eq!(mock.init_count, 1);
    assert_eq!(mock.release_count, 1);
}

#[test]
fn test_self_test_releases_on_failure() {
    let mut mock = MockOutputPort::new();
    mock.fail_write_at = Some(3);
    let mut delay = MockDelay::always_ready();

    let result = block_on(run_self_test(&mut mock, &mut delay, 10, 20, |_, _| {}));

    assert_eq!(result, Err(OutputError::WriteFailed(LedPosition::Second)));
    assert_eq!(mock.release_count, 1);
    assert_eq!(mock.pins, [false; 4]);
}

// ============================================================================
// Tests: Konfiguration + Uhr
// ============================================================================

#[test]
fn test_override_date_from_config_string() {
    let today = parse_date("2024-12-08").unwrap();
    let config = fixed_config(today);
    assert_eq!(config.clock_source, ClockSource::Fixed(date(2024, 12, 8)));
    assert!(parse_date("08.12.2024").is_err());
}

#[test]
fn test_sntp_response_to_local_date() {
    // 2024-12-07T23:30:00Z als NTP-Timestamp
    let ntp_secs: u32 = (1_733_614_200u64 + sntp::NTP_UNIX_OFFSET) as u32;
    let mut packet = [0u8; sntp::SNTP_PACKET_SIZE];
    packet[0] = 0x24; // VN = 4, Mode = 4 (Server)
    packet[1] = 1;
    packet[40..44].copy_from_slice(&ntp_secs.to_be_bytes());

    let unix = sntp::parse_response(&packet).unwrap();
    assert_eq!(unix, 1_733_614_200);

    // UTC+1: schon der 2. Advent
    let today = local_date(unix as i64, 3600).unwrap();
    let schedule = compute_advent_sundays(Year::of(today));
    assert_eq!(active_set(today, &schedule), set(&[1, 2]));
}

// ============================================================================
// Tests: serde (Feature "serde")
// ============================================================================

#[test]
fn test_schedule_serializes_to_json() {
    let schedule = compute_advent_sundays(year(2024));
    let mut buffer = [0u8; 128];

    let len = serde_json_core::to_slice(&schedule, &mut buffer).unwrap();

    assert_eq!(
        std::str::from_utf8(&buffer[..len]).unwrap(),
        r#"{"sundays":["2024-12-01","2024-12-08","2024-12-15","2024-12-22"]}"#
    );
}

#[test]
fn test_config_json_roundtrip() {
    let mut buffer = [0u8; 128];
    let len = serde_json_core::to_slice(&WreathConfig::default(), &mut buffer).unwrap();
    assert_eq!(
        std::str::from_utf8(&buffer[..len]).unwrap(),
        r#"{"clock_source":"WallClock","poll_interval_secs":60}"#
    );

    let (config, _) = serde_json_core::from_slice::<WreathConfig>(
        br#"{"clock_source":"WallClock","poll_interval_secs":30}"#,
    )
    .unwrap();
    assert_eq!(config.clock_source, ClockSource::WallClock);
    assert_eq!(config.poll_interval_secs, 30);
}
