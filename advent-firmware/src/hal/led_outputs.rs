// GPIO Output Port für die vier Kerzen-LEDs
//
// Implementiert den OutputPort-Trait aus advent-core mit esp-hal GPIO-Ausgängen.
// Tests laufen gegen MockOutputPort in advent-tests.

use advent_core::{LedPosition, OutputError, OutputPort};
use esp_hal::gpio::{Level, Output};

/// Real Hardware Output Port
///
/// Hält die vier bereits als Output konfigurierten Pins (1. bis 4. Advent).
/// Nach `release()` sind alle Pins low und weitere Schreibzugriffe schlagen
/// fehl, bis `initialize()` erneut aufgerufen wird.
pub struct GpioOutputPort<'a> {
    leds: [Output<'a>; 4],
    active: bool,
}

impl<'a> GpioOutputPort<'a> {
    /// Erstellt einen neuen GpioOutputPort
    ///
    /// # Parameter
    /// - `leds`: Output-Pins in Reihenfolge 1. bis 4. Advent
    pub fn new(leds: [Output<'a>; 4]) -> Self {
        Self {
            leds,
            active: false,
        }
    }

    fn all_low(&mut self) {
        for led in &mut self.leds {
            led.set_low();
        }
    }
}

impl OutputPort for GpioOutputPort<'_> {
    fn initialize(&mut self) -> Result<(), OutputError> {
        self.all_low();
        if self.leds.iter().any(|led| led.is_set_high()) {
            return Err(OutputError::InitFailed);
        }
        self.active = true;
        Ok(())
    }

    fn set(&mut self, position: LedPosition, lit: bool) -> Result<(), OutputError> {
        if !self.active {
            return Err(OutputError::WriteFailed(position));
        }

        let led = &mut self.leds[position.index()];
        led.set_level(Level::from(lit));

        // Output-Register zurücklesen
        if led.is_set_high() != lit {
            return Err(OutputError::WriteFailed(position));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), OutputError> {
        self.active = false;
        self.all_low();
        if self.leds.iter().any(|led| led.is_set_high()) {
            return Err(OutputError::ReleaseFailed);
        }
        Ok(())
    }
}
