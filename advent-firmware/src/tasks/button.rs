// Stopp-Taste - BOOT-Taste (GPIO9) beendet den Adventskranz
use defmt::info;
use embassy_time::Timer;
use esp_hal::gpio::Input;

use crate::StopSignal;
use crate::config::BUTTON_DEBOUNCE_MS;

/// Stopp-Tasten Task
///
/// Wartet auf einen entprellten Tastendruck (active low) und
/// signalisiert dem Adventskranz-Task die Stopp-Anforderung.
///
/// # Parameter
/// - `button`: Eingang mit Pull-Up
/// - `stop`: Signal an `wreath_task`
#[embassy_executor::task]
pub async fn stop_button_task(mut button: Input<'static>, stop: &'static StopSignal) {
    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(BUTTON_DEBOUNCE_MS).await;

        if button.is_low() {
            info!("Button: Stop requested");
            stop.signal(());
            return;
        }
    }
}
