// WiFi Tasks - WLAN-Verbindung als Grundlage für SNTP
use defmt::{Debug2Format, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// WiFi Connection Task
///
/// Verbindet als Station mit dem Access Point und reconnected nach jedem
/// Abbruch. Ohne WLAN bleibt die Wanduhr unsynchronisiert (alle LEDs aus),
/// ein festes Testdatum funktioniert trotzdem.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Starting connection task");

    loop {
        if let Err(step) = connect_station(&mut controller).await {
            warn!("WiFi: {} failed, retry in {}s", step, WIFI_RETRY_DELAY_SECS);
            Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
            continue;
        }

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Disconnected from '{}'", WIFI_SSID);
        Timer::after(Duration::from_secs(2)).await;
    }
}

/// Startet den Station-Modus (falls nötig) und verbindet
///
/// Gibt im Fehlerfall den fehlgeschlagenen Schritt zurück.
async fn connect_station(controller: &mut WifiController<'static>) -> Result<(), &'static str> {
    if matches!(controller.is_started(), Ok(false)) {
        let mode = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(WIFI_SSID.into())
                .with_password(WIFI_PASSWORD.into()),
        );

        controller.set_config(&mode).map_err(|e| {
            warn!("WiFi: {}", Debug2Format(&e));
            "Configuration"
        })?;
        controller.start_async().await.map_err(|e| {
            warn!("WiFi: {}", Debug2Format(&e));
            "Start"
        })?;
    }

    info!("WiFi: Connecting to '{}'...", WIFI_SSID);
    controller.connect_async().await.map_err(|e| {
        warn!("WiFi: {}", Debug2Format(&e));
        "Connect"
    })?;
    info!("WiFi: Connected");
    Ok(())
}

/// Network Task
///
/// Prozessiert Netzwerk-Pakete (DHCP, DNS, UDP)
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task
///
/// Loggt die Netzwerk-Konfiguration, sobald eine IP-Adresse vorliegt.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address {}", Debug2Format(&config.address));
        info!("WiFi: DNS servers {}", Debug2Format(&config.dns_servers));
    }
}
