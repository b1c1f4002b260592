// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

// ============================================================================
// LED Konfiguration
// ============================================================================

// Verdrahtung (Pins werden in `main.rs` direkt aus den Peripherals genommen):
//
// GPIO 18 ---[100 Ω]---|>|--- GND  (LED 1. Advent)
// GPIO 19 ---[100 Ω]---|>|--- GND  (LED 2. Advent)
// GPIO 20 ---[100 Ω]---|>|--- GND  (LED 3. Advent)
// GPIO 21 ---[100 Ω]---|>|--- GND  (LED 4. Advent)
// GPIO 9  = BOOT-Taste gegen GND (Stopp-Anforderung, interner Pull-Up)

/// Entprell-Zeit für die Stopp-Taste in Millisekunden
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Intervall zwischen zwei Prüfungen in Sekunden
pub const POLL_INTERVAL_SECS: u64 = advent_core::DEFAULT_POLL_INTERVAL_SECS;

/// LED-Selbsttest beim Booten (jede LED 1 s an, 1 s aus)
pub const LED_SELF_TEST_ON_BOOT: bool = true;

/// Leuchtdauer pro LED im Selbsttest in Millisekunden
pub const SELF_TEST_ON_MS: u64 = 1000;

/// Pause nach jeder LED im Selbsttest in Millisekunden
pub const SELF_TEST_OFF_MS: u64 = 1000;

// ============================================================================
// Datum / Uhr Konfiguration
// ============================================================================

/// Festes Testdatum (YYYY-MM-DD) statt Wanduhr, z.B. "2024-12-08"
/// Wird zur Build-Zeit aus der Environment Variable ADVENT_TEST_DATE geladen
/// Nicht gesetzt → SNTP-Uhr
pub const ADVENT_TEST_DATE: Option<&str> = option_env!("ADVENT_TEST_DATE");

/// Verschiebung der Ortszeit gegenüber UTC in Sekunden
/// Adventszeit liegt immer in der Winterzeit: MEZ = UTC+1
pub const UTC_OFFSET_SECS: i32 = 3600;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Wartezeit nach fehlgeschlagenem Verbindungsversuch in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Anzahl Sockets im Netzwerk-Stack (DNS + SNTP)
pub const NET_SOCKET_COUNT: usize = 3;

// ============================================================================
// SNTP Konfiguration
// ============================================================================

/// NTP-Server Hostname
/// Kann zur Build-Zeit über NTP_SERVER überschrieben werden
pub const NTP_SERVER: &str = match option_env!("NTP_SERVER") {
    Some(server) => server,
    None => "pool.ntp.org",
};

/// Lokaler UDP-Port für SNTP-Anfragen
pub const SNTP_LOCAL_PORT: u16 = 50123;

/// Abstand zwischen zwei erfolgreichen Synchronisationen in Sekunden
pub const SNTP_RESYNC_SECS: u64 = 3600;

/// Wartezeit nach fehlgeschlagener Synchronisation in Sekunden
pub const SNTP_RETRY_DELAY_SECS: u64 = 10;

/// Timeout für eine SNTP-Antwort in Sekunden
pub const SNTP_TIMEOUT_SECS: u64 = 5;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// UDP Buffer-Größe für SNTP (Bytes)
pub const SNTP_UDP_BUFFER_SIZE: usize = 128;

/// Anzahl UDP Paket-Metadaten Slots (RX/TX)
pub const SNTP_UDP_METADATA_SLOTS: usize = 2;
