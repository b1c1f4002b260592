// Build-Script: Wird vor dem Kompilieren ausgeführt
// Konfiguriert den Linker für ESP32-C6 Embedded Rust

fn main() {
    // Lade .env file für WiFi-Credentials und optionales Testdatum
    // Fehler ignorieren wenn .env nicht existiert (dann müssen ENV vars gesetzt sein)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  .env file nicht gefunden: {}", e);
        eprintln!("   Setze WIFI_SSID und WIFI_PASSWORD als Environment-Variablen");
    }

    // Gebe Konfiguration an Rust-Compiler weiter
    // Die Werte werden zur Compile-Zeit in den Code eingebacken
    for key in ["WIFI_SSID", "WIFI_PASSWORD", "NTP_SERVER", "ADVENT_TEST_DATE"] {
        println!("cargo:rerun-if-env-changed={}", key);
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }

    // Registriere hilfsbereiten Error-Handler für Linker-Fehler
    linker_be_nice();

    // Füge Linker-Skripte hinzu:

    // 1. defmt.x - defmt Logging-Support
    //    Definiert Symbole für defmt's binäres Log-Format
    println!("cargo:rustc-link-arg=-Tdefmt.x");

    // 2. linkall.x - ESP32 Memory-Layout
    //    WICHTIG: Muss als LETZTES kommen (sonst Probleme mit flip-link)
    //    Definiert Flash/RAM-Layout und Startup-Code
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

// Error-Handler: Zeigt hilfreiche Tipps bei Linker-Fehlern
// Wird vom Linker als "--error-handling-script" aufgerufen
fn linker_be_nice() {
    let args: Vec<String> = std::env::args().collect();

    // Vom Linker aufgerufen: <kind> <symbol>
    if let [_, kind, what, ..] = args.as_slice() {
        if kind != "undefined-symbol" {
            std::process::exit(1);
        }
        if let Some(hint) = linker_hint(what) {
            eprintln!();
            eprintln!("💡 {}", hint);
            eprintln!();
        }
        std::process::exit(0);
    }

    match std::env::current_exe() {
        Ok(exe) => println!(
            "cargo:rustc-link-arg=--error-handling-script={}",
            exe.display()
        ),
        Err(e) => eprintln!("⚠️  Linker-Hilfe nicht verfügbar: {}", e),
    }
}

/// Tipp zu einem undefinierten Symbol
fn linker_hint(symbol: &str) -> Option<&'static str> {
    const ALLOC_SYMBOLS: [&str; 8] = [
        "free",
        "malloc",
        "calloc",
        "get_free_internal_heap_size",
        "malloc_internal",
        "realloc_internal",
        "calloc_internal",
        "free_internal",
    ];

    if symbol.starts_with("_defmt_") {
        Some("`defmt` not found - is `defmt.x` passed to the linker and `esp-println` linked?")
    } else if symbol == "_stack_start" {
        Some("Is the linker script `linkall.x` missing?")
    } else if symbol.starts_with("esp_rtos_") {
        Some("`esp-radio` has no scheduler - is `esp_rtos::start` called in main?")
    } else if ALLOC_SYMBOLS.contains(&symbol) {
        Some("Did you forget the `esp-alloc` dependency or its `compat` feature?")
    } else {
        None
    }
}
