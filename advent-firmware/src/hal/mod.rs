// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul kapselt Hardware-Zugriffe hinter den Traits aus advent-core,
// um Testbarkeit und Wartbarkeit zu verbessern.

pub mod led_outputs;

pub use led_outputs::GpioOutputPort;
