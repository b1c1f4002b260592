// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Stopp-Taste → Adventskranz über ein Signal, SNTP → Adventskranz über die Wanduhr.

pub mod button;
pub mod sntp;
pub mod wifi;
pub mod wreath;

// Re-export Tasks für einfachen Import
pub use button::stop_button_task;
pub use sntp::sntp_task;
pub use wifi::{connection_task, dhcp_task, net_task};
pub use wreath::wreath_task;
