//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                               | Connects to            |
//! |-------------|------------------------------------------|------------------------|
//! | `log_sink`  | EventSink                                | Serial log output      |
//! | `platform`  | PowerPort, WakeSourcePort, StatusPort    | ESP-IDF pm/sleep/gpio  |
//! | `retained`  | PersistentState                          | RTC slow memory / RAM  |
//! | `sim`       | PowerPort, WakeSourcePort, StatusPort    | Host simulation        |

pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod platform;
pub mod retained;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
