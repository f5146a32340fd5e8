//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! console line through the `log` facade (the ESP-IDF logger routes it to
//! UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            // Setup chatter stays below the console lines proper.
            AppEvent::PolicyApplied(_) | AppEvent::CountdownStarted { .. } => debug!("{}", event),
            _ => info!("{}", event),
        }
    }
}
