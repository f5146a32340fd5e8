//! Boot counting in retained memory.

use log::debug;

use crate::app::ports::PersistentState;

/// Increment the retained boot counter and return the new value.
///
/// Call exactly once per boot, from the entry point, before anything
/// else reads the counter.  Saturates rather than wrapping back to zero.
pub fn record_boot<P: PersistentState>(retained: &mut P) -> u32 {
    let previous = retained.boot_count();
    let count = previous.saturating_add(1);
    retained.set_boot_count(count);
    debug!("boot: retained count {} -> {}", previous, count);
    count
}
