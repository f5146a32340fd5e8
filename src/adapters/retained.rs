//! Retained-memory adapters for [`PersistentState`].
//!
//! - **`target_os = "espidf"`**: [`RtcRetained`] keeps the counter in
//!   `.rtc.data`, which stays powered through deep sleep and is
//!   re-initialised from the image (zero) on a cold boot.
//! - **any target**: [`MemoryRetained`] holds the value in ordinary RAM
//!   for host-side simulation and tests.

use crate::app::ports::PersistentState;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering};

/// Boot counter in RTC slow memory.
#[cfg(target_os = "espidf")]
#[unsafe(link_section = ".rtc.data")]
static BOOT_COUNT: AtomicU32 = AtomicU32::new(0);

/// Handle to the RTC retained region.  Only the entry point writes it.
#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
pub struct RtcRetained;

#[cfg(target_os = "espidf")]
impl PersistentState for RtcRetained {
    fn boot_count(&self) -> u32 {
        BOOT_COUNT.load(Ordering::Acquire)
    }

    fn set_boot_count(&mut self, count: u32) {
        BOOT_COUNT.store(count, Ordering::Release);
    }
}

/// RAM-backed stand-in for the retained region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRetained {
    boot_count: u32,
}

impl MemoryRetained {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power loss: everything retained is gone.
    pub fn power_cycle(&mut self) {
        self.boot_count = 0;
    }
}

impl PersistentState for MemoryRetained {
    fn boot_count(&self) -> u32 {
        self.boot_count
    }

    fn set_boot_count(&mut self, count: u32) {
        self.boot_count = count;
    }
}
