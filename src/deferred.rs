//! Bounded deferred-call queue.
//!
//! Interrupt handlers produce, one worker context drains:
//!
//! ```text
//! ┌─────────────┐  pend_from_isr  ┌────────────────┐  drain  ┌──────────────┐
//! │ GPIO ISR    │────────────────▶│ DeferredQueue  │────────▶│ Worker task  │
//! │ Boot (task) │────────────────▶│ (N slots)      │         │ (one only)   │
//! └─────────────┘      pend       └────────────────┘         └──────────────┘
//! ```
//!
//! On hardware the FreeRTOS timer daemon plays this role
//! (`xTimerPendFunctionCallFromISR`) and this module is not built.  Here
//! it backs the simulation adapter, and its critical section comes from
//! `critical-section`'s std implementation.
//!
//! A button press that arrives while another is still pending is
//! coalesced into it: no queueing of duplicate presses.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Deque;

use crate::app::ports::{DeferredCall, DeferredPort, Pended};
use crate::error::{Error, Result};

/// Default depth, matching `CONFIG_FREERTOS_TIMER_QUEUE_LENGTH`.
pub const DEFERRED_QUEUE_CAP: usize = 10;

pub struct DeferredQueue<const N: usize = DEFERRED_QUEUE_CAP> {
    calls: Mutex<CriticalSectionRawMutex, RefCell<Deque<DeferredCall, N>>>,
}

impl<const N: usize> Default for DeferredQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeferredQueue<N> {
    pub const fn new() -> Self {
        Self {
            calls: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Enqueue without blocking.  Critical section only, no allocation.
    pub fn push(&self, call: DeferredCall) -> Result<Pended> {
        self.calls.lock(|calls| {
            let mut calls = calls.borrow_mut();
            if call.coalesces() && calls.iter().any(|c| *c == call) {
                return Ok(Pended::Coalesced);
            }
            calls
                .push_back(call)
                .map(|()| Pended::Queued)
                .map_err(|_| Error::ResourceExhausted)
        })
    }

    /// Dequeue the oldest pending call.
    pub fn pop(&self) -> Option<DeferredCall> {
        self.calls.lock(|calls| calls.borrow_mut().pop_front())
    }

    /// Run `handler` for every pending call, in FIFO order, outside the
    /// critical section.  Returns how many ran.
    pub fn drain(&self, mut handler: impl FnMut(DeferredCall)) -> usize {
        let mut ran = 0;
        while let Some(call) = self.pop() {
            handler(call);
            ran += 1;
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.calls.lock(|calls| calls.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> DeferredPort for DeferredQueue<N> {
    fn pend_from_isr(&self, call: DeferredCall) -> Result<Pended> {
        self.push(call)
    }

    /// Host queue never blocks; a full queue is reported immediately.
    fn pend(&self, call: DeferredCall) -> Result<Pended> {
        self.push(call)
    }
}
