// Monotonic Time Service
//
// Maintains the kernel's monotonic tick counter and a small table of
// scheduled events driven from the timer interrupt.
//
// Key responsibilities:
// - Count ticks in a wrapping 32-bit counter advanced by the timer
// - Run due event callbacks, re-arming periodic entries
// - Provide the sanctioned wraparound-safe time comparison
//
// Implementation details:
// - The counter is an atomic; `now()` is safe from any context.
// - `tick()` runs in interrupt context. It invokes at most one due
//   callback per tick; further due entries fire on following ticks.
//   With a 1 ms tick and rare collisions the induced jitter is one
//   tick, which callers tolerate.
// - Callbacks run outside the table lock so they may schedule events.

use core::sync::atomic::{AtomicU32, Ordering};
use spin::Mutex;

use crate::util::without_interrupts;

pub const MAX_EVENTS: usize = 16;

/// Scheduled-event callback. Receives the argument given at
/// registration, typically a task id.
pub type EventCallback = fn(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystimeError {
    /// The event table is full.
    NoFreeSlot,
}

#[derive(Clone, Copy)]
struct Event {
    /// Absolute tick at which the event is due.
    time: u32,
    /// Re-arm interval; 0 means one-shot.
    period: u32,
    callback: EventCallback,
    arg: usize,
}

/// Wraparound-safe elapsed-time computation. This is the only correct
/// way to compare tick values; `reference + duration <= now` breaks at
/// the counter wrap.
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Due test for an absolute deadline: due when the deadline is at or
/// behind `now` in the wrapping order, i.e. less than half the counter
/// range ago.
fn is_due(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) < 0x8000_0000
}

/// The tick counter plus the scheduled-event table.
pub struct SysTime {
    ticks: AtomicU32,
    events: Mutex<[Option<Event>; MAX_EVENTS]>,
}

/// The kernel-wide time service instance.
pub static SYSTIME: SysTime = SysTime::new();

impl SysTime {
    pub const fn new() -> Self {
        SysTime {
            ticks: AtomicU32::new(0),
            events: Mutex::new([None; MAX_EVENTS]),
        }
    }

    /// Current tick count. Wraps; compare only via [`elapsed`].
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Schedules an event at absolute tick `time`. A non-zero `period`
    /// re-arms the event every `period` ticks after it fires; period 0
    /// frees the slot after one firing.
    ///
    /// Safe from mainline and interrupt context alike: the table lock
    /// is only ever taken with IRQs masked, so `tick` cannot preempt a
    /// holder.
    pub fn schedule_event(
        &self,
        time: u32,
        period: u32,
        callback: EventCallback,
        arg: usize,
    ) -> Result<(), SystimeError> {
        without_interrupts(|| {
            let mut events = self.events.lock();
            for slot in events.iter_mut() {
                if slot.is_none() {
                    *slot = Some(Event {
                        time,
                        period,
                        callback,
                        arg,
                    });
                    return Ok(());
                }
            }
            Err(SystimeError::NoFreeSlot)
        })
    }

    /// Occupied-slot bitmask, bit i set when slot i holds an event.
    pub fn occupancy(&self) -> u16 {
        without_interrupts(|| {
            let events = self.events.lock();
            let mut mask = 0u16;
            for (i, slot) in events.iter().enumerate() {
                if slot.is_some() {
                    mask |= 1 << i;
                }
            }
            mask
        })
    }

    /// Advances the counter by one tick and fires the first due event,
    /// if any. Runs in interrupt context; the callback is invoked after
    /// the table lock is dropped.
    pub fn tick(&self) {
        let now = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

        let fired = {
            let mut events = self.events.lock();
            let mut fired = None;
            for slot in events.iter_mut() {
                if let Some(event) = slot {
                    if is_due(now, event.time) {
                        fired = Some((event.callback, event.arg));
                        if event.period != 0 {
                            event.time = now.wrapping_add(event.period);
                        } else {
                            *slot = None;
                        }
                        break;
                    }
                }
            }
            fired
        };

        if let Some((callback, arg)) = fired {
            callback(arg);
        }
    }
}
