// Interrupt Dispatcher
//
// Routes acknowledged interrupts to registered handler functions and
// enforces the controller's completion protocol.
//
// Key responsibilities:
// - Maintain the fixed-capacity line -> handler registry
// - Acknowledge exactly once per delivery, before any handler runs
// - Signal end-of-interrupt on every non-spurious return path
//
// Implementation details:
// - Runs with IRQs masked (ARM masks them on IRQ entry), so dispatch
//   never re-enters itself and the registry lock is never contended
//   against interrupt context.
// - An unregistered line is logged and completed; skipping completion
//   would wedge that line in the active state forever.

use spin::Mutex;

use crate::interrupts::gic::{Gic, SPURIOUS_ID};
use crate::log_warn;
use crate::util::without_interrupts;

/// Handler invoked for an acknowledged line. Receives the line id.
pub type IrqHandler = fn(u32);

pub const MAX_HANDLERS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    InvalidLine,
    AlreadyRegistered,
    TableFull,
}

#[derive(Clone, Copy)]
struct HandlerEntry {
    line: u32,
    handler: IrqHandler,
}

/// The line -> handler registry plus the dispatch entry point.
pub struct Dispatcher {
    table: Mutex<[Option<HandlerEntry>; MAX_HANDLERS]>,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Dispatcher {
            table: Mutex::new([None; MAX_HANDLERS]),
        }
    }

    /// Registers a handler for a line. Fails if the line is invalid,
    /// already claimed, or the registry is full; the registry is left
    /// unchanged on every error.
    pub fn register(&self, line: u32, handler: IrqHandler) -> Result<(), DispatchError> {
        if line >= 1020 {
            return Err(DispatchError::InvalidLine);
        }
        without_interrupts(|| {
            let mut table = self.table.lock();
            if table.iter().flatten().any(|e| e.line == line) {
                return Err(DispatchError::AlreadyRegistered);
            }
            for slot in table.iter_mut() {
                if slot.is_none() {
                    *slot = Some(HandlerEntry { line, handler });
                    return Ok(());
                }
            }
            Err(DispatchError::TableFull)
        })
    }

    /// Removes the handler for a line, if any.
    pub fn unregister(&self, line: u32) {
        without_interrupts(|| {
            let mut table = self.table.lock();
            for slot in table.iter_mut() {
                if matches!(slot, Some(e) if e.line == line) {
                    *slot = None;
                    return;
                }
            }
        })
    }

    fn lookup(&self, line: u32) -> Option<IrqHandler> {
        let table = self.table.lock();
        table
            .iter()
            .flatten()
            .find(|e| e.line == line)
            .map(|e| e.handler)
    }

    /// Handles one interrupt delivery: acknowledge, invoke the
    /// registered handler, complete. A spurious acknowledge returns
    /// immediately without a completion write. Completion is signalled
    /// whether or not a handler was found.
    pub fn dispatch(&self, gic: &Gic) {
        let line = gic.acknowledge();
        if line == SPURIOUS_ID {
            return;
        }

        match self.lookup(line) {
            Some(handler) => handler(line),
            None => log_warn!("irq", "no handler registered for line {}", line),
        }

        gic.end_of_interrupt(line);
    }
}
