// Kernel Utilities
//
// Provides common utility functions used across the kernel.
//
// Key features:
// - Interrupt-safe critical sections around shared-table access

/// Run `f` with IRQs masked, restoring the previous mask state afterwards.
///
/// This is the required discipline around every mainline access to state
/// that interrupt context also touches (task table, event table, console
/// sink): there are no locks an interrupt handler could block on, only
/// mask-and-release sections short enough not to matter.
#[inline(always)]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let saved = crate::arch::irq_save();
    let result = f();
    crate::arch::irq_restore(saved);
    result
}
