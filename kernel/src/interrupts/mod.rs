// Interrupt Handling Subsystem
//
// Ties the controller driver and the dispatcher together and owns the
// kernel's single interrupt-controller instance.
//
// Key responsibilities:
// - Hold the [`Gic`] instance for the platform register blocks
// - Expose registration/enable facades used during bring-up
// - Provide the entry point the IRQ exception stub calls into
//
// Board facts (QEMU vexpress-a9): the private timer interrupts on PPI
// line 29, the first PL011 UART on SPI line 37. The register blocks
// live at fixed offsets from the CP15-reported peripheral base.

pub mod dispatch;
pub mod gic;

use spin::Once;

use self::dispatch::{DispatchError, Dispatcher, IrqHandler};
use self::gic::{Gic, GicError};

/// Cortex-A9 private timer interrupt (private peripheral interrupt).
pub const TIMER_LINE: u32 = 29;
/// PL011 UART0 interrupt (shared peripheral interrupt).
pub const UART0_LINE: u32 = 37;

/// Register block offsets from the peripheral base (Cortex-A9 MPCore).
pub const GIC_CPU_OFFSET: usize = 0x0100;
pub const GIC_DIST_OFFSET: usize = 0x1000;

static GIC: Once<Gic> = Once::new();
static DISPATCHER: Dispatcher = Dispatcher::new();

/// Initializes the interrupt controller over the given register blocks.
///
/// # Safety
///
/// The addresses must be the platform's distributor and CPU interface
/// blocks; see [`Gic::new`]. Call once, before enabling any line.
pub unsafe fn init(dist_base: usize, cpu_base: usize) {
    let gic = GIC.call_once(|| Gic::new(dist_base, cpu_base));
    gic.init();
}

/// Registers a handler for an interrupt line.
pub fn register_handler(line: u32, handler: IrqHandler) -> Result<(), DispatchError> {
    DISPATCHER.register(line, handler)
}

/// Enables delivery of an interrupt line to this CPU.
pub fn enable_line(line: u32) -> Result<(), GicError> {
    match GIC.get() {
        Some(gic) => gic.enable_line(line),
        None => Err(GicError::NotInitialized),
    }
}

/// Disables delivery of an interrupt line.
pub fn disable_line(line: u32) -> Result<(), GicError> {
    match GIC.get() {
        Some(gic) => gic.disable_line(line),
        None => Err(GicError::NotInitialized),
    }
}

/// Entry point for the IRQ exception stub. Runs with IRQs masked.
#[no_mangle]
pub extern "C" fn irq_entry() {
    if let Some(gic) = GIC.get() {
        DISPATCHER.dispatch(gic);
    }
}
