// Kernel entry point and system initialization
//
// Defines the kernel entry point (`kmain`) and orchestrates bring-up of the
// privileged control core: console/logging, the GIC, the interrupt
// dispatcher, the private timer, the monotonic time service, and finally the
// scheduler, which owns execution from then on.
//
// Key responsibilities:
// - Install the exception vector table and discover peripheral bases
// - Initialize early I/O (serial sink, logging)
// - Program the interrupt controller and register line handlers
// - Start the periodic timer that drives the monotonic tick
// - Register the demo tasks and hand control to the scheduler run loop
//
// Design and implementation:
// - Initialization follows a strict, explicit ordering: handlers are
//   registered before their lines are enabled, and CPU interrupts are
//   enabled only after the controller is fully programmed
// - Configuration failures during bring-up are logged and the affected
//   feature is skipped; the core keeps running degraded where it can
// - The hardware-facing pieces (vectors, MMIO bases, privilege switching)
//   are confined to `arch`, `serial` and the ARM-only `boot` section;
//   everything else builds and tests on a hosted target
//
// Out of scope here, consumed through narrow seams: line-based UART I/O
// (the console sink), boot-time stack/segment setup, and image packaging.

#![no_std]

pub mod arch;
pub mod console;
pub mod interrupts;
pub mod log;
pub mod sched;
pub mod switch;
pub mod systime;
pub mod timer;
pub mod util;

#[cfg(target_arch = "arm")]
pub mod serial;
#[cfg(target_arch = "arm")]
pub mod tasks;

#[cfg(target_arch = "arm")]
mod boot {
    use super::*;
    use core::panic::PanicInfo;
    use spin::Once;

    use crate::timer::PrivateTimer;
    use crate::{log_error, log_info, log_panic};

    const LOG_KERNEL_INIT: &str = "kernel";
    const LOG_SCHED: &str = "sched";

    /// Peripheral clock feeding the A9 private timer (vexpress-a9 PERIPHCLK).
    const PERIPH_CLOCK_HZ: u32 = 100_000_000;

    /// Tick period, in milliseconds. The logging timestamp math assumes
    /// this stays 1.
    const TICK_PERIOD_MS: u32 = 1;

    static TIMER: Once<PrivateTimer> = Once::new();

    #[no_mangle]
    pub extern "C" fn kmain() -> ! {
        serial::init();
        console::set_sink(serial::sink);
        log::init();

        log_info!(LOG_KERNEL_INIT, "argon core starting");

        arch::install_vectors();

        let periphbase = arch::periphbase();
        unsafe {
            interrupts::init(
                periphbase + interrupts::GIC_DIST_OFFSET,
                periphbase + interrupts::GIC_CPU_OFFSET,
            );
        }

        if let Err(e) = interrupts::register_handler(interrupts::TIMER_LINE, timer_reaction) {
            log_error!(LOG_KERNEL_INIT, "timer handler registration failed: {:?}", e);
        }
        if let Err(e) = interrupts::register_handler(interrupts::UART0_LINE, uart_reaction) {
            log_error!(LOG_KERNEL_INIT, "uart handler registration failed: {:?}", e);
        }
        if let Err(e) = interrupts::enable_line(interrupts::TIMER_LINE) {
            log_error!(LOG_KERNEL_INIT, "failed to enable timer line: {:?}", e);
        }
        if let Err(e) = interrupts::enable_line(interrupts::UART0_LINE) {
            log_error!(LOG_KERNEL_INIT, "failed to enable uart line: {:?}", e);
        }

        arch::enable_interrupts();

        let timer = TIMER.call_once(|| unsafe {
            PrivateTimer::new(periphbase + timer::TIMER_OFFSET, PERIPH_CLOCK_HZ)
        });
        if timer.init(TICK_PERIOD_MS).is_err() {
            log_error!(LOG_KERNEL_INIT, "failed to initialize CPU timer");
        }

        if let Err(e) = sched::SCHEDULER.add_task(tasks::task_alpha, 5000) {
            log_error!(LOG_SCHED, "failed to add task alpha: {:?}", e);
        }
        if let Err(e) = sched::SCHEDULER.add_task(tasks::task_beta, 2000) {
            log_error!(LOG_SCHED, "failed to add task beta: {:?}", e);
        }
        if let Err(e) = sched::SCHEDULER.arm_events(&systime::SYSTIME, task_switch_callback) {
            log_error!(LOG_SCHED, "failed to arm task events: {:?}", e);
        }

        log_info!(LOG_SCHED, "handing over to scheduler");
        sched::SCHEDULER.run(&arch::SupervisorCall, &systime::SYSTIME)
    }

    /// Timer reaction: clear the peripheral interrupt first (it re-fires
    /// immediately otherwise), then advance the monotonic clock.
    fn timer_reaction(_line: u32) {
        if let Some(timer) = TIMER.get() {
            timer.clear_interrupt();
        }
        systime::SYSTIME.tick();
    }

    /// RX handling belongs to the UART collaborator; the line only needs a
    /// registered reaction so delivery completes cleanly.
    fn uart_reaction(_line: u32) {}

    /// Runs in interrupt context: posts the scheduling decision and nothing
    /// more. The mainline run loop performs the actual transition.
    fn task_switch_callback(arg: usize) {
        sched::SCHEDULER.request_switch(arg, systime::SYSTIME.now());
    }

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        log_panic!("PANIC", "{}", info);
        arch::disable_interrupts();
        loop {
            arch::wait_for_interrupt();
        }
    }
}
