// Architecture Support Layer
//
// Privileged CPU primitives: interrupt masking, the exception vector
// table, the peripheral base query, and the supervisor-call privilege
// transition. On hosted targets (the integration tests) the masking
// primitives degrade to no-ops so the portable modules still build and
// run.

#[cfg(target_arch = "arm")]
pub mod armv7;

#[cfg(target_arch = "arm")]
pub use armv7::{
    disable_interrupts, enable_interrupts, install_vectors, irq_restore, irq_save, periphbase,
    wait_for_interrupt, SupervisorCall,
};

#[cfg(not(target_arch = "arm"))]
pub fn irq_save() -> u32 {
    0
}

#[cfg(not(target_arch = "arm"))]
pub fn irq_restore(_flags: u32) {}

#[cfg(not(target_arch = "arm"))]
pub fn wait_for_interrupt() {
    core::hint::spin_loop();
}
