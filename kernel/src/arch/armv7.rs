// ARMv7-A Privileged Primitives
//
// CPU-level support for the Cortex-A9: exception vectors, CPSR
// interrupt masking, the CP15 peripheral base query, and the
// supervisor-call implementation of the privilege transition.
//
// Mode encodings used below: 0x10 user, 0x13 supervisor, 0x1F system
// (privileged, shares the user register bank).
//
// The task entry/exit path:
// - `argon_enter_task` saves the supervisor-mode status and stack in
//   ARGON_RESUME, hops through system mode to seed the user stack
//   pointer, drops to user mode and calls the task entry.
// - When the entry returns, the stub branches to `argon_task_ended`,
//   which issues the end-of-task trap through the transition's
//   `trap_return`.
// - The trap (operation 0, task ended) lands in the SVC vector, which
//   stores the task's register state into ARGON_TASK_CONTEXT, discards
//   the trap frame, reloads the saved stack and status, and returns
//   into the scheduler loop. This is the only path back to privileged
//   mainline execution.
// - Other trap operations go to `argon_svc_handler` and return through
//   the normal trap exit.

use core::arch::{asm, global_asm};

use crate::log_warn;
use crate::switch::{PrivilegeTransition, TaskContext};

/// Resume slot for the scheduler context: [cpsr, sp] at the moment a
/// task was entered. Written by `argon_enter_task`, read by the SVC
/// vector's task-ended path. Single core, one task in flight.
#[no_mangle]
static mut ARGON_RESUME: [u32; 2] = [0; 2];

/// The ending task's register state, captured by the SVC vector at the
/// end-of-task trap and handed back to the scheduler. The store
/// offsets in the assembly follow the `TaskContext` field order.
#[no_mangle]
static mut ARGON_TASK_CONTEXT: TaskContext = TaskContext::new();

global_asm!(
    r#"
    .arm
    .section .text
    .align 5
    .global argon_vectors
argon_vectors:
    b .                         @ reset
    b .                         @ undefined instruction
    b argon_svc_stub            @ supervisor call
    b .                         @ prefetch abort
    b .                         @ data abort
    b .                         @ reserved
    b argon_irq_stub            @ irq
    b .                         @ fiq

argon_irq_stub:
    sub lr, lr, #4
    stmfd sp!, {{r0-r3, r12, lr}}
    bl irq_entry
    ldmfd sp!, {{r0-r3, r12, pc}}^

argon_svc_stub:
    stmfd sp!, {{r0-r3, r12, lr}}
    ldr r0, [lr, #-4]           @ trapping instruction
    bic r0, r0, #0xFF000000     @ comment field = trap operation
    cmp r0, #0
    beq 1f
    bl argon_svc_handler
    ldmfd sp!, {{r0-r3, r12, pc}}^
1:                              @ operation 0: task ended
    ldr r0, =ARGON_TASK_CONTEXT
    add r1, r0, #16
    stmia r1, {{r4-r11}}        @ task r4-r11, still live (unbanked)
    ldmfd sp!, {{r1-r3}}        @ task r0-r2 from the trap frame
    stmia r0, {{r1-r3}}
    ldmfd sp!, {{r1-r3}}        @ task r3, r12, return address
    str r1, [r0, #12]
    str r2, [r0, #48]
    str r3, [r0, #60]           @ pc: the instruction after the trap
    add r1, r0, #52
    stmia r1, {{sp, lr}}^       @ user-bank sp and lr
    mrs r1, spsr
    str r1, [r0, #64]           @ cpsr at the trap
    ldr r0, =ARGON_RESUME
    ldr r1, [r0, #0]
    msr spsr_cxsf, r1
    ldr sp, [r0, #4]            @ back on the scheduler stack
    pop {{r4-r11, lr}}
    movs pc, lr                 @ resume the scheduler with the saved status

    .global argon_enter_task
argon_enter_task:
    push {{r4-r11, lr}}
    ldr r1, =ARGON_RESUME
    mrs r2, cpsr
    str r2, [r1, #0]
    mov r2, sp
    str r2, [r1, #4]
    cps #0x1F                   @ system mode shares the user stack pointer
    mov sp, r2
    mrs r3, cpsr
    bic r3, r3, #0xF            @ 0x1F -> 0x10
    msr cpsr_c, r3              @ unprivileged from here on
    blx r0
    b argon_task_ended          @ does not return

    .ltorg
"#
);

extern "C" {
    fn argon_enter_task(entry: fn());
}

/// Unknown trap operations end up here; the trap returns normally.
#[no_mangle]
pub extern "C" fn argon_svc_handler(op: u32) {
    log_warn!("trap", "unhandled trap operation {}", op);
}

/// Landing point for a task body that returned: issue the end-of-task
/// trap. Runs in user mode; the trap handler never comes back here.
#[no_mangle]
extern "C" fn argon_task_ended() -> ! {
    SupervisorCall.trap_return();
    loop {
        core::hint::spin_loop();
    }
}

/// Supervisor-call based privilege transition.
pub struct SupervisorCall;

impl PrivilegeTransition for SupervisorCall {
    fn enter_unprivileged(&self, entry: fn()) -> TaskContext {
        unsafe {
            argon_enter_task(entry);
            core::ptr::read(core::ptr::addr_of!(ARGON_TASK_CONTEXT))
        }
    }

    fn trap_return(&self) {
        unsafe { asm!("svc #0") }
    }
}

/// Points VBAR at the exception vector table. Must run before
/// interrupts are enabled.
pub fn install_vectors() {
    extern "C" {
        static argon_vectors: u8;
    }
    unsafe {
        let addr = &argon_vectors as *const u8 as u32;
        asm!("mcr p15, 0, {0}, c12, c0, 0", in(reg) addr, options(nomem, nostack));
    }
}

/// Private-peripheral base address from CP15 (CBAR). The GIC and the
/// private timer register blocks sit at fixed offsets from it.
pub fn periphbase() -> usize {
    let base: u32;
    unsafe {
        asm!("mrc p15, 4, {0}, c15, c0, 0", out(reg) base, options(nomem, nostack));
    }
    base as usize
}

pub fn enable_interrupts() {
    unsafe { asm!("cpsie i", options(nomem, nostack)) }
}

pub fn disable_interrupts() {
    unsafe { asm!("cpsid i", options(nomem, nostack)) }
}

/// Masks IRQs and returns the previous status word for [`irq_restore`].
pub fn irq_save() -> u32 {
    let cpsr: u32;
    unsafe {
        asm!("mrs {0}, cpsr", "cpsid i", out(reg) cpsr, options(nomem, nostack));
    }
    cpsr
}

/// Re-enables IRQs only if they were enabled in the saved status word.
pub fn irq_restore(flags: u32) {
    const IRQ_MASKED: u32 = 1 << 7;
    if flags & IRQ_MASKED == 0 {
        enable_interrupts();
    }
}

pub fn wait_for_interrupt() {
    unsafe { asm!("wfi", options(nomem, nostack)) }
}
