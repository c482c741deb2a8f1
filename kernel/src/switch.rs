// Privilege Transition Interface
//
// Defines the saved execution context and the seam through which the
// scheduler enters and leaves unprivileged execution. All mode-switch
// and trap encodings live behind [`PrivilegeTransition`]; the scheduler
// never touches a status register or trap instruction directly.

/// Saved execution context for a task, in the layout the low-level
/// entry/exit code writes and reads. Field order is shared with the
/// assembly stubs and must not change.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskContext {
    pub r: [u32; 13],
    pub sp: u32,
    pub lr: u32,
    pub pc: u32,
    pub cpsr: u32,
}

impl TaskContext {
    pub const fn new() -> Self {
        TaskContext {
            r: [0; 13],
            sp: 0,
            lr: 0,
            pc: 0,
            cpsr: 0,
        }
    }
}

/// The mechanism that moves the CPU between privileged scheduler
/// context and unprivileged task context.
///
/// `enter_unprivileged` drops privilege, runs the entry function, and
/// returns to the caller once the task has trapped back with the
/// task-ended operation. It is only called from the mainline scheduler
/// loop, never from interrupt context.
pub trait PrivilegeTransition {
    /// Runs `entry` in unprivileged mode until the task signals
    /// completion via [`trap_return`](Self::trap_return). Returns the
    /// task's execution context as captured at that trap; the
    /// scheduler stores it in the task's descriptor slot.
    fn enter_unprivileged(&self, entry: fn()) -> TaskContext;

    /// Issues the end-of-task trap from unprivileged code. The entry
    /// path branches here when the task body returns. Control does not
    /// come back; the trap handler resumes the scheduler.
    fn trap_return(&self);
}
