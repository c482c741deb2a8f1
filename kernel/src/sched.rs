// Task Scheduler
//
// Owns the task table and decides which task runs next, in two modes:
//
// - Cooperative: the mainline loop polls for due tasks and calls their
//   entries inline. No interrupts involved.
// - Timer-driven: one periodic event per task in the time service. The
//   event callback runs in interrupt context and only POSTS a switch
//   decision; the mainline loop consumes the decision and performs the
//   actual privilege transition. Interrupt context never enters a task.
//
// Key responsibilities:
// - Fixed-capacity task table with stable small-integer ids
// - Wraparound-safe due test for periodic activation
// - Single-producer single-consumer switch handoff between interrupt
//   context and the mainline loop
//
// Implementation details:
// - `selected` tracks the most recently chosen task. It persists until
//   a different task is chosen, so a task whose period elapses again
//   while it is still the latest choice is not re-posted. This is what
//   lets a long-running task absorb its own missed periods.
// - The handoff is a single atomic slot. A new decision overwrites an
//   unconsumed older one; the latest decision wins.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

use crate::log_info;
use crate::switch::{PrivilegeTransition, TaskContext};
use crate::systime::{elapsed, EventCallback, SysTime, SystimeError};

pub const MAX_TASKS: usize = 10;

/// Sentinel for "no task" in the handoff slot and the selection state.
const NO_TASK: usize = usize::MAX;

pub type TaskId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// A period of zero never comes due.
    InvalidPeriod,
    /// The task table is full; the table is left unchanged.
    TooManyTasks,
}

#[derive(Clone, Copy)]
struct Task {
    entry: fn(),
    period: u32,
    /// Tick at which the task last started running.
    last_run: u32,
    /// Register state captured at the task's last end-of-task trap.
    context: TaskContext,
}

/// Formats a task id, with the no-task sentinel shown as idle.
struct TaskLabel(usize);

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == NO_TASK {
            f.write_str("(idle)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

pub struct Scheduler {
    tasks: Mutex<[Option<Task>; MAX_TASKS]>,
    /// SPSC handoff: interrupt context stores, the mainline loop swaps
    /// out. Holds NO_TASK when empty.
    pending: AtomicUsize,
    /// Latest posted decision; producer-side only.
    selected: AtomicUsize,
}

/// The kernel-wide scheduler instance.
pub static SCHEDULER: Scheduler = Scheduler::new();

impl Scheduler {
    pub const fn new() -> Self {
        Scheduler {
            tasks: Mutex::new([None; MAX_TASKS]),
            pending: AtomicUsize::new(NO_TASK),
            selected: AtomicUsize::new(NO_TASK),
        }
    }

    /// Adds a task that becomes due every `period` ticks. Ids are
    /// assigned in registration order and remain stable.
    pub fn add_task(&self, entry: fn(), period: u32) -> Result<TaskId, SchedError> {
        if period == 0 {
            return Err(SchedError::InvalidPeriod);
        }
        let mut tasks = self.tasks.lock();
        for (id, slot) in tasks.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(Task {
                    entry,
                    period,
                    last_run: 0,
                    context: TaskContext::new(),
                });
                return Ok(id);
            }
        }
        Err(SchedError::TooManyTasks)
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.lock().iter().flatten().count()
    }

    /// Register state a task last trapped back with, if it exists.
    /// All-zero until the task has completed a run.
    pub fn context(&self, id: TaskId) -> Option<TaskContext> {
        self.tasks.lock().get(id).copied().flatten().map(|t| t.context)
    }

    /// Cooperative mode: runs the first due task inline, stamping its
    /// start time, and returns its id. `None` when nothing is due.
    ///
    /// A task is due when at least `period` ticks have elapsed since it
    /// last started, computed with the wrapping subtraction so the test
    /// survives counter wraparound.
    pub fn poll_cooperative(&self, now: u32) -> Option<TaskId> {
        let (id, entry) = {
            let mut tasks = self.tasks.lock();
            let mut found = None;
            for (id, slot) in tasks.iter_mut().enumerate() {
                if let Some(task) = slot {
                    if elapsed(now, task.last_run) >= task.period {
                        task.last_run = now;
                        found = Some((id, task.entry));
                        break;
                    }
                }
            }
            found?
        };
        entry();
        Some(id)
    }

    /// Cooperative scheduler loop. Never returns.
    pub fn run_cooperative(&self, time: &SysTime) -> ! {
        loop {
            if self.poll_cooperative(time.now()).is_none() {
                crate::arch::wait_for_interrupt();
            }
        }
    }

    /// Timer-driven mode setup: registers one repeating event per task,
    /// first due one period after the task's last start, carrying the
    /// task id as the callback argument.
    pub fn arm_events(&self, time: &SysTime, callback: EventCallback) -> Result<(), SystimeError> {
        let tasks = self.tasks.lock();
        for (id, slot) in tasks.iter().enumerate() {
            if let Some(task) = slot {
                time.schedule_event(
                    task.last_run.wrapping_add(task.period),
                    task.period,
                    callback,
                    id,
                )?;
            }
        }
        Ok(())
    }

    /// Posts a switch decision from interrupt context. A task that is
    /// already the latest selection is not re-posted. Returns whether a
    /// decision was posted.
    ///
    /// This only records the decision; the privilege transition happens
    /// later, in the mainline loop.
    pub fn request_switch(&self, task: TaskId, now: u32) -> bool {
        let prev = self.selected.load(Ordering::Relaxed);
        if task == prev {
            return false;
        }
        log_info!(
            "sched",
            "context switch at t={}: {} -> {}",
            now,
            TaskLabel(prev),
            TaskLabel(task)
        );
        self.selected.store(task, Ordering::Relaxed);
        self.pending.store(task, Ordering::Release);
        true
    }

    /// Consumes the posted decision, if any. Single consumer.
    pub fn take_request(&self) -> Option<TaskId> {
        match self.pending.swap(NO_TASK, Ordering::Acquire) {
            NO_TASK => None,
            id => Some(id),
        }
    }

    /// Timer-driven mode: consumes one posted decision, stamps the
    /// task's start time, and enters it through the privilege
    /// transition. The context captured at the task's end-of-task trap
    /// is stored in its descriptor slot. Returns the id that ran, or
    /// `None` if the handoff was empty.
    pub fn step<T: PrivilegeTransition>(&self, transition: &T, now: u32) -> Option<TaskId> {
        let id = self.take_request()?;
        let entry = {
            let mut tasks = self.tasks.lock();
            let task = tasks.get_mut(id)?.as_mut()?;
            task.last_run = now;
            task.entry
        };
        let context = transition.enter_unprivileged(entry);
        let mut tasks = self.tasks.lock();
        if let Some(task) = tasks.get_mut(id).and_then(|slot| slot.as_mut()) {
            task.context = context;
        }
        Some(id)
    }

    /// Timer-driven scheduler loop. Never returns.
    pub fn run<T: PrivilegeTransition>(&self, transition: &T, time: &SysTime) -> ! {
        loop {
            if self.step(transition, time.now()).is_none() {
                crate::arch::wait_for_interrupt();
            }
        }
    }
}
