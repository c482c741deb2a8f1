// Demo Tasks
//
// Two periodic tasks exercising the scheduler end to end: each logs
// its start tick, busy-waits for 1000 ticks of simulated work, and
// logs its exit. Registered from `kmain` with periods of 5000 and
// 2000 ticks.

use crate::log_info;
use crate::systime::{elapsed, SYSTIME};

const WORK_TICKS: u32 = 1000;

fn busy_work(start: u32) {
    while elapsed(SYSTIME.now(), start) < WORK_TICKS {}
}

pub fn task_alpha() {
    let start = SYSTIME.now();
    log_info!("tasks", "entering task alpha at t={}", start);
    busy_work(start);
    log_info!("tasks", "exiting task alpha");
}

pub fn task_beta() {
    let start = SYSTIME.now();
    log_info!("tasks", "entering task beta at t={}", start);
    busy_work(start);
    log_info!("tasks", "exiting task beta");
}
