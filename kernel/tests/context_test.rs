//! Saved-context layout tests. The field order of `TaskContext` is an
//! ABI contract with the low-level entry/exit code, so the offsets are
//! pinned here.

use std::mem;

use argon::switch::TaskContext;

#[test]
fn context_is_17_words() {
    assert_eq!(mem::size_of::<TaskContext>(), 68);
    assert_eq!(mem::align_of::<TaskContext>(), 4);
}

#[test]
fn context_field_offsets_match_the_store_order() {
    let ctx = TaskContext::new();
    let base = &ctx as *const TaskContext as usize;

    assert_eq!(&ctx.r as *const _ as usize - base, 0);
    assert_eq!(&ctx.sp as *const _ as usize - base, 13 * 4);
    assert_eq!(&ctx.lr as *const _ as usize - base, 14 * 4);
    assert_eq!(&ctx.pc as *const _ as usize - base, 15 * 4);
    assert_eq!(&ctx.cpsr as *const _ as usize - base, 16 * 4);
}

#[test]
fn new_context_is_zeroed() {
    let ctx = TaskContext::new();
    assert!(ctx.r.iter().all(|&r| r == 0));
    assert_eq!(ctx.sp, 0);
    assert_eq!(ctx.lr, 0);
    assert_eq!(ctx.pc, 0);
    assert_eq!(ctx.cpsr, 0);
}
