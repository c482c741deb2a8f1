// Kernel Logging Subsystem
//
// Implements the kernel's structured logging framework, providing
// multi-level, timestamped log output for diagnostics and bring-up
// debugging.
//
// Key responsibilities:
// - Provide standardized log levels (Debug, Info, Warn, Error, Panic)
// - Attach timestamps and subsystem origin to every log entry
// - Include source location only for DEBUG entries (file:line)
// - Output through the console sink unconditionally
//
// Design principles:
// - Zero-cost filtering: log messages below the current level are dropped early
// - Early-boot friendly: works before the scheduler exists
// - Minimal formatting logic inside the hot path
//
// Implementation details:
// - Timestamps are derived from the monotonic tick counter (1 ms per tick)
// - The console sink is the ground truth; there is no secondary mirror

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::console;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Panic = 4,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
            LogLevel::Panic => "PANIC",
        }
    }
}

static CURRENT_LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Debug as u8);

pub fn init() {
    set_level(LogLevel::Debug);
}

pub fn set_level(level: LogLevel) {
    CURRENT_LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_level() -> LogLevel {
    match CURRENT_LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        2 => LogLevel::Warn,
        3 => LogLevel::Error,
        _ => LogLevel::Panic,
    }
}

fn get_timestamp_ms() -> u64 {
    // One hardware tick per millisecond.
    crate::systime::SYSTIME.now() as u64
}

fn format_timestamp(ms: u64) -> (u64, u64) {
    let seconds = ms / 1000;
    let milliseconds = ms % 1000;
    (seconds, milliseconds)
}

pub fn _log(level: LogLevel, origin: &str, args: fmt::Arguments, file: &str, line: u32) {
    if level < get_level() {
        return;
    }

    let timestamp_ms = get_timestamp_ms();
    let (seconds, milliseconds) = format_timestamp(timestamp_ms);
    let level_str = level.as_str();

    if level == LogLevel::Debug {
        console::_print(format_args!(
            "[t={}.{:03}s] [{}] [{}] {} ({}:{})\n",
            seconds, milliseconds, level_str, origin, args, file, line
        ));
    } else {
        console::_print(format_args!(
            "[t={}.{:03}s] [{}] [{}] {}\n",
            seconds, milliseconds, level_str, origin, args
        ));
    }
}

#[macro_export]
macro_rules! log_debug {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Debug,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Info,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_warn {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Warn,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Error,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[macro_export]
macro_rules! log_panic {
    ($origin:expr, $($arg:tt)*) => {
        $crate::log::_log(
            $crate::log::LogLevel::Panic,
            $origin,
            format_args!($($arg)*),
            file!(),
            line!()
        )
    };
}
