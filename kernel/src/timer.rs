// Private Timer Driver
//
// Driver for the Cortex-A9 MPCore per-core private timer, the tick
// source behind the monotonic time service. The timer counts down from
// LOAD at the peripheral clock rate, raises its private interrupt on
// zero, and reloads automatically.
//
// The interrupt status register is write-1-to-clear. The timer
// reaction must clear it before returning or the level-sensitive line
// re-fires immediately after end-of-interrupt.

const TIMER_LOAD: usize = 0x0;
const TIMER_COUNTER: usize = 0x4;
const TIMER_CONTROL: usize = 0x8;
const TIMER_INTSTATUS: usize = 0xC;

const CONTROL_ENABLE: u32 = 1 << 0;
const CONTROL_AUTO_RELOAD: u32 = 1 << 1;
const CONTROL_IRQ_ENABLE: u32 = 1 << 2;

/// Offset of the private timer block from the peripheral base.
pub const TIMER_OFFSET: usize = 0x0600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The requested period is zero or does not fit the load register.
    InvalidPeriod,
}

pub struct PrivateTimer {
    base: usize,
    clock_hz: u32,
}

impl PrivateTimer {
    /// Creates a driver over the timer register block.
    ///
    /// # Safety
    ///
    /// `base` must point to a mapped private timer register block for
    /// the lifetime of the driver.
    pub const unsafe fn new(base: usize, clock_hz: u32) -> Self {
        PrivateTimer { base, clock_hz }
    }

    fn read(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Programs a periodic interrupt every `period_ms` milliseconds and
    /// starts the timer (auto-reload, interrupt enabled).
    pub fn init(&self, period_ms: u32) -> Result<(), TimerError> {
        let load = (self.clock_hz / 1000)
            .checked_mul(period_ms)
            .ok_or(TimerError::InvalidPeriod)?;
        if load == 0 {
            return Err(TimerError::InvalidPeriod);
        }

        self.write(TIMER_LOAD, load);
        self.write(
            TIMER_CONTROL,
            CONTROL_ENABLE | CONTROL_AUTO_RELOAD | CONTROL_IRQ_ENABLE,
        );
        Ok(())
    }

    /// Stops the timer.
    pub fn stop(&self) {
        self.write(TIMER_CONTROL, 0);
    }

    /// Current countdown value.
    pub fn counter(&self) -> u32 {
        self.read(TIMER_COUNTER)
    }

    /// Whether the timer has hit zero since the last clear.
    pub fn interrupt_pending(&self) -> bool {
        self.read(TIMER_INTSTATUS) & 1 != 0
    }

    /// Clears the interrupt condition. Must happen in the timer
    /// reaction, before interrupt completion.
    pub fn clear_interrupt(&self) {
        self.write(TIMER_INTSTATUS, 1);
    }
}
