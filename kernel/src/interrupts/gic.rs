// Generic Interrupt Controller Driver
//
// Driver for the ARM GIC (GICv1 programming model, as found on the
// Cortex-A9 MPCore). The controller is split into two register blocks:
//
// - Distributor: global routing state. Per-line enable, pending,
//   priority, target-CPU and trigger-configuration registers.
// - CPU interface: per-core handshake. Priority mask, interrupt
//   acknowledge (IAR) and end-of-interrupt (EOIR) registers.
//
// Key responsibilities:
// - One-time controller bring-up (priority mask, interface enables)
// - Per-line enable/disable, routing, priority and trigger configuration
// - The acknowledge / end-of-interrupt protocol used by the dispatcher
//
// Implementation details:
// - The driver is constructed from raw base addresses so the same code
//   runs against hardware MMIO or an in-memory block under test.
// - Per-line state (pending -> active -> inactive) is owned by the
//   hardware; this driver only implements the protocol around it.

/// Distributor register offsets (bytes from the distributor base).
const GICD_CTLR: usize = 0x000;
const GICD_ISENABLER: usize = 0x100;
const GICD_ICENABLER: usize = 0x180;
const GICD_ISPENDR: usize = 0x200;
const GICD_IPRIORITYR: usize = 0x400;
const GICD_ITARGETSR: usize = 0x800;
const GICD_ICFGR: usize = 0xC00;

/// CPU interface register offsets (bytes from the CPU interface base).
const GICC_CTLR: usize = 0x000;
const GICC_PMR: usize = 0x004;
const GICC_IAR: usize = 0x00C;
const GICC_EOIR: usize = 0x010;

/// IAR interrupt id field mask. Bits above it carry the source CPU for
/// software-generated interrupts and are not an interrupt id.
const IAR_ID_MASK: u32 = 0x3FF;

/// Reads of IAR with nothing pending return this id. It must be
/// handled without an EOIR write.
pub const SPURIOUS_ID: u32 = 1023;

/// Line ids 1020..=1023 are reserved by the architecture.
const MAX_LINE: u32 = 1019;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GicError {
    /// Line id outside the architecturally valid range.
    InvalidLine,
    /// The controller has not been brought up yet.
    NotInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Level,
    Edge,
}

/// The interrupt controller, addressed through its two register blocks.
pub struct Gic {
    dist_base: usize,
    cpu_base: usize,
}

impl Gic {
    /// Creates a driver over the given register blocks.
    ///
    /// # Safety
    ///
    /// Both base addresses must point to mapped, writable memory laid
    /// out as GIC distributor and CPU interface blocks for the lifetime
    /// of the driver.
    pub const unsafe fn new(dist_base: usize, cpu_base: usize) -> Self {
        Gic { dist_base, cpu_base }
    }

    fn dist_read(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.dist_base + offset) as *const u32) }
    }

    fn dist_write(&self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.dist_base + offset) as *mut u32, value) }
    }

    fn cpu_read(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.cpu_base + offset) as *const u32) }
    }

    fn cpu_write(&self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.cpu_base + offset) as *mut u32, value) }
    }

    /// Brings the controller up: accept all priorities, then enable the
    /// CPU interface and the distributor. Must run once, in privileged
    /// mode, before any line is enabled.
    pub fn init(&self) {
        self.cpu_write(GICC_PMR, 0xFF);
        self.cpu_write(GICC_CTLR, 1);
        self.dist_write(GICD_CTLR, 1);
    }

    /// Enables forwarding of a line and routes it to CPU 0.
    ///
    /// The enable bit lives in set-enable register `line / 32` at bit
    /// `line % 32`; the target byte lives in target register `line / 4`
    /// at byte `line % 4`. The two register files use different
    /// granularities for the same line id.
    pub fn enable_line(&self, line: u32) -> Result<(), GicError> {
        if line > MAX_LINE {
            return Err(GicError::InvalidLine);
        }

        let reg = (line / 32) as usize;
        let bit = line % 32;
        self.dist_write(GICD_ISENABLER + reg * 4, 1 << bit);

        let treg = (line / 4) as usize;
        let shift = (line % 4) * 8;
        let mut targets = self.dist_read(GICD_ITARGETSR + treg * 4);
        targets &= !(0xFF << shift);
        targets |= 0x01 << shift;
        self.dist_write(GICD_ITARGETSR + treg * 4, targets);

        Ok(())
    }

    /// Disables forwarding of a line. The clear-enable registers are
    /// write-1-to-clear, so no read-modify-write is needed.
    pub fn disable_line(&self, line: u32) -> Result<(), GicError> {
        if line > MAX_LINE {
            return Err(GicError::InvalidLine);
        }
        let reg = (line / 32) as usize;
        let bit = line % 32;
        self.dist_write(GICD_ICENABLER + reg * 4, 1 << bit);
        Ok(())
    }

    /// Configures a line's trigger style. Two configuration bits per
    /// line; the upper bit selects edge (1) or level (0) sensitivity.
    pub fn set_trigger(&self, line: u32, trigger: Trigger) -> Result<(), GicError> {
        if line > MAX_LINE {
            return Err(GicError::InvalidLine);
        }
        let reg = (line / 16) as usize;
        let bit = (line % 16) * 2 + 1;
        let mut cfg = self.dist_read(GICD_ICFGR + reg * 4);
        match trigger {
            Trigger::Edge => cfg |= 1 << bit,
            Trigger::Level => cfg &= !(1 << bit),
        }
        self.dist_write(GICD_ICFGR + reg * 4, cfg);
        Ok(())
    }

    /// Sets a line's priority byte. Lower values are more urgent.
    pub fn set_priority(&self, line: u32, priority: u8) -> Result<(), GicError> {
        if line > MAX_LINE {
            return Err(GicError::InvalidLine);
        }
        let reg = (line / 4) as usize;
        let shift = (line % 4) * 8;
        let mut prio = self.dist_read(GICD_IPRIORITYR + reg * 4);
        prio &= !(0xFF << shift);
        prio |= (priority as u32) << shift;
        self.dist_write(GICD_IPRIORITYR + reg * 4, prio);
        Ok(())
    }

    /// Polls whether a line is pending at the distributor.
    pub fn is_pending(&self, line: u32) -> Result<bool, GicError> {
        if line > MAX_LINE {
            return Err(GicError::InvalidLine);
        }
        let reg = (line / 32) as usize;
        let bit = line % 32;
        Ok(self.dist_read(GICD_ISPENDR + reg * 4) & (1 << bit) != 0)
    }

    /// Acknowledges the highest-priority pending interrupt, moving it
    /// to the active state. Returns [`SPURIOUS_ID`] when nothing is
    /// pending; a spurious id must not be completed.
    pub fn acknowledge(&self) -> u32 {
        self.cpu_read(GICC_IAR) & IAR_ID_MASK
    }

    /// Signals completion of a previously acknowledged interrupt,
    /// returning the line to inactive. Writing an id that is not active
    /// has no effect.
    pub fn end_of_interrupt(&self, line: u32) {
        self.cpu_write(GICC_EOIR, line);
    }
}
