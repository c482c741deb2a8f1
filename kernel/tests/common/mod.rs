//! Shared helpers for the host-side integration tests.
//!
//! Hardware drivers in the kernel are constructed from raw base
//! addresses, so the tests hand them in-memory register blocks and
//! assert on the exact words the drivers read and write.

/// A fake MMIO register block backed by plain memory.
pub struct MockBlock {
    #[allow(dead_code)]
    mem: Vec<u32>,
    base: usize,
}

// Not every test binary touches every helper.
#[allow(dead_code)]
impl MockBlock {
    /// Allocates a zeroed block of `words` 32-bit registers.
    pub fn new(words: usize) -> Self {
        let mut mem = vec![0u32; words];
        let base = mem.as_mut_ptr() as usize;
        MockBlock { mem, base }
    }

    /// Base address to hand to a driver constructor.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Reads the register at a byte offset.
    pub fn read(&self, offset: usize) -> u32 {
        assert_eq!(offset % 4, 0);
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    /// Writes the register at a byte offset.
    pub fn write(&self, offset: usize, value: u32) {
        assert_eq!(offset % 4, 0);
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Snapshot of the whole block, for unchanged-state assertions.
    pub fn snapshot(&self) -> Vec<u32> {
        (0..self.mem.len()).map(|i| self.read(i * 4)).collect()
    }
}
