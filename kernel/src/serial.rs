// PL011 Serial Output
//
// Minimal transmit-only wrapper around the first PL011 UART on the
// vexpress-a9 board. The full UART driver (configuration, reception,
// line discipline) lives outside this crate; the kernel only needs a
// byte sink for the console, so this module stays deliberately small
// and leaves the boot firmware's line configuration untouched.

const UART0_BASE: usize = 0x1000_9000;

const UART_DR: usize = 0x00;
const UART_FR: usize = 0x18;

/// Flag register: transmit FIFO full.
const FR_TXFF: u32 = 1 << 5;

fn read(offset: usize) -> u32 {
    unsafe { core::ptr::read_volatile((UART0_BASE + offset) as *const u32) }
}

fn write(offset: usize, value: u32) {
    unsafe { core::ptr::write_volatile((UART0_BASE + offset) as *mut u32, value) }
}

fn write_byte(byte: u8) {
    while read(UART_FR) & FR_TXFF != 0 {}
    write(UART_DR, byte as u32);
}

fn write_str(s: &str) {
    for byte in s.bytes() {
        if byte == b'\n' {
            write_byte(b'\r');
        }
        write_byte(byte);
    }
}

pub fn init() {
    // Nothing to program; QEMU's PL011 transmits with reset defaults.
}

/// Console sink writing to UART0.
pub fn sink(s: &str) {
    write_str(s);
}
