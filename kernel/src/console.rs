// Console Output Seam
//
// The core never talks to the UART directly: all text output funnels
// through a single pluggable sink installed at bring-up. On hardware the
// sink is the PL011 wrapper in `serial`; host tests install a capturing
// sink to assert on the transition log.
//
// Concurrency: the sink is read under `without_interrupts`, matching the
// locking discipline of the serial backend it fronts, so interrupt-context
// log lines never interleave with mainline ones.

use core::fmt;

use spin::Mutex;

use crate::util::without_interrupts;

pub type SinkFn = fn(&str);

static SINK: Mutex<Option<SinkFn>> = Mutex::new(None);

pub fn set_sink(sink: SinkFn) {
    without_interrupts(|| {
        *SINK.lock() = Some(sink);
    });
}

pub fn clear_sink() {
    without_interrupts(|| {
        *SINK.lock() = None;
    });
}

struct SinkWriter(SinkFn);

impl fmt::Write for SinkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.0)(s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;

    without_interrupts(|| {
        let sink = *SINK.lock();
        if let Some(sink) = sink {
            let _ = SinkWriter(sink).write_fmt(args);
        }
    });
}
