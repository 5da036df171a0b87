//! Diagnostic channel: compile-time log-level ladder.
//!
//! Mirrors the level ladder and macro shape of `anyos_std::log`, but the
//! transport is swapped: that crate pipes formatted lines to a userspace
//! `logd` daemon over a named pipe, while this crate has no OS underneath it
//! to pipe to. The sink is instead a well-known peek address on the emulator
//! target and the active Screen's text console on real hardware.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

/// Severity ladder, lowest to highest verbosity. `Alloc` is the dedicated
/// level for allocator bookkeeping traffic (pool exhaustion, frees) so it can
/// be silenced independently of general `Debug` noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
    Alloc = 4,
}

static THRESHOLD: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Raise or lower the compile-time-selectable runtime threshold. Messages
/// above this level are dropped before formatting.
pub fn set_threshold(level: Level) {
    THRESHOLD.store(level as u8, Ordering::Relaxed);
}

fn enabled(level: Level) -> bool {
    level as u8 <= THRESHOLD.load(Ordering::Relaxed)
}

/// Address the emulator watches for diagnostic byte writes.
#[cfg(feature = "emulator_diagnostics")]
const DIAGNOSTIC_PEEK_ADDR: usize = 0xFFFF_FFFB;

/// Emit one log line. Called by the `log_*!` macros; not normally called
/// directly.
pub fn log_msg(level: Level, source: &str, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }

    struct Sink;
    impl fmt::Write for Sink {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            write_bytes(s.as_bytes());
            Ok(())
        }
    }

    let tag = match level {
        Level::Error => "ERROR",
        Level::Warning => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Alloc => "ALLOC",
    };

    write_bytes(tag.as_bytes());
    write_bytes(b"|");
    write_bytes(source.as_bytes());
    write_bytes(b"|");
    let _ = fmt::write(&mut Sink, args);
    write_bytes(b"\n");
}

/// Write raw bytes to whichever diagnostic sink this build targets.
///
/// On the emulator target, a byte-at-a-time volatile write to the peek
/// address is enough for the emulator's host-side monitor to capture the
/// stream. On real hardware there is no such address decoded, so the bytes
/// fall through to the active screen's text console (see `screen::console_write`).
fn write_bytes(bytes: &[u8]) {
    #[cfg(feature = "emulator_diagnostics")]
    {
        for &b in bytes {
            unsafe {
                core::ptr::write_volatile(DIAGNOSTIC_PEEK_ADDR as *mut u8, b);
            }
        }
        return;
    }

    #[cfg(not(feature = "emulator_diagnostics"))]
    {
        crate::screen::console_write(bytes);
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::log::log_msg($crate::log::Level::Error, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::log::log_msg($crate::log::Level::Warning, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::log::log_msg($crate::log::Level::Info, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::log::log_msg($crate::log::Level::Debug, module_path!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_alloc {
    ($($arg:tt)*) => {
        $crate::log::log_msg($crate::log::Level::Alloc, module_path!(), format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_gates_level() {
        set_threshold(Level::Warning);
        assert!(enabled(Level::Error));
        assert!(enabled(Level::Warning));
        assert!(!enabled(Level::Info));
        assert!(!enabled(Level::Debug));
        set_threshold(Level::Info);
    }
}
