//! Error taxonomy for the windowing core.
//!
//! Every public operation returns a `Result` instead of panicking or aborting.
//! The lone exception is `System::init`: a hardware mismatch or allocation
//! failure during startup is unrecoverable, so callers are expected to log
//! and terminate the process, not retry.

use core::fmt;

/// Recoverable failure returned by a runtime (non-init) operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WmError {
    /// A coordinate, size, or radius argument was outside its legal range.
    InvalidArgument,
    /// A pool allocation returned null.
    OutOfMemory,
    /// A window/control lookup did not find a match. Most lookups instead
    /// return `Option`/a sentinel id; this variant is for the handful of
    /// operations that must distinguish "not found" from other failures.
    NotFound,
    /// `Window::add_clip_rect` was called with the clip list already full.
    ClipRectsFull,
    /// `System::add_window` was called with the window list already full.
    TooManyWindows,
    /// A blit/fill had no on-screen intersection. Callers typically
    /// downgrade this to an info log and move on rather than treat it as
    /// an error.
    NoIntersection,
}

impl fmt::Display for WmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            WmError::InvalidArgument => "invalid argument",
            WmError::OutOfMemory => "allocation failed",
            WmError::NotFound => "not found",
            WmError::ClipRectsFull => "clip rect list full",
            WmError::TooManyWindows => "window list full",
            WmError::NoIntersection => "no on-screen intersection",
        };
        f.write_str(msg)
    }
}

pub type WmResult<T> = Result<T, WmError>;

/// Failure during `System::init`. Unlike `WmError`, this is not meant to be
/// recovered from: the top-level caller logs it and aborts. The source's
/// `goto error; Sys_Destroy();` idiom becomes a single top-level fatal
/// handler here rather than scattered panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemInitError {
    /// `Platform::detect_machine` could not classify the system-info record.
    UnknownMachine,
    /// A VICKY register block did not contain the expected signature.
    HardwareMismatch,
    /// A pool allocation failed during bring-up.
    OutOfMemory,
}

impl fmt::Display for SystemInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SystemInitError::UnknownMachine => "unrecognized machine model",
            SystemInitError::HardwareMismatch => "VICKY register signature mismatch",
            SystemInitError::OutOfMemory => "allocation failed during system init",
        };
        f.write_str(msg)
    }
}
