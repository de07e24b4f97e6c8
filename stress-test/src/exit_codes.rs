#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Invalid flags or values; no request was sent.
    InvalidInput = 30,

    /// Internal/runtime error (runtime setup failed, a task panicked).
    RuntimeError = 40,

    /// Stopped by Ctrl-C before the request budget was used up.
    Interrupted = 130,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
