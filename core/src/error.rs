use thiserror::Error;

/// Error type surfaced by renderer and audio backends
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Problems detected while building a machine, before anything executes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("a ROM must be provided")]
    MissingRom,
    #[error("ROM is empty")]
    EmptyRom,
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },
    #[error("font sprite must be 80 bytes, got {len}")]
    InvalidFont { len: usize },
}

/// Unrecoverable faults raised by a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("invalid instruction 0x{opcode:04x} at 0x{pc:04x}")]
    UnknownOpcode { opcode: u16, pc: u16 },
    #[error("stack overflow: call at 0x{pc:04x} with 16 frames in use")]
    StackOverflow { pc: u16 },
    #[error("stack underflow: return at 0x{pc:04x} with an empty call stack")]
    StackUnderflow { pc: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cycle rate must be at least 1 Hz")]
    ZeroCycleRate,
    #[error("timer rate must be at least 1 Hz")]
    ZeroTimerRate,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("renderer failed: {0}")]
    Render(#[source] BackendError),
    #[error("failed to start timer thread")]
    TimerThread(#[source] std::io::Error),
}
