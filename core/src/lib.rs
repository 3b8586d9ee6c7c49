mod chip8;
mod decode;
mod display;
mod error;
mod rng;
mod runner;
mod schedule;
mod timer;

pub use chip8::{
    Chip8, Chip8Builder, DEFAULT_FONT, FONT_START, KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE,
    PROGRAM_START, STACK_SIZE,
};
pub use decode::Instruction;
pub use display::{DisplayBuffer, Frame, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::{BackendError, ConfigError, ExecError, LoadError, RunError};
pub use rng::{seeded, ByteSource, FixedBytes};
pub use runner::{Input, Message, RunConfig, RunState, Renderer, Runner};
pub use schedule::{period, Scheduler, ThreadScheduler};
pub use timer::{Beeper, Buzzer, Countdown, Mute, TimerThread, Timers, ZeroEdge};
