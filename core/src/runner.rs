// Run loop
//
// One cycle: poll input, copy the keypad into the machine, handle the control
// message, execute at most one instruction, render if the display is dirty.
// `run` repeats that at `cycle_hz` while the timers tick on their own thread.

use crate::chip8::{Chip8, KEY_COUNT};
use crate::display::Frame;
use crate::error::{BackendError, ConfigError, RunError};
use crate::schedule::{period, Scheduler, ThreadScheduler};

/// Control message produced by the input backend, at most one per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Message {
    #[default]
    None,
    ToggleSleep,
    SingleStep,
    Redraw,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    ShuttingDown,
}

/// Presents a finished frame
pub trait Renderer {
    fn render(&mut self, frame: &Frame) -> Result<(), BackendError>;
}

/// Keypad and control source
pub trait Input {
    /// Drain pending events, returning the next control message
    fn poll(&mut self) -> Message;

    /// Current state of the 16 keypad keys
    fn keys(&self) -> [bool; KEY_COUNT];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Instructions per second
    pub cycle_hz: u32,
    /// Delay/sound timer rate
    pub timer_hz: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cycle_hz: 500,
            timer_hz: 60,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_hz == 0 {
            return Err(ConfigError::ZeroCycleRate);
        }
        if self.timer_hz == 0 {
            return Err(ConfigError::ZeroTimerRate);
        }
        Ok(())
    }
}

pub struct Runner<R, I, S> {
    chip: Chip8,
    renderer: R,
    input: I,
    scheduler: S,
    config: RunConfig,
    state: RunState,
}

impl<R, I, S> Runner<R, I, S>
where
    R: Renderer,
    I: Input,
    S: Scheduler,
{
    pub fn new(
        chip: Chip8,
        renderer: R,
        input: I,
        scheduler: S,
        config: RunConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Runner {
            chip,
            renderer,
            input,
            scheduler,
            config,
            state: RunState::Running,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn chip(&self) -> &Chip8 {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Chip8 {
        &mut self.chip
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Run until shutdown or a fatal error, with the timers ticking on a
    /// background thread for the duration of the call
    pub fn run(&mut self) -> Result<(), RunError> {
        let mut timers = self
            .chip
            .timers()
            .spawn(self.config.timer_hz, ThreadScheduler)
            .map_err(RunError::TimerThread)?;

        let delta = period(self.config.cycle_hz);
        let mut next_cycle = self.scheduler.now();

        loop {
            if self.cycle()? == RunState::ShuttingDown {
                break;
            }

            // Wait until next cycle
            next_cycle += delta;
            self.scheduler.sleep_until(next_cycle);
        }

        timers.stop();
        Ok(())
    }

    /// Perform a single iteration of the run loop
    pub fn cycle(&mut self) -> Result<RunState, RunError> {
        if self.state == RunState::ShuttingDown {
            return Ok(self.state);
        }

        let message = self.input.poll();
        let keys = self.input.keys();
        self.chip.set_keys(&keys);

        match message {
            Message::Shutdown => {
                log::info!("Shutting down");
                self.state = RunState::ShuttingDown;
                return Ok(self.state);
            }
            Message::ToggleSleep => self.toggle_sleep(),
            Message::Redraw => self.chip.display_mut().mark_dirty(),
            Message::SingleStep | Message::None => {}
        }

        let execute = match self.state {
            RunState::Running => true,
            RunState::Paused => message == Message::SingleStep,
            RunState::ShuttingDown => false,
        };

        if execute {
            if let Err(err) = self.chip.step() {
                log::error!("{}", err);
                return Err(err.into());
            }
        }

        if self.chip.display_mut().take_dirty() {
            self.renderer
                .render(self.chip.display().frame())
                .map_err(RunError::Render)?;
        }

        Ok(self.state)
    }

    fn toggle_sleep(&mut self) {
        self.state = match self.state {
            RunState::Running => {
                log::info!("Paused");
                RunState::Paused
            }
            RunState::Paused => {
                log::info!("Resumed");
                RunState::Running
            }
            RunState::ShuttingDown => RunState::ShuttingDown,
        };
        self.chip
            .timers()
            .set_paused(self.state == RunState::Paused);
    }
}
