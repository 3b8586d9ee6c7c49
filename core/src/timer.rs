// Delay and sound timers.
//
// Both registers count down at a fixed rate (60 Hz nominal) on their own
// thread, independent of the instruction rate. The executor reads and writes
// them through a shared `Timers` handle; all access goes through a mutex.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::schedule::{period, Scheduler};

/// Audio sink driven by the sound timer
pub trait Beeper: Send {
    fn beep_start(&mut self);
    fn beep_stop(&mut self);
}

/// Beeper that makes no sound
#[derive(Debug, Clone, Copy, Default)]
pub struct Mute;

impl Beeper for Mute {
    fn beep_start(&mut self) {}
    fn beep_stop(&mut self) {}
}

/// Side effect fired when a countdown crosses zero
pub trait ZeroEdge {
    /// 0 -> nonzero
    fn rising(&mut self);
    /// nonzero -> 0
    fn falling(&mut self);
}

impl ZeroEdge for () {
    fn rising(&mut self) {}
    fn falling(&mut self) {}
}

/// Edge hook of the sound timer, only forwards actual state changes
pub struct Buzzer {
    beeper: Box<dyn Beeper>,
    beeping: bool,
}

impl Buzzer {
    pub fn new(beeper: Box<dyn Beeper>) -> Buzzer {
        Buzzer {
            beeper,
            beeping: false,
        }
    }

    pub fn is_beeping(&self) -> bool {
        self.beeping
    }
}

impl ZeroEdge for Buzzer {
    fn rising(&mut self) {
        if !self.beeping {
            self.beeper.beep_start();
            self.beeping = true;
        }
    }

    fn falling(&mut self) {
        if self.beeping {
            self.beeper.beep_stop();
            self.beeping = false;
        }
    }
}

/// 8-bit countdown register, decremented once per tick and held at zero
pub struct Countdown<E> {
    value: u8,
    edge: E,
}

impl<E: ZeroEdge> Countdown<E> {
    pub fn new(edge: E) -> Countdown<E> {
        Countdown { value: 0, edge }
    }

    pub fn get(&self) -> u8 {
        self.value
    }

    pub fn edge(&self) -> &E {
        &self.edge
    }

    pub fn set(&mut self, value: u8) {
        let prev = std::mem::replace(&mut self.value, value);
        if prev == 0 && value > 0 {
            self.edge.rising();
        } else if prev > 0 && value == 0 {
            self.edge.falling();
        }
    }

    /// Set without firing edges
    fn store(&mut self, value: u8) {
        self.value = value;
    }

    pub fn tick(&mut self) {
        if self.value > 0 {
            self.value -= 1;
            if self.value == 0 {
                self.edge.falling();
            }
        }
    }

    /// Silence the edge side effect without touching the value
    fn suspend(&mut self) {
        self.edge.falling();
    }

    /// Re-fire the rising edge if the countdown is still running
    fn resume(&mut self) {
        if self.value > 0 {
            self.edge.rising();
        }
    }
}

struct Shared {
    delay: Mutex<Countdown<()>>,
    sound: Mutex<Countdown<Buzzer>>,
    paused: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to the delay and sound timers
#[derive(Clone)]
pub struct Timers {
    shared: Arc<Shared>,
}

impl Timers {
    pub fn new(beeper: Box<dyn Beeper>) -> Timers {
        Timers {
            shared: Arc::new(Shared {
                delay: Mutex::new(Countdown::new(())),
                sound: Mutex::new(Countdown::new(Buzzer::new(beeper))),
                paused: AtomicBool::new(false),
            }),
        }
    }

    pub fn delay(&self) -> u8 {
        lock(&self.shared.delay).get()
    }

    pub fn set_delay(&self, value: u8) {
        lock(&self.shared.delay).set(value);
    }

    pub fn sound(&self) -> u8 {
        lock(&self.shared.sound).get()
    }

    /// Starts the beep on 0 -> nonzero, stops it on nonzero -> 0. While paused the
    /// value is stored silently and the beep picks up on resume.
    pub fn set_sound(&self, value: u8) {
        let mut sound = lock(&self.shared.sound);
        if self.is_paused() {
            sound.store(value);
        } else {
            sound.set(value);
        }
    }

    pub fn is_beeping(&self) -> bool {
        lock(&self.shared.sound).edge().is_beeping()
    }

    /// Decrement both timers once, unless paused
    pub fn tick(&self) {
        let mut sound = lock(&self.shared.sound);
        if self.is_paused() {
            return;
        }
        lock(&self.shared.delay).tick();
        sound.tick();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Freeze both timers and silence the beep, or resume them
    pub fn set_paused(&self, paused: bool) {
        let mut sound = lock(&self.shared.sound);
        if self.shared.paused.swap(paused, Ordering::AcqRel) == paused {
            return;
        }
        if paused {
            sound.suspend();
        } else {
            sound.resume();
        }
    }

    /// Stop any active beep, leaving the timer values alone
    pub fn silence(&self) {
        lock(&self.shared.sound).suspend();
    }

    /// Start ticking at `rate_hz` on a dedicated thread
    pub fn spawn<S>(&self, rate_hz: u32, mut scheduler: S) -> io::Result<TimerThread>
    where
        S: Scheduler + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let timers = self.clone();
        let stop_flag = stop.clone();
        let delta = period(rate_hz);

        let handle = thread::Builder::new()
            .name("chip8-timers".into())
            .spawn(move || {
                let mut next_tick = scheduler.now() + delta;
                while !stop_flag.load(Ordering::Acquire) {
                    scheduler.sleep_until(next_tick);
                    next_tick += delta;
                    if stop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    timers.tick();
                }
            })?;

        log::info!("Timer thread started at {} Hz", rate_hz);
        Ok(TimerThread {
            stop,
            handle: Some(handle),
            timers: self.clone(),
        })
    }
}

/// Running timer thread, stopped and joined on `stop` or drop
pub struct TimerThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    timers: Timers,
}

impl TimerThread {
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            log::error!("Timer thread panicked");
        }
        self.timers.silence();
        log::info!("Timer thread stopped");
    }
}

impl Drop for TimerThread {
    fn drop(&mut self) {
        self.stop();
    }
}
