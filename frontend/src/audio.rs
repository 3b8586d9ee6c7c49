use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chip8_vm_core::Beeper;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::AudioSubsystem;

const BEEP_PITCH: f32 = 440.0;
const VOLUME: f32 = 0.1;

/// Square wave, silent unless the gate is open
struct SquareWave {
    phase_inc: f32,
    phase: f32,
    gate: Arc<AtomicBool>,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        let on = self.gate.load(Ordering::Relaxed);
        for sample in out.iter_mut() {
            *sample = match (on, self.phase <= 0.5) {
                (false, _) => 0.0,
                (true, true) => VOLUME,
                (true, false) => -VOLUME,
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// Open SDL playback device. Must stay alive, and on the main thread, while
/// the machine runs.
pub struct SdlAudio {
    _device: AudioDevice<SquareWave>,
    gate: Arc<AtomicBool>,
}

impl SdlAudio {
    pub fn new(audio: &AudioSubsystem) -> anyhow::Result<SdlAudio> {
        let gate = Arc::new(AtomicBool::new(false));
        let desired = AudioSpecDesired {
            freq: Some(44_100),
            channels: Some(1),
            samples: None,
        };

        let wave_gate = gate.clone();
        let device = audio
            .open_playback(None, &desired, |spec| SquareWave {
                phase_inc: BEEP_PITCH / spec.freq as f32,
                phase: 0.0,
                gate: wave_gate,
            })
            .map_err(anyhow::Error::msg)?;
        device.resume();

        Ok(SdlAudio {
            _device: device,
            gate,
        })
    }

    /// Handle for the sound timer, safe to move to the timer thread
    pub fn beeper(&self) -> SdlBeeper {
        SdlBeeper(self.gate.clone())
    }
}

pub struct SdlBeeper(Arc<AtomicBool>);

impl Beeper for SdlBeeper {
    fn beep_start(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn beep_stop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
