use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use chip8_vm_core::{Input, Message, KEY_COUNT};
use sdl2::{event::Event, keyboard::Keycode, EventPump};

use crate::color::{Chip8Color, Palette};

/// Map the left side of a QWERTY keyboard onto the hex keypad
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// Q W E R  =>  4 5 6 D
/// A S D F      7 8 9 E
/// Z X C V      A 0 B F
/// ```
pub fn keypad(key: Keycode) -> Option<u8> {
    let hex = match key {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::R => 0xD,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::F => 0xE,
        Keycode::Z => 0xA,
        Keycode::X => 0x0,
        Keycode::C => 0xB,
        Keycode::V => 0xF,
        _ => return None,
    };
    Some(hex)
}

/// Keypad state and pending control messages, fed one SDL event at a time
pub struct Controls {
    keys: [bool; KEY_COUNT],
    pending: VecDeque<Message>,
    palette: Rc<Cell<Palette>>,
}

impl Controls {
    pub fn new(palette: Rc<Cell<Palette>>) -> Controls {
        Controls {
            keys: [false; KEY_COUNT],
            pending: VecDeque::new(),
            palette,
        }
    }

    pub fn keys(&self) -> [bool; KEY_COUNT] {
        self.keys
    }

    /// Next control message, shutdown first
    pub fn next_message(&mut self) -> Message {
        self.pending.pop_front().unwrap_or(Message::None)
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => self.pending.push_front(Message::Shutdown),
            Event::KeyDown {
                keycode: Some(key),
                repeat,
                ..
            } => {
                if let Some(hex) = keypad(key) {
                    self.keys[hex as usize] = true;
                    return;
                }
                // Control keys fire once per press
                if repeat {
                    return;
                }
                match key {
                    Keycode::Space => self.pending.push_back(Message::ToggleSleep),
                    Keycode::T => self.pending.push_back(Message::SingleStep),
                    Keycode::Num9 => self.recolor(|palette| palette.foreground = Chip8Color::random()),
                    Keycode::Num0 => self.recolor(|palette| palette.background = Chip8Color::random()),
                    _ => {}
                }
            }
            Event::KeyUp {
                keycode: Some(key), ..
            } => {
                if let Some(hex) = keypad(key) {
                    self.keys[hex as usize] = false;
                }
            }
            _ => {}
        }
    }

    fn recolor(&mut self, change: impl FnOnce(&mut Palette)) {
        let mut palette = self.palette.get();
        change(&mut palette);
        self.palette.set(palette);
        self.pending.push_back(Message::Redraw);
    }
}

pub struct SdlInput {
    events: EventPump,
    controls: Controls,
}

impl SdlInput {
    pub fn new(events: EventPump, palette: Rc<Cell<Palette>>) -> SdlInput {
        SdlInput {
            events,
            controls: Controls::new(palette),
        }
    }
}

impl Input for SdlInput {
    fn poll(&mut self) -> Message {
        for event in self.events.poll_iter() {
            self.controls.handle(event);
        }
        self.controls.next_message()
    }

    fn keys(&self) -> [bool; KEY_COUNT] {
        self.controls.keys()
    }
}
