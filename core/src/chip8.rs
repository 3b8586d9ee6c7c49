// CHIP-8 virtual machine
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Cowgod's Chip-8 Technical Reference](http://devernay.free.fr/hacks/chip8/C8TECH10.HTM)
// * [Timendus' CHIP-8 test suite](https://github.com/Timendus/chip8-test-suite)
//
// Quirks: this machine implements one fixed set of semantics, there is no
// compatibility mode. 8XY1/8XY2/8XY3 reset VF, 8XY6/8XYE shift VX in place
// (VY is ignored), BNNN jumps to NNN + V0 and FX55/FX65 leave I pointing one
// past the last register transferred. 8XY4-8XYE write VF before VX, so with
// X = F the result replaces the flag.

use crate::decode::Instruction;
use crate::display::DisplayBuffer;
use crate::error::{ExecError, LoadError};
use crate::rng::{self, ByteSource};
use crate::timer::{Beeper, Mute, Timers};

pub const MEMORY_SIZE: usize = 0x1000;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Font glyphs live at the bottom of memory, 5 bytes each
pub const FONT_START: u16 = 0x000;
const FONT_GLYPH_SIZE: u16 = 5;

/// Every memory access through I or PC wraps inside 4 KiB
const ADDR_MASK: u16 = 0x0FFF;

pub static DEFAULT_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Default)]
pub struct Chip8Builder {
    /// ROM
    rom: Option<Vec<u8>>,
    /// Font sprite
    font: Option<Vec<u8>>,
    /// PRNG Seed
    rng_seed: Option<u64>,
    /// Replaces the seeded PRNG entirely
    byte_source: Option<Box<dyn ByteSource>>,
    /// Driven by the sound timer
    beeper: Option<Box<dyn Beeper>>,
    /// Debug mode: log every executed instruction
    debug: bool,
}

pub struct Chip8 {
    /// General purpose registers
    regs: [u8; 16],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack
    stack: [u16; STACK_SIZE],
    /// Stack pointer
    sp: u8,
    /// Memory
    memory: Vec<u8>,
    /// Display: 64x32 pixels 1 bit monochrome
    display: DisplayBuffer,
    /// Hex keypad state
    keys: [bool; KEY_COUNT],
    /// Delay and sound timers, shared with the timer thread
    timers: Timers,
    /// PRNG
    rng: Box<dyn ByteSource>,
    /// Debug mode
    debug: bool,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder::default()
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = Some(rom);
        self
    }

    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_byte_source(mut self, source: Box<dyn ByteSource>) -> Self {
        self.byte_source = Some(source);
        self
    }

    pub fn with_beeper(mut self, beeper: Box<dyn Beeper>) -> Self {
        self.beeper = Some(beeper);
        self
    }

    pub fn build(self) -> Result<Chip8, LoadError> {
        let rom = self.rom.ok_or(LoadError::MissingRom)?;
        if rom.is_empty() {
            return Err(LoadError::EmptyRom);
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let font = match &self.font {
            Some(font) if font.len() != DEFAULT_FONT.len() => {
                return Err(LoadError::InvalidFont { len: font.len() })
            }
            Some(font) => &font[..],
            None => &DEFAULT_FONT[..],
        };

        // Create memory
        let mut memory = vec![0u8; MEMORY_SIZE];

        // Copy font to memory
        let font_start = FONT_START as usize;
        memory[font_start..font_start + font.len()].copy_from_slice(font);

        // Copy rom to memory
        let start = PROGRAM_START as usize;
        memory[start..start + rom.len()].copy_from_slice(&rom);
        log::info!("Loaded ROM ({} bytes)", rom.len());

        // Pseudo random number generator
        let rng: Box<dyn ByteSource> = match self.byte_source {
            Some(source) => source,
            None => Box::new(rng::seeded(self.rng_seed)),
        };

        let beeper: Box<dyn Beeper> = match self.beeper {
            Some(beeper) => beeper,
            None => Box::new(Mute),
        };

        Ok(Chip8 {
            regs: [0u8; 16],
            index: 0,
            pc: PROGRAM_START,
            stack: [0u16; STACK_SIZE],
            sp: 0,
            memory,
            display: DisplayBuffer::new(),
            keys: [false; KEY_COUNT],
            timers: Timers::new(beeper),
            rng,
            debug: self.debug,
        })
    }
}

impl Chip8 {
    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayBuffer {
        &mut self.display
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs[(reg & 0xF) as usize]
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.regs
    }

    /// Return addresses currently on the call stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT]) {
        self.keys = *keys;
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// On error nothing has been modified; the machine cannot continue.
    pub fn step(&mut self) -> Result<(), ExecError> {
        let opcode = self.fetch();
        let inst = Instruction::decode(opcode).ok_or(ExecError::UnknownOpcode {
            opcode,
            pc: self.pc,
        })?;

        if self.debug {
            log::debug!(
                "pc=0x{:04x} inst=0x{:04x} {:<16} i=0x{:04x} sp=0x{:02x} dt=0x{:02x} st=0x{:02x}",
                self.pc,
                opcode,
                inst.to_string(),
                self.index,
                self.sp,
                self.timers.delay(),
                self.timers.sound(),
            );
        }

        self.execute(inst)
    }

    fn execute(&mut self, inst: Instruction) -> Result<(), ExecError> {
        use Instruction::*;
        match inst {
            Clear => {
                self.display.clear();
                self.next();
            }
            Return => {
                // Pop call site from stack, continue after it
                if self.sp == 0 {
                    return Err(ExecError::StackUnderflow { pc: self.pc });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
                self.next();
            }
            Jump(addr) => {
                self.pc = addr;
            }
            Call(addr) => {
                // Push program counter to stack
                if self.sp as usize >= STACK_SIZE {
                    return Err(ExecError::StackOverflow { pc: self.pc });
                }
                self.stack[self.sp as usize] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            SkipEqImm(x, nn) => self.skip_if(self.regs[x as usize] == nn),
            SkipNeqImm(x, nn) => self.skip_if(self.regs[x as usize] != nn),
            SkipEqReg(x, y) => self.skip_if(self.regs[x as usize] == self.regs[y as usize]),
            SkipNeqReg(x, y) => self.skip_if(self.regs[x as usize] != self.regs[y as usize]),
            SetImm(x, nn) => {
                self.regs[x as usize] = nn;
                self.next();
            }
            AddImm(x, nn) => {
                self.regs[x as usize] = self.regs[x as usize].wrapping_add(nn);
                self.next();
            }
            SetReg(x, y) => {
                self.regs[x as usize] = self.regs[y as usize];
                self.next();
            }
            Or(x, y) => {
                self.regs[x as usize] |= self.regs[y as usize];
                self.regs[0xF] = 0;
                self.next();
            }
            And(x, y) => {
                self.regs[x as usize] &= self.regs[y as usize];
                self.regs[0xF] = 0;
                self.next();
            }
            Xor(x, y) => {
                self.regs[x as usize] ^= self.regs[y as usize];
                self.regs[0xF] = 0;
                self.next();
            }
            AddReg(x, y) => {
                let (res, carry) = self.regs[x as usize].overflowing_add(self.regs[y as usize]);
                self.regs[0xF] = carry as u8;
                self.regs[x as usize] = res;
                self.next();
            }
            SubXY(x, y) => {
                let (vx, vy) = (self.regs[x as usize], self.regs[y as usize]);
                self.regs[0xF] = (vx > vy) as u8;
                self.regs[x as usize] = vx.wrapping_sub(vy);
                self.next();
            }
            Shr(x, _) => {
                let vx = self.regs[x as usize];
                self.regs[0xF] = vx & 0x01;
                self.regs[x as usize] = vx >> 1;
                self.next();
            }
            SubYX(x, y) => {
                let (vx, vy) = (self.regs[x as usize], self.regs[y as usize]);
                self.regs[0xF] = (vy > vx) as u8;
                self.regs[x as usize] = vy.wrapping_sub(vx);
                self.next();
            }
            Shl(x, _) => {
                let vx = self.regs[x as usize];
                self.regs[0xF] = vx >> 7;
                self.regs[x as usize] = vx << 1;
                self.next();
            }
            SetIndex(addr) => {
                self.index = addr;
                self.next();
            }
            JumpOffset(addr) => {
                self.pc = addr + self.regs[0] as u16;
            }
            Random(x, nn) => {
                self.regs[x as usize] = self.rng.next_byte() & nn;
                self.next();
            }
            Draw(x, y, n) => {
                // Read N rows (8 bits each) of sprite data from memory
                let mut sprite = [0u8; 15];
                for row in 0..n as u16 {
                    sprite[row as usize] = self.read_u8(self.index.wrapping_add(row));
                }

                let collision = self.display.draw_sprite(
                    self.regs[x as usize],
                    self.regs[y as usize],
                    &sprite[..n as usize],
                );
                self.regs[0xF] = collision as u8;
                self.next();
            }
            SkipKey(x) => {
                let pressed = self.key(self.regs[x as usize]);
                self.skip_if(pressed);
            }
            SkipNotKey(x) => {
                let pressed = self.key(self.regs[x as usize]);
                self.skip_if(!pressed);
            }
            GetDelay(x) => {
                self.regs[x as usize] = self.timers.delay();
                self.next();
            }
            WaitKey(x) => {
                // Polled: without a key down the PC stays put and this runs again next cycle
                if let Some(key) = self.keys.iter().position(|pressed| *pressed) {
                    self.regs[x as usize] = key as u8;
                    self.next();
                }
            }
            SetDelay(x) => {
                self.timers.set_delay(self.regs[x as usize]);
                self.next();
            }
            SetSound(x) => {
                self.timers.set_sound(self.regs[x as usize]);
                self.next();
            }
            AddIndex(x) => {
                self.index = self.index.wrapping_add(self.regs[x as usize] as u16);
                self.regs[0xF] = (self.index > ADDR_MASK) as u8;
                self.next();
            }
            Font(x) => {
                let glyph = (self.regs[x as usize] & 0xF) as u16;
                self.index = FONT_START + FONT_GLYPH_SIZE * glyph;
                self.next();
            }
            Bcd(x) => {
                let value = self.regs[x as usize];
                self.write_u8(self.index, value / 100);
                self.write_u8(self.index.wrapping_add(1), (value / 10) % 10);
                self.write_u8(self.index.wrapping_add(2), value % 10);
                self.next();
            }
            Store(x) => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.write_u8(addr, self.regs[i as usize]);
                }
                self.index = self.index.wrapping_add(x as u16 + 1);
                self.next();
            }
            Load(x) => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.regs[i as usize] = self.read_u8(addr);
                }
                self.index = self.index.wrapping_add(x as u16 + 1);
                self.next();
            }
        }
        Ok(())
    }

    fn fetch(&self) -> u16 {
        u16::from_be_bytes([self.read_u8(self.pc), self.read_u8(self.pc.wrapping_add(1))])
    }

    fn next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    fn skip_if(&mut self, condition: bool) {
        let delta = if condition { 4 } else { 2 };
        self.pc = self.pc.wrapping_add(delta);
    }

    fn key(&self, key: u8) -> bool {
        if key as usize >= KEY_COUNT {
            log::warn!("Key 0x{:02x} out of range at 0x{:04x}, using 0x{:x}", key, self.pc, key & 0xF);
        }
        self.keys[(key & 0xF) as usize]
    }

    fn read_u8(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    fn write_u8(&mut self, addr: u16, data: u8) {
        self.memory[(addr & ADDR_MASK) as usize] = data;
    }
}
