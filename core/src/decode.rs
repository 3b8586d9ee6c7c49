use std::fmt;

/// One decoded CHIP-8 instruction.
///
/// Register operands are the raw nibbles (0x0-0xF), addresses are the low 12
/// bits of the instruction word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// 00E0: Clear screen
    Clear,
    /// 00EE: Return from subroutine
    Return,
    /// 1NNN: Jump to NNN
    Jump(u16),
    /// 2NNN: Call subroutine at NNN
    Call(u16),
    /// 3XNN: Skip next instruction if VX == NN
    SkipEqImm(u8, u8),
    /// 4XNN: Skip next instruction if VX != NN
    SkipNeqImm(u8, u8),
    /// 5XY0: Skip next instruction if VX == VY
    SkipEqReg(u8, u8),
    /// 6XNN: VX = NN
    SetImm(u8, u8),
    /// 7XNN: VX += NN, no carry
    AddImm(u8, u8),
    /// 8XY0: VX = VY
    SetReg(u8, u8),
    /// 8XY1: VX |= VY
    Or(u8, u8),
    /// 8XY2: VX &= VY
    And(u8, u8),
    /// 8XY3: VX ^= VY
    Xor(u8, u8),
    /// 8XY4: VX += VY, VF = carry
    AddReg(u8, u8),
    /// 8XY5: VX -= VY, VF = not borrow
    SubXY(u8, u8),
    /// 8XY6: VX >>= 1, VF = shifted out bit
    Shr(u8, u8),
    /// 8XY7: VX = VY - VX, VF = not borrow
    SubYX(u8, u8),
    /// 8XYE: VX <<= 1, VF = shifted out bit
    Shl(u8, u8),
    /// 9XY0: Skip next instruction if VX != VY
    SkipNeqReg(u8, u8),
    /// ANNN: I = NNN
    SetIndex(u16),
    /// BNNN: Jump to NNN + V0
    JumpOffset(u16),
    /// CXNN: VX = random & NN
    Random(u8, u8),
    /// DXYN: Draw N rows of sprite data from I at (VX, VY)
    Draw(u8, u8, u8),
    /// EX9E: Skip next instruction if key VX is pressed
    SkipKey(u8),
    /// EXA1: Skip next instruction if key VX is not pressed
    SkipNotKey(u8),
    /// FX07: VX = delay timer
    GetDelay(u8),
    /// FX0A: Wait for a key press, store it in VX
    WaitKey(u8),
    /// FX15: delay timer = VX
    SetDelay(u8),
    /// FX18: sound timer = VX
    SetSound(u8),
    /// FX1E: I += VX
    AddIndex(u8),
    /// FX29: I = address of font glyph VX
    Font(u8),
    /// FX33: Store BCD of VX at I, I+1, I+2
    Bcd(u8),
    /// FX55: Store V0..=VX at I
    Store(u8),
    /// FX65: Load V0..=VX from I
    Load(u8),
}

impl Instruction {
    /// Decode a big-endian instruction word, `None` for patterns outside the base set
    pub fn decode(inst: u16) -> Option<Instruction> {
        // Instruction split into nibbles (4 bits) 1-4
        let n1 = (inst >> 12) as u8;
        let n2 = ((inst >> 8) & 0xF) as u8;
        let n3 = ((inst >> 4) & 0xF) as u8;
        let n4 = (inst & 0xF) as u8;

        let nnn = inst & 0x0FFF;
        let nn = (inst & 0x00FF) as u8;

        use Instruction::*;
        let decoded = match (n1, n2, n3, n4) {
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, _, _, _) => Jump(nnn),
            (0x2, _, _, _) => Call(nnn),
            (0x3, x, _, _) => SkipEqImm(x, nn),
            (0x4, x, _, _) => SkipNeqImm(x, nn),
            (0x5, x, y, 0x0) => SkipEqReg(x, y),
            (0x6, x, _, _) => SetImm(x, nn),
            (0x7, x, _, _) => AddImm(x, nn),
            (0x8, x, y, 0x0) => SetReg(x, y),
            (0x8, x, y, 0x1) => Or(x, y),
            (0x8, x, y, 0x2) => And(x, y),
            (0x8, x, y, 0x3) => Xor(x, y),
            (0x8, x, y, 0x4) => AddReg(x, y),
            (0x8, x, y, 0x5) => SubXY(x, y),
            (0x8, x, y, 0x6) => Shr(x, y),
            (0x8, x, y, 0x7) => SubYX(x, y),
            (0x8, x, y, 0xE) => Shl(x, y),
            (0x9, x, y, 0x0) => SkipNeqReg(x, y),
            (0xA, _, _, _) => SetIndex(nnn),
            (0xB, _, _, _) => JumpOffset(nnn),
            (0xC, x, _, _) => Random(x, nn),
            (0xD, x, y, n) => Draw(x, y, n),
            (0xE, x, 0x9, 0xE) => SkipKey(x),
            (0xE, x, 0xA, 0x1) => SkipNotKey(x),
            (0xF, x, 0x0, 0x7) => GetDelay(x),
            (0xF, x, 0x0, 0xA) => WaitKey(x),
            (0xF, x, 0x1, 0x5) => SetDelay(x),
            (0xF, x, 0x1, 0x8) => SetSound(x),
            (0xF, x, 0x1, 0xE) => AddIndex(x),
            (0xF, x, 0x2, 0x9) => Font(x),
            (0xF, x, 0x3, 0x3) => Bcd(x),
            (0xF, x, 0x5, 0x5) => Store(x),
            (0xF, x, 0x6, 0x5) => Load(x),
            _ => return None,
        };
        Some(decoded)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Clear => write!(f, "CLEAR"),
            Return => write!(f, "RET"),
            Jump(addr) => write!(f, "JMP 0x{:03x}", addr),
            Call(addr) => write!(f, "CALL 0x{:03x}", addr),
            SkipEqImm(x, nn) => write!(f, "SKIP V{:x}==0x{:02x}", x, nn),
            SkipNeqImm(x, nn) => write!(f, "SKIP V{:x}!=0x{:02x}", x, nn),
            SkipEqReg(x, y) => write!(f, "SKIP V{:x}==V{:x}", x, y),
            SetImm(x, nn) => write!(f, "SET V{:x} 0x{:02x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:x} 0x{:02x}", x, nn),
            SetReg(x, y) => write!(f, "SET V{:x} V{:x}", x, y),
            Or(x, y) => write!(f, "OR V{:x} V{:x}", x, y),
            And(x, y) => write!(f, "AND V{:x} V{:x}", x, y),
            Xor(x, y) => write!(f, "XOR V{:x} V{:x}", x, y),
            AddReg(x, y) => write!(f, "ADD V{:x} V{:x}", x, y),
            SubXY(x, y) => write!(f, "SUB V{:x} V{:x}", x, y),
            Shr(x, _) => write!(f, "SHR V{:x}", x),
            SubYX(x, y) => write!(f, "SUBN V{:x} V{:x}", x, y),
            Shl(x, _) => write!(f, "SHL V{:x}", x),
            SkipNeqReg(x, y) => write!(f, "SKIP V{:x}!=V{:x}", x, y),
            SetIndex(addr) => write!(f, "SET I 0x{:03x}", addr),
            JumpOffset(addr) => write!(f, "JMP 0x{:03x}+V0", addr),
            Random(x, nn) => write!(f, "RNG V{:x} 0x{:02x}", x, nn),
            Draw(x, y, n) => write!(f, "DRAW V{:x} V{:x} {:x}", x, y, n),
            SkipKey(x) => write!(f, "SKIP KEY V{:x}", x),
            SkipNotKey(x) => write!(f, "SKIP !KEY V{:x}", x),
            GetDelay(x) => write!(f, "SET V{:x} DT", x),
            WaitKey(x) => write!(f, "WAIT KEY V{:x}", x),
            SetDelay(x) => write!(f, "SET DT V{:x}", x),
            SetSound(x) => write!(f, "SET ST V{:x}", x),
            AddIndex(x) => write!(f, "ADD I V{:x}", x),
            Font(x) => write!(f, "FONT V{:x}", x),
            Bcd(x) => write!(f, "BCD V{:x}", x),
            Store(x) => write!(f, "STORE V0-V{:x}", x),
            Load(x) => write!(f, "LOAD V0-V{:x}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_operands() {
        assert_eq!(Instruction::decode(0x6A05), Some(Instruction::SetImm(0xA, 0x05)));
        assert_eq!(Instruction::decode(0xA300), Some(Instruction::SetIndex(0x300)));
        assert_eq!(Instruction::decode(0xD125), Some(Instruction::Draw(0x1, 0x2, 0x5)));
        assert_eq!(Instruction::decode(0x8AB4), Some(Instruction::AddReg(0xA, 0xB)));
        assert_eq!(Instruction::decode(0xF265), Some(Instruction::Load(0x2)));
        assert_eq!(Instruction::decode(0xE19E), Some(Instruction::SkipKey(0x1)));
    }

    #[test]
    fn test_decode_rejects_unknown() {
        // 0NNN machine code routines are not supported
        assert_eq!(Instruction::decode(0x0123), None);
        assert_eq!(Instruction::decode(0x5121), None);
        assert_eq!(Instruction::decode(0x8128), None);
        assert_eq!(Instruction::decode(0x912F), None);
        assert_eq!(Instruction::decode(0xE1FF), None);
        assert_eq!(Instruction::decode(0xF1FF), None);
    }

    #[test]
    fn test_disassembly() {
        assert_eq!(Instruction::decode(0x00E0).unwrap().to_string(), "CLEAR");
        assert_eq!(Instruction::decode(0x2ABC).unwrap().to_string(), "CALL 0xabc");
        assert_eq!(Instruction::decode(0x8126).unwrap().to_string(), "SHR V1");
        assert_eq!(Instruction::decode(0xF355).unwrap().to_string(), "STORE V0-V3");
    }
}
