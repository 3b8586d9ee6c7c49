use chip8_vm_core::{Chip8, Chip8Builder, DisplayBuffer};
use proptest::prelude::*;

fn run(rom: Vec<u8>, steps: usize) -> Chip8 {
    let mut chip = Chip8Builder::new().with_rom(rom).build().unwrap();
    for _ in 0..steps {
        chip.step().unwrap();
    }
    chip
}

proptest! {
    #[test]
    fn add_reg_wraps_and_carries(a in any::<u8>(), b in any::<u8>()) {
        // 61aa 62bb 8124
        let chip = run(vec![0x61, a, 0x62, b, 0x81, 0x24], 3);

        let sum = a as u16 + b as u16;
        prop_assert_eq!(chip.register(0x1), (sum % 256) as u8);
        prop_assert_eq!(chip.register(0xF), (sum > 255) as u8);
    }

    #[test]
    fn sub_xy_borrow(a in any::<u8>(), b in any::<u8>()) {
        // 61aa 62bb 8125
        let chip = run(vec![0x61, a, 0x62, b, 0x81, 0x25], 3);

        prop_assert_eq!(chip.register(0x1), a.wrapping_sub(b));
        prop_assert_eq!(chip.register(0xF), (a > b) as u8);
    }

    #[test]
    fn sub_yx_borrow(a in any::<u8>(), b in any::<u8>()) {
        // 61aa 62bb 8127
        let chip = run(vec![0x61, a, 0x62, b, 0x81, 0x27], 3);

        prop_assert_eq!(chip.register(0x1), b.wrapping_sub(a));
        prop_assert_eq!(chip.register(0xF), (b > a) as u8);
    }

    #[test]
    fn bcd_digits(v in any::<u8>()) {
        // 6Avv A300 FA33
        let chip = run(vec![0x6A, v, 0xA3, 0x00, 0xFA, 0x33], 3);

        let digits = &chip.memory()[0x300..0x303];
        prop_assert_eq!(digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16, v as u16);
    }

    #[test]
    fn draw_twice_restores_frame(
        x in any::<u8>(),
        y in any::<u8>(),
        rows in proptest::collection::vec(any::<u8>(), 1..=15),
    ) {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(3, 4, &[0xAA, 0x55]);
        let before = *display.frame();

        display.draw_sprite(x, y, &rows);
        display.draw_sprite(x, y, &rows);

        prop_assert_eq!(display.frame(), &before);
    }

    #[test]
    fn store_then_load_round_trip(
        values in proptest::collection::vec(any::<u8>(), 16),
        x in 0u8..16,
        base in 0x300u16..0xE00,
    ) {
        // Load V0..=VF, store V0..=Vx at base, zero them, load back from base
        let mut rom = Vec::new();
        for (reg, value) in values.iter().enumerate() {
            rom.extend_from_slice(&[0x60 | reg as u8, *value]);
        }
        let set_index = [0xA0 | (base >> 8) as u8, base as u8];
        rom.extend_from_slice(&set_index);
        rom.extend_from_slice(&[0xF0 | x, 0x55]);
        for reg in 0..16u8 {
            rom.extend_from_slice(&[0x60 | reg, 0x00]);
        }
        rom.extend_from_slice(&set_index);
        rom.extend_from_slice(&[0xF0 | x, 0x65]);

        let chip = run(rom, 16 + 2 + 16 + 2);

        for reg in 0..16u8 {
            let expected = if reg <= x { values[reg as usize] } else { 0 };
            prop_assert_eq!(chip.register(reg), expected);
        }
        prop_assert_eq!(chip.index(), base + x as u16 + 1);
    }
}
