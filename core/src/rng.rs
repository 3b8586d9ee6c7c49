use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Source of uniformly distributed bytes for CXNN
pub trait ByteSource: Send {
    fn next_byte(&mut self) -> u8;
}

impl ByteSource for StdRng {
    fn next_byte(&mut self) -> u8 {
        self.next_u32() as u8
    }
}

/// Seeded once at machine construction; an explicit seed gives a reproducible stream
pub fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Replays a fixed byte sequence, cycling when it runs out. An empty
/// sequence yields zeros.
#[derive(Debug, Clone)]
pub struct FixedBytes {
    bytes: Vec<u8>,
    next: usize,
}

impl FixedBytes {
    pub fn new(bytes: Vec<u8>) -> FixedBytes {
        FixedBytes { bytes, next: 0 }
    }
}

impl ByteSource for FixedBytes {
    fn next_byte(&mut self) -> u8 {
        let Some(byte) = self.bytes.get(self.next).copied() else {
            return 0;
        };
        self.next = (self.next + 1) % self.bytes.len();
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded(Some(42));
        let mut b = seeded(Some(42));
        for _ in 0..64 {
            assert_eq!(a.next_byte(), b.next_byte());
        }
    }

    #[test]
    fn test_fixed_bytes_cycle() {
        let mut src = FixedBytes::new(vec![0x12, 0x34]);
        assert_eq!(src.next_byte(), 0x12);
        assert_eq!(src.next_byte(), 0x34);
        assert_eq!(src.next_byte(), 0x12);
    }
}
