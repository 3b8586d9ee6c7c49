pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// 64x32 monochrome frame, indexed `[row][column]`
pub type Frame = [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// Pixel state written by CHIP-8 draw instructions, independent of any
/// actual rendering. The dirty flag tells the run loop a redraw is pending.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pixels: Frame,
    dirty: bool,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        DisplayBuffer::new()
    }
}

impl DisplayBuffer {
    pub fn new() -> DisplayBuffer {
        DisplayBuffer {
            pixels: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
            dirty: false,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y][x]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a redraw was pending and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn clear(&mut self) {
        self.pixels
            .iter_mut()
            .for_each(|row| row.iter_mut().for_each(|p| *p = false));
        self.dirty = true;
    }

    /// XOR an 8 pixel wide sprite onto the frame with its top-left corner at (x, y).
    ///
    /// The origin wraps around the screen, but rows and columns that run off the
    /// right or bottom edge are clipped. Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        // Origin where we start to draw
        let ox = x as usize % SCREEN_WIDTH;
        let oy = y as usize % SCREEN_HEIGHT;

        let mut collision = false;
        for (row, data) in rows.iter().enumerate() {
            let y = oy + row;
            if y >= SCREEN_HEIGHT {
                break;
            }

            for column in 0..8 {
                let x = ox + column;
                if x >= SCREEN_WIDTH {
                    break;
                }

                if data & (0x80 >> column) == 0 {
                    continue;
                }

                let pixel = &mut self.pixels[y][x];
                if *pixel {
                    collision = true;
                }
                *pixel = !*pixel;
            }
        }

        self.dirty = true;
        collision
    }

    /// Number of lit pixels
    #[cfg(test)]
    pub(crate) fn lit(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|p| **p).count())
            .sum()
    }
}

impl std::fmt::Debug for DisplayBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|p| if *p { '█' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        write!(f, "dirty: {}", self.dirty)
    }
}
