use crate::error::{Result, VmError};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Monochrome frame buffer, one bit per pixel, stored row-major.
///
/// Coordinates wrap around both edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    height: usize,
    width: usize,
    pixels: Vec<bool>,
    /// Set by any change since the host last took a frame.
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(SCREEN_HEIGHT, SCREEN_WIDTH)
    }
}

impl Screen {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            pixels: vec![false; height * width],
            dirty: true,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn index(&self, y: usize, x: usize) -> usize {
        (y % self.height) * self.width + (x % self.width)
    }

    /// XOR `value` into the pixel at `(y, x)`.
    ///
    /// Returns `true` when a lit pixel was switched off (a collision).
    pub fn set_pixel(&mut self, y: usize, x: usize, value: u8) -> Result<bool> {
        let bit = match value {
            0 => false,
            1 => true,
            _ => return Err(VmError::InvalidPixel { value }),
        };
        let idx = self.index(y, x);
        let old = self.pixels[idx];
        let new = old ^ bit;
        self.pixels[idx] = new;
        if bit {
            self.dirty = true;
        }
        Ok(old && !new)
    }

    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.pixels[self.index(y, x)]
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.dirty = true;
    }

    /// Row-major pixel grid for rendering.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Report and reset the dirty flag; hosts call this once per frame.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Render the grid as text, one line per row (`#` lit, `.` dark).
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.pixels.chunks(self.width) {
            out.extend(row.iter().map(|&lit| if lit { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}
