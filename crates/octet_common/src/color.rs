#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    /// Phosphor green used for lit pixels by default.
    pub const PHOSPHOR: Color = Color::new_rgb(0x33, 0xff, 0x66);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Write this color into an RGB24 buffer at pixel `index`.
    #[inline]
    pub fn write_rgb24(&self, buffer: &mut [u8], index: usize) {
        let offset = index * 3;
        buffer[offset] = self.r;
        buffer[offset + 1] = self.g;
        buffer[offset + 2] = self.b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_rgb24_places_channels_at_pixel_offset() {
        let mut buffer = [0u8; 6];
        Color::new_rgb(1, 2, 3).write_rgb24(&mut buffer, 1);
        assert_eq!(buffer, [0, 0, 0, 1, 2, 3]);
    }
}
