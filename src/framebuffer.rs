use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    Pixel,
};

use anyhow::Result;

/// OLED panel dimensions.
pub const FB_WIDTH: u32 = 128;
pub const FB_HEIGHT: u32 = 64;

/// Something that can show a finished frame.
pub trait Panel {
    fn present(&mut self, fb: &Framebuffer) -> Result<()>;
}

/// 1-bit framebuffer, row-major, MSB = leftmost pixel.
/// The byte layout is what `ImageRaw<BinaryColor>` expects, so the panel
/// driver can blit it in one go.
#[derive(Clone)]
pub struct Framebuffer {
    buf: Vec<u8>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::with_size(FB_WIDTH, FB_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            buf: vec![0; stride * height as usize],
            width,
            height,
        }
    }

    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear_color(&mut self, color: BinaryColor) {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.buf.fill(fill);
    }

    pub fn pixel(&self, x: i32, y: i32) -> BinaryColor {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return BinaryColor::Off;
        }
        let idx = y as usize * self.stride() + x as usize / 8;
        let mask = 0x80 >> (x as usize % 8);
        BinaryColor::from(self.buf[idx] & mask != 0)
    }

    fn set(&mut self, x: u32, y: u32, on: bool) {
        let idx = y as usize * self.stride() + x as usize / 8;
        let mask = 0x80 >> (x as usize % 8);
        if on {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
    }

    /// Lit pixels inside `area`.
    pub fn count_on(&self, area: &Rectangle) -> usize {
        let area = area.intersection(&self.bounding_box());
        area.points()
            .filter(|p| self.pixel(p.x, p.y).is_on())
            .count()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.width;
        let h = self.height;
        for Pixel(point, color) in pixels {
            let x = point.x;
            let y = point.y;
            if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
                self.set(x as u32, y as u32, color.is_on());
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let display = self.bounding_box();
        let area = area.intersection(&display);
        let on = color.is_on();
        for y in area.rows() {
            for x in area.columns() {
                self.set(x as u32, y as u32, on);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    const BYTES_PER_ROW: usize = 16;

    #[test]
    fn packs_msb_first() {
        let mut fb = Framebuffer::new();
        assert_eq!(fb.as_bytes().len(), BYTES_PER_ROW * FB_HEIGHT as usize);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(9, 1), BinaryColor::On).draw(&mut fb).unwrap();
        assert_eq!(fb.as_bytes()[0], 0x80);
        assert_eq!(fb.as_bytes()[BYTES_PER_ROW + 1], 0x40);
        assert!(fb.pixel(9, 1).is_on());
        assert!(fb.pixel(8, 1).is_off());
    }

    #[test]
    fn out_of_bounds_is_clipped() {
        let mut fb = Framebuffer::new();
        Line::new(Point::new(-10, 63), Point::new(200, 63))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_on(&fb.bounding_box()), 128);
        assert!(fb.pixel(128, 63).is_off());
    }

    #[test]
    fn fill_and_clear() {
        let mut fb = Framebuffer::new();
        fb.fill_solid(&Rectangle::new(Point::new(120, 60), Size::new(20, 20)), BinaryColor::On)
            .unwrap();
        assert_eq!(fb.count_on(&fb.bounding_box()), 8 * 4);
        fb.clear_color(BinaryColor::Off);
        assert_eq!(fb.count_on(&fb.bounding_box()), 0);
    }
}
