//! Drawing surfaces the rasterizer writes into
use crate::color::Color;
use crate::raster;

/// A fixed-size pixel target
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Write one pixel; coordinates outside the surface are ignored
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Draw a solid line segment between two screen-space points
    ///
    /// The default clips the segment to the surface and steps it with
    /// Bresenham.
    fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let Some((x0, y0, x1, y1)) = raster::clip_segment(x0, y0, x1, y1, w - 1.0, h - 1.0) else {
            return;
        };
        raster::draw_line(
            self,
            x0.round() as i32,
            y0.round() as i32,
            x1.round() as i32,
            y1.round() as i32,
            color,
        );
    }
}

/// In-memory RGBA8 framebuffer
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn clear(&mut self, color: Color) {
        let [r, g, b] = color.to_rgb8();
        for px in self.rgba.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    /// RGBA bytes at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.rgba[i..i + 4]);
        Some(px)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let [r, g, b] = color.to_rgb8();
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba[i..i + 4].copy_from_slice(&[r, g, b, 255]);
    }
}
