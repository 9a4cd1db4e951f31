//! Character-cell drawing surface for terminal rendering
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::{Color, Surface};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Pick the ramp character for a color; lit cells never map to blank
pub fn glyph(color: Color) -> char {
    let luminance = color.clamped().luminance();
    let index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}

/// Terminal grid that the render pipeline draws into
pub struct CellSurface {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl CellSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![None; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    pub fn lit_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (row_index, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            for cell in row {
                match cell {
                    Some(color) => {
                        let [r, g, b] = color.to_rgb8();
                        writer.queue(SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                        writer.queue(Print(glyph(*color)))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if row_index + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for CellSurface {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = Some(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_ramp() {
        assert_eq!(glyph(Color::WHITE), '@');
        assert_eq!(glyph(Color::BLACK), '.');
        assert_eq!(glyph(Color::new(2.0, 2.0, 2.0)), '@');
    }

    #[test]
    fn test_set_pixel_bounds() {
        let mut surface = CellSurface::new(4, 2);
        surface.set_pixel(3, 1, Color::RED);
        surface.set_pixel(4, 1, Color::RED);
        surface.set_pixel(-1, 0, Color::RED);
        assert_eq!(surface.cell(3, 1), Some(Color::RED));
        assert_eq!(surface.lit_cells(), 1);

        surface.clear();
        assert_eq!(surface.lit_cells(), 0);
    }

    #[test]
    fn test_draw_writes_rows() {
        let mut surface = CellSurface::new(3, 2);
        surface.stroke_line(0.0, 0.0, 2.0, 0.0, Color::WHITE);
        let mut out = Vec::new();
        surface.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('@').count(), 3);
        assert_eq!(text.matches("\r\n").count(), 1);
    }

    #[test]
    fn test_resize() {
        let mut surface = CellSurface::new(2, 2);
        surface.set_pixel(1, 1, Color::WHITE);
        surface.resize(5, 3);
        assert_eq!((surface.width(), surface.height()), (5, 3));
        assert_eq!(surface.lit_cells(), 0);
    }
}
