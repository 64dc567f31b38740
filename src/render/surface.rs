//! Software drawing surface used by the render pipeline

use crate::assets::Pixmap;

/// RGBA color
pub type Color = [u8; 4];

/// CPU-side RGBA8 render target. All draw operations clip against the
/// surface bounds; out-of-range coordinates are never an error.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reallocate for a new size; contents are reset to transparent black
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data = vec![0; (width * height * 4) as usize];
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Copy a `w`×`h` sub-rectangle of `src` 1:1 onto the surface. Rows and
    /// columns that fall outside either image are skipped, so a source rect
    /// larger than the source image degrades to a partial copy.
    pub fn blit(&mut self, src: &Pixmap, src_x: i64, src_y: i64, dst_x: i64, dst_y: i64, w: u32, h: u32) {
        for row in 0..h as i64 {
            let sy = src_y + row;
            let dy = dst_y + row;
            if sy < 0 || dy < 0 || sy >= src.height as i64 || dy >= self.height as i64 {
                continue;
            }
            for col in 0..w as i64 {
                let sx = src_x + col;
                let dx = dst_x + col;
                if sx < 0 || dx < 0 || sx >= src.width as i64 || dx >= self.width as i64 {
                    continue;
                }
                let src_idx = ((sy as u32 * src.width + sx as u32) * 4) as usize;
                let dst_idx = ((dy as u32 * self.width + dx as u32) * 4) as usize;
                self.data[dst_idx..dst_idx + 4].copy_from_slice(&src.data[src_idx..src_idx + 4]);
            }
        }
    }

    /// Draw `src` scaled (nearest-neighbor) into a `size`×`size` square
    /// centered on (cx, cy), alpha-blended over the surface. Mirroring
    /// reverses the sample column within the sprite's own square; the
    /// destination box itself does not move.
    pub fn draw_sprite(&mut self, src: &Pixmap, cx: f32, cy: f32, size: u32, mirror: bool) {
        if size == 0 || src.width == 0 || src.height == 0 {
            return;
        }
        let x0 = (cx - size as f32 / 2.0).round() as i64;
        let y0 = (cy - size as f32 / 2.0).round() as i64;
        for dy in 0..size {
            let sy = (dy as u64 * src.height as u64 / size as u64) as u32;
            for dx in 0..size {
                let column = if mirror { size - 1 - dx } else { dx };
                let sx = (column as u64 * src.width as u64 / size as u64) as u32;
                let Some(pixel) = src.get_pixel(sx, sy) else {
                    continue;
                };
                if pixel[3] == 0 {
                    continue;
                }
                self.blend_pixel(
                    x0 + dx as i64,
                    y0 + dy as i64,
                    pixel,
                    pixel[3] as f32 / 255.0,
                );
            }
        }
    }

    /// Blend a solid color through a per-pixel coverage mask (glyph raster)
    pub fn blend_coverage(
        &mut self,
        coverage: &[f32],
        cov_w: u32,
        cov_h: u32,
        ox: i64,
        oy: i64,
        color: Color,
    ) {
        for cy in 0..cov_h {
            for cx in 0..cov_w {
                let alpha = coverage[(cy * cov_w + cx) as usize];
                if alpha <= 0.0 {
                    continue;
                }
                self.blend_pixel(ox + cx as i64, oy + cy as i64, color, alpha);
            }
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        for c in 0..3 {
            let d = self.data[idx + c] as f32;
            let s = color[c] as f32;
            self.data[idx + c] = (s * a + d * (1.0 - a)).round() as u8;
        }
        self.data[idx + 3] = 255;
    }
}
