//! Name label rendering: CPU glyph rasterization onto the surface
//!
//! Labels are drawn outlined-then-filled so they stay legible over
//! arbitrary backgrounds.

use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};

use crate::render::surface::{Color, Surface};

const OUTLINE_COLOR: Color = [0, 0, 0, 255];
const FILL_COLOR: Color = [255, 255, 255, 255];

/// One-pixel ring around the fill pass
const OUTLINE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Font load errors
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font data: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),
}

struct RasterizedLabel {
    width: u32,
    height: u32,
    ascent: f32,
    coverage: Vec<f32>,
}

/// Rasterizes player name labels
pub struct LabelRenderer {
    font: FontArc,
    scale: PxScale,
}

impl LabelRenderer {
    /// Load the label font from a TTF/OTF file. Callers treat failure as a
    /// degraded state (labels disabled), not a fatal error.
    pub fn from_file(path: &str, px: f32) -> Result<Self, TextError> {
        let bytes = std::fs::read(path).map_err(|e| TextError::Io {
            path: path.to_string(),
            source: e,
        })?;
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self {
            font,
            scale: PxScale::from(px),
        })
    }

    /// Draw `text` centered horizontally on `cx` with its baseline at `y`:
    /// eight offset passes in the outline color, then one fill pass.
    pub fn draw(&self, surface: &mut Surface, text: &str, cx: f32, y: f32) {
        let Some(raster) = self.rasterize(text) else {
            return;
        };
        let ox = (cx - raster.width as f32 / 2.0).round() as i64;
        let oy = (y - raster.ascent).round() as i64;

        for (dx, dy) in OUTLINE_OFFSETS {
            surface.blend_coverage(
                &raster.coverage,
                raster.width,
                raster.height,
                ox + dx,
                oy + dy,
                OUTLINE_COLOR,
            );
        }
        surface.blend_coverage(
            &raster.coverage,
            raster.width,
            raster.height,
            ox,
            oy,
            FILL_COLOR,
        );
    }

    /// Lay the text out on a single baseline and accumulate glyph coverage
    /// into one buffer, with a one-pixel pad for the outline passes.
    fn rasterize(&self, text: &str) -> Option<RasterizedLabel> {
        let scaled = self.font.as_scaled(self.scale);
        let ascent = scaled.ascent();

        let advance: f32 = text
            .chars()
            .map(|ch| scaled.h_advance(self.font.glyph_id(ch)))
            .sum();
        if advance <= 0.0 {
            return None;
        }

        let width = advance.ceil() as u32 + 2;
        let height = (ascent - scaled.descent()).ceil() as u32 + 2;
        let mut coverage = vec![0.0f32; (width * height) as usize];

        let mut pen_x = 1.0f32;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            let glyph = Glyph {
                id,
                scale: self.scale,
                position: point(pen_x, 1.0 + ascent),
            };
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, c| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                        let idx = (py as u32 * width + px as u32) as usize;
                        coverage[idx] = coverage[idx].max(c);
                    }
                });
            }
            pen_x += scaled.h_advance(id);
        }

        Some(RasterizedLabel {
            width,
            height,
            ascent: 1.0 + ascent,
            coverage,
        })
    }
}
