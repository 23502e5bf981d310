use std::collections::HashMap;
use std::str::Chars;

use glam::Vec2;
use thiserror::Error;

use crate::coords::Rect;
use crate::device::GpuBackend;
use crate::frame::GraphicsDevice;
use crate::texture::Texture;

use super::atlas;

/// Character ranges rasterized by [`SpriteFont::from_ttf`]: printable ASCII and
/// Latin-1 letters.
const TTF_RANGES: [(u32, u32); 2] = [(32, 126), (192, 255)];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to parse font: {0}")]
    Parse(&'static str),
    #[error("font has no horizontal line metrics")]
    NoLineMetrics,
    #[error("glyphs do not fit in a {0}x{0} atlas")]
    AtlasFull(u32),
    #[error(transparent)]
    Atlas(#[from] anyhow::Error),
}

/// Placement of one character in a font atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Atlas region in pixels. Empty for whitespace.
    pub source: Rect,
    /// Offset of the region's top-left corner from the pen position, in
    /// pixels, with the pen at the top of the line.
    pub offset: Vec2,
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
}

/// A glyph positioned by [`SpriteFont::layout`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub glyph: Glyph,
    /// `pen + glyph.offset`, unscaled, relative to the text origin.
    pub offset: Vec2,
}

/// Bitmap font: an atlas texture plus per-character metrics.
#[derive(Debug)]
pub struct SpriteFont {
    atlas: Texture,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
    line_height: f32,
}

impl SpriteFont {
    pub fn new(
        atlas: Texture,
        glyphs: HashMap<char, Glyph>,
        line_height: f32,
        kerning: HashMap<(char, char), f32>,
    ) -> Self {
        Self {
            atlas,
            glyphs,
            kerning,
            line_height,
        }
    }

    /// Rasterizes a TrueType/OpenType font at `px` pixels into a new atlas.
    ///
    /// Covers ASCII 32–126 and Latin-1 192–255. Glyph coverage is stored as
    /// alpha over white, so the sprite color tints the text.
    pub fn from_ttf<B: GpuBackend>(
        gfx: &mut GraphicsDevice<B>,
        ttf: &[u8],
        px: f32,
    ) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(
            ttf,
            fontdue::FontSettings {
                scale: px,
                ..fontdue::FontSettings::default()
            },
        )
        .map_err(FontError::Parse)?;

        let line = font
            .horizontal_line_metrics(px)
            .ok_or(FontError::NoLineMetrics)?;
        let line_height = line.ascent - line.descent + line.line_gap;

        struct Raster {
            ch: char,
            metrics: fontdue::Metrics,
            coverage: Vec<u8>,
        }

        let mut rasters = Vec::new();
        let mut whitespace = Vec::new();
        let mut padded_area = 0u64;

        for ch in TTF_RANGES
            .iter()
            .flat_map(|&(lo, hi)| lo..=hi)
            .filter_map(char::from_u32)
        {
            if font.lookup_glyph_index(ch) == 0 && ch != ' ' {
                continue;
            }
            let (metrics, coverage) = font.rasterize(ch, px);
            if metrics.width == 0 || metrics.height == 0 {
                whitespace.push((ch, metrics.advance_width));
                continue;
            }
            padded_area += ((metrics.width + 2) * (metrics.height + 2)) as u64;
            rasters.push(Raster {
                ch,
                metrics,
                coverage,
            });
        }

        let side = atlas::atlas_side(padded_area);
        let sizes: Vec<(u32, u32)> = rasters
            .iter()
            .map(|r| (r.metrics.width as u32, r.metrics.height as u32))
            .collect();
        let placed = atlas::pack_rows(&sizes, side).ok_or(FontError::AtlasFull(side))?;

        let mut rgba = vec![0u8; side as usize * side as usize * 4];
        let mut glyphs = HashMap::with_capacity(rasters.len() + whitespace.len());

        for (r, &(x, y)) in rasters.iter().zip(&placed) {
            let w = r.metrics.width;
            for (row, line_px) in r.coverage.chunks_exact(w).enumerate() {
                let start = ((y as usize + row) * side as usize + x as usize) * 4;
                for (col, alpha) in line_px.iter().enumerate() {
                    rgba[start + col * 4..start + col * 4 + 4].copy_from_slice(&[255, 255, 255, *alpha]);
                }
            }

            // fontdue's ymin is the bitmap bottom relative to the baseline, +Y up.
            let top = line.ascent - (r.metrics.ymin as f32 + r.metrics.height as f32);
            glyphs.insert(
                r.ch,
                Glyph {
                    source: Rect::new(x as i32, y as i32, w as i32, r.metrics.height as i32),
                    offset: Vec2::new(r.metrics.xmin as f32, top),
                    advance: r.metrics.advance_width,
                },
            );
        }

        for (ch, advance) in whitespace {
            glyphs.insert(
                ch,
                Glyph {
                    source: Rect::EMPTY,
                    offset: Vec2::ZERO,
                    advance,
                },
            );
        }

        let mut kerning = HashMap::new();
        for &left in glyphs.keys() {
            for &right in glyphs.keys() {
                if let Some(k) = font.horizontal_kern(left, right, px).filter(|k| *k != 0.0) {
                    kerning.insert((left, right), k);
                }
            }
        }

        log::debug!(
            "rasterized {} glyphs at {px}px into a {side}x{side} atlas ({} kerning pairs)",
            glyphs.len(),
            kerning.len()
        );

        let atlas = Texture::from_rgba(gfx, side, side, &rgba)?;
        Ok(Self::new(atlas, glyphs, line_height, kerning))
    }

    pub fn atlas(&self) -> &Texture {
        &self.atlas
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyphs(&self) -> &HashMap<char, Glyph> {
        &self.glyphs
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Extra horizontal spacing between two adjacent characters.
    pub fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    /// Positions every mapped character of `text`.
    ///
    /// `\n` returns the pen to x = 0 one line lower, `\r` is ignored, and
    /// characters without a glyph are skipped. Both line breaks and skipped
    /// carriage returns reset the kerning pair.
    pub fn layout<'a>(&'a self, text: &'a str) -> GlyphLayout<'a> {
        GlyphLayout {
            font: self,
            chars: text.chars(),
            pen: Vec2::ZERO,
            prev: None,
        }
    }

    /// Size of the text block: widest line by `lines * line_height`.
    pub fn measure_string(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }

        let mut max_width = 0.0f32;
        let mut x = 0.0f32;
        let mut lines = 1u32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    max_width = max_width.max(x);
                    x = 0.0;
                    lines += 1;
                    prev = None;
                }
                '\r' => prev = None,
                _ => {
                    let Some(glyph) = self.glyphs.get(&ch) else {
                        continue;
                    };
                    if let Some(p) = prev {
                        x += self.kerning(p, ch);
                    }
                    x += glyph.advance;
                    prev = Some(ch);
                }
            }
        }

        Vec2::new(max_width.max(x), lines as f32 * self.line_height)
    }
}

/// Iterator returned by [`SpriteFont::layout`].
pub struct GlyphLayout<'a> {
    font: &'a SpriteFont,
    chars: Chars<'a>,
    pen: Vec2,
    prev: Option<char>,
}

impl Iterator for GlyphLayout<'_> {
    type Item = PlacedGlyph;

    fn next(&mut self) -> Option<PlacedGlyph> {
        loop {
            let ch = self.chars.next()?;
            match ch {
                '\n' => {
                    self.pen = Vec2::new(0.0, self.pen.y + self.font.line_height);
                    self.prev = None;
                }
                '\r' => self.prev = None,
                _ => {
                    let Some(glyph) = self.font.glyphs.get(&ch).copied() else {
                        continue;
                    };
                    if let Some(p) = self.prev {
                        self.pen.x += self.font.kerning(p, ch);
                    }
                    let offset = self.pen + glyph.offset;
                    self.pen.x += glyph.advance;
                    self.prev = Some(ch);
                    return Some(PlacedGlyph { ch, glyph, offset });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessBackend;
    use crate::paint::Color;

    fn font(gfx: &mut GraphicsDevice<HeadlessBackend>) -> SpriteFont {
        let atlas = Texture::solid(gfx, 64, 64, Color::WHITE).unwrap();
        let glyph = |x: i32, advance: f32| Glyph {
            source: Rect::new(x, 0, 8, 10),
            offset: Vec2::new(1.0, 2.0),
            advance,
        };
        let glyphs = HashMap::from([
            ('A', glyph(0, 8.0)),
            ('V', glyph(8, 9.0)),
            (
                ' ',
                Glyph {
                    source: Rect::EMPTY,
                    offset: Vec2::ZERO,
                    advance: 4.0,
                },
            ),
        ]);
        let kerning = HashMap::from([(('A', 'V'), -2.0)]);
        SpriteFont::new(atlas, glyphs, 12.0, kerning)
    }

    // ── measure_string ────────────────────────────────────────────────────

    #[test]
    fn measure_empty_is_zero() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(8, 8));
        assert_eq!(font(&mut gfx).measure_string(""), Vec2::ZERO);
    }

    #[test]
    fn measure_applies_kerning_and_lines() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(8, 8));
        let f = font(&mut gfx);
        assert_eq!(f.measure_string("AV"), Vec2::new(15.0, 12.0));
        assert_eq!(f.measure_string("A\nAV A"), Vec2::new(27.0, 24.0));
    }

    #[test]
    fn measure_skips_unmapped_and_carriage_return() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(8, 8));
        let f = font(&mut gfx);
        // '\r' and '?' break nothing but the carriage return resets kerning.
        assert_eq!(f.measure_string("A?V"), Vec2::new(15.0, 12.0));
        assert_eq!(f.measure_string("A\rV"), Vec2::new(17.0, 12.0));
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn layout_places_glyphs_with_offsets() {
        let mut gfx = GraphicsDevice::new(HeadlessBackend::new(8, 8));
        let f = font(&mut gfx);
        let placed: Vec<_> = f.layout("AV\nA").map(|p| (p.ch, p.offset)).collect();
        assert_eq!(
            placed,
            vec![
                ('A', Vec2::new(1.0, 2.0)),
                ('V', Vec2::new(7.0, 2.0)),
                ('A', Vec2::new(1.0, 14.0)),
            ]
        );
    }
}
