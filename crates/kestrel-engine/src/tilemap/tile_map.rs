use std::ops::RangeInclusive;

use glam::Vec2;

use crate::batch::SpriteBatch;
use crate::camera::Camera2D;
use crate::coords::Rect;
use crate::device::GpuBackend;
use crate::frame::GraphicsDevice;
use crate::paint::Color;
use crate::texture::SpriteTexture;

use super::tile_layer::{TileLayer, TileMapError};

/// Stack of [`TileLayer`]s sharing one tileset sliced into equal cells.
#[derive(Debug)]
pub struct TileMap<T> {
    tileset: T,
    tile_width: i32,
    tile_height: i32,
    columns: i32,
    /// Drawn first to last.
    pub layers: Vec<TileLayer>,
}

impl<T: SpriteTexture> TileMap<T> {
    /// Fails when a tile dimension is not positive or a tile is wider than
    /// the tileset.
    pub fn new(
        tileset: T,
        tile_width: i32,
        tile_height: i32,
        layers: Vec<TileLayer>,
    ) -> Result<Self, TileMapError> {
        let tileset_width = tileset.width();
        let columns = if tile_width > 0 && tile_height > 0 {
            i32::try_from(tileset_width).unwrap_or(i32::MAX) / tile_width
        } else {
            0
        };
        if columns == 0 {
            return Err(TileMapError::TileSize {
                width: tile_width,
                height: tile_height,
                tileset_width,
            });
        }

        Ok(Self {
            tileset,
            tile_width,
            tile_height,
            columns,
            layers,
        })
    }

    pub fn tileset(&self) -> &T {
        &self.tileset
    }

    pub fn tile_size(&self) -> (i32, i32) {
        (self.tile_width, self.tile_height)
    }

    /// Tileset region for a tile id; `None` for the empty id `0`.
    pub fn source_rect(&self, id: u32) -> Option<Rect> {
        let idx = i32::try_from(id.checked_sub(1)?).ok()?;
        let (col, row) = (idx % self.columns, idx / self.columns);
        Some(Rect::new(
            col * self.tile_width,
            row * self.tile_height,
            self.tile_width,
            self.tile_height,
        ))
    }

    /// First layer flagged as collision.
    pub fn collision_layer(&self) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.collision)
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.collision_layer().is_some_and(|l| l.is_solid(col, row))
    }

    /// Draws every visible layer with tiles placed at `(col, row) × tile size`.
    ///
    /// With a camera and a non-zero viewport, only cells overlapping the
    /// camera's visible area plus a one-tile margin are submitted. The batch
    /// must be between `begin` and `end`.
    pub fn draw<B: GpuBackend>(
        &self,
        batch: &mut SpriteBatch,
        gfx: &mut GraphicsDevice<B>,
        camera: Option<&Camera2D>,
        viewport_width: u32,
        viewport_height: u32,
    ) {
        let visible = camera
            .filter(|_| viewport_width > 0 && viewport_height > 0)
            .map(|c| c.visible_area(viewport_width, viewport_height));

        for layer in self.layers.iter().filter(|l| l.visible) {
            let (cols, rows) = self.cell_range(layer, visible);
            let tint = layer_tint(layer.opacity);

            for row in rows {
                for col in cols.clone() {
                    let Some(source) = self.source_rect(layer.tile(col, row)) else {
                        continue;
                    };
                    let position = Vec2::new((col * self.tile_width) as f32, (row * self.tile_height) as f32);
                    batch.draw_region(gfx, &self.tileset, position, Some(source), tint);
                }
            }
        }
    }

    /// Columns and rows to visit for `layer`, culled to `visible` when given.
    fn cell_range(
        &self,
        layer: &TileLayer,
        visible: Option<Rect>,
    ) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        let last_col = layer.width() as i32 - 1;
        let last_row = layer.height() as i32 - 1;
        let Some(v) = visible else {
            return (0..=last_col, 0..=last_row);
        };

        (
            (v.left() / self.tile_width - 1).max(0)..=(v.right() / self.tile_width + 1).min(last_col),
            (v.top() / self.tile_height - 1).max(0)..=(v.bottom() / self.tile_height + 1).min(last_row),
        )
    }
}

fn layer_tint(opacity: f32) -> Color {
    if opacity >= 1.0 {
        Color::WHITE
    } else {
        Color::new(1.0, 1.0, 1.0, opacity)
    }
}
