use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileMapError {
    #[error("layer '{name}' has {actual} tiles, expected {width}x{height}")]
    TileCount {
        name: String,
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("tile size {width}x{height} does not fit a {tileset_width}px wide tileset")]
    TileSize {
        width: i32,
        height: i32,
        tileset_width: u32,
    },
}

/// One grid of tile ids, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    name: String,
    width: u32,
    height: u32,
    tiles: Vec<u32>,

    pub visible: bool,
    /// Multiplied into the tint alpha.
    pub opacity: f32,
    /// Non-empty cells of a collision layer are solid.
    pub collision: bool,
}

impl TileLayer {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tiles: Vec<u32>,
    ) -> Result<Self, TileMapError> {
        let name = name.into();
        if tiles.len() != width as usize * height as usize {
            return Err(TileMapError::TileCount {
                name,
                width,
                height,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            name,
            width,
            height,
            tiles,
            visible: true,
            opacity: 1.0,
            collision: false,
        })
    }

    /// A layer of `width × height` empty cells.
    pub fn empty(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tiles: vec![0; width as usize * height as usize],
            visible: true,
            opacity: 1.0,
            collision: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile id at a cell, `0` outside the grid.
    pub fn tile(&self, col: i32, row: i32) -> u32 {
        self.index(col, row).map_or(0, |i| self.tiles[i])
    }

    /// Writes a cell. Cells outside the grid are ignored.
    pub fn set_tile(&mut self, col: i32, row: i32, id: u32) {
        if let Some(i) = self.index(col, row) {
            self.tiles[i] = id;
        }
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.collision && self.tile(col, row) != 0
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        let col = u32::try_from(col).ok().filter(|c| *c < self.width)?;
        let row = u32::try_from(row).ok().filter(|r| *r < self.height)?;
        Some(row as usize * self.width as usize + col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_tile_count_rejected() {
        let err = TileLayer::new("ground", 3, 2, vec![1; 5]).unwrap_err();
        assert_eq!(
            err,
            TileMapError::TileCount {
                name: "ground".into(),
                width: 3,
                height: 2,
                actual: 5,
            }
        );
    }

    #[test]
    fn cells_are_row_major() {
        let layer = TileLayer::new("ground", 3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(layer.tile(2, 0), 3);
        assert_eq!(layer.tile(0, 1), 4);
        assert!(layer.visible);
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn out_of_bounds_reads_empty_and_writes_nothing() {
        let mut layer = TileLayer::empty("ground", 2, 2);
        for (col, row) in [(-1, 0), (0, -1), (2, 0), (0, 2)] {
            layer.set_tile(col, row, 9);
            assert_eq!(layer.tile(col, row), 0);
        }
        assert_eq!(layer, TileLayer::empty("ground", 2, 2));
    }

    #[test]
    fn only_collision_layers_are_solid() {
        let mut layer = TileLayer::new("walls", 2, 1, vec![0, 7]).unwrap();
        assert!(!layer.is_solid(1, 0));
        layer.collision = true;
        assert!(layer.is_solid(1, 0));
        assert!(!layer.is_solid(0, 0));
        assert!(!layer.is_solid(5, 0));
    }
}
