//! Grid maps drawn from a single tileset through the sprite batch.
//!
//! Tile ids are 1-based: id `n` is the `n`-th cell of the tileset read left to
//! right, top to bottom, and `0` is an empty cell.

mod tile_layer;
mod tile_map;

pub use tile_layer::{TileLayer, TileMapError};
pub use tile_map::TileMap;
