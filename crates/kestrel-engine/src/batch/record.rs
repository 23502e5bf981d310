use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

use crate::coords::Rect;
use crate::paint::Color;

/// Sprites per flush; the storage buffer holds exactly this many records.
pub const MAX_SPRITES: usize = 8192;

/// Size of one [`SpriteRecord`] in the storage buffer.
pub const SPRITE_RECORD_SIZE: usize = 80;

pub const VERTICES_PER_SPRITE: u32 = 6;

/// Quad corner per vertex within a sprite (two triangles: TL TR BL, BR BL TR).
pub const CORNER_INDICES: [usize; 6] = [0, 1, 2, 3, 2, 1];

/// Unit-square corner positions, in `TL, TR, BL, BR` order.
pub const UNIT_CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// One sprite as read by the vertex stage.
///
/// Layout matches the WGSL `Sprite` struct: five 16-byte rows, std430 compatible.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteRecord {
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// UV origin in `xy`, UV extent in `zw`.
    pub source_rect: [f32; 4],
    /// Straight alpha.
    pub color: [f32; 4],
    pub origin: [f32; 2],
    /// Signed; negative components mirror the sprite.
    pub scale: [f32; 2],
    pub rotation: f32,
    _pad: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<SpriteRecord>() == SPRITE_RECORD_SIZE);

impl SpriteRecord {
    pub fn new(
        position: Vec2,
        size: Vec2,
        source_rect: Vec4,
        color: Color,
        origin: Vec2,
        scale: Vec2,
        rotation: f32,
    ) -> Self {
        Self {
            position: position.to_array(),
            size: size.to_array(),
            source_rect: source_rect.to_array(),
            color: color.to_array(),
            origin: origin.to_array(),
            scale: scale.to_array(),
            rotation,
            _pad: [0.0; 3],
        }
    }

    /// Decodes records from raw storage-buffer bytes (any alignment).
    pub fn read_all(bytes: &[u8]) -> Vec<SpriteRecord> {
        bytes
            .chunks_exact(SPRITE_RECORD_SIZE)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Pre-projection positions of the four corners, `TL, TR, BL, BR`.
    ///
    /// Mirrors the vertex stage: `(corner * size - origin) * scale`, rotated,
    /// then translated by `position`.
    pub fn corners(&self) -> [Vec2; 4] {
        let size = Vec2::from(self.size);
        let origin = Vec2::from(self.origin);
        let scale = Vec2::from(self.scale);
        let position = Vec2::from(self.position);
        let rot = Vec2::from_angle(self.rotation);

        UNIT_CORNERS.map(|c| position + rot.rotate((c * size - origin) * scale))
    }

    /// Texture coordinates of the four corners, `TL, TR, BL, BR`.
    pub fn uv_corners(&self) -> [Vec2; 4] {
        let [x, y, w, h] = self.source_rect;
        UNIT_CORNERS.map(|c| Vec2::new(x, y) + c * Vec2::new(w, h))
    }
}

/// Normalized source rectangle and drawn size for a texture region.
///
/// `None` selects the whole texture: UV `(0, 0, 1, 1)` and the texture's size.
pub fn source_uv(source: Option<Rect>, texture_width: u32, texture_height: u32) -> (Vec4, Vec2) {
    match source {
        Some(r) => {
            let tw = texture_width as f32;
            let th = texture_height as f32;
            (
                Vec4::new(r.x as f32 / tw, r.y as f32 / th, r.width as f32 / tw, r.height as f32 / th),
                r.size(),
            )
        }
        None => (
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            Vec2::new(texture_width as f32, texture_height as f32),
        ),
    }
}

/// Pixel-space orthographic projection (top-left origin, +Y down) applied
/// after an optional extra transform such as a camera view.
pub fn sprite_projection(width: u32, height: u32, extra: Option<Mat4>) -> Mat4 {
    let ortho = Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
    match extra {
        Some(m) => ortho * m,
        None => ortho,
    }
}
