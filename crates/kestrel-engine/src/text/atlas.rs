//! Glyph atlas packing.

pub(crate) const MIN_ATLAS_SIZE: u32 = 256;
pub(crate) const MAX_ATLAS_SIZE: u32 = 4096;

/// Smallest power-of-two square side whose area is at least twice
/// `padded_area`, clamped to `[MIN_ATLAS_SIZE, MAX_ATLAS_SIZE]`.
pub(crate) fn atlas_side(padded_area: u64) -> u32 {
    let mut side = MIN_ATLAS_SIZE;
    while (side as u64 * side as u64) < padded_area * 2 && side < MAX_ATLAS_SIZE {
        side *= 2;
    }
    side
}

/// Row packer with a 1px gutter around every rectangle.
///
/// Rectangles are placed left to right in input order; a rectangle that
/// would cross the right edge starts a new row below the tallest one so far.
/// Returns the top-left corner of each rectangle, or `None` if they overflow
/// the bottom edge.
pub(crate) fn pack_rows(sizes: &[(u32, u32)], side: u32) -> Option<Vec<(u32, u32)>> {
    let (mut x, mut y, mut row_height) = (1u32, 1u32, 0u32);
    let mut out = Vec::with_capacity(sizes.len());

    for &(w, h) in sizes {
        if x + w + 1 > side {
            x = 1;
            y += row_height + 1;
            row_height = 0;
        }
        if x + w + 1 > side || y + h + 1 > side {
            return None;
        }
        out.push((x, y));
        x += w + 1;
        row_height = row_height.max(h);
    }
    Some(out)
}
