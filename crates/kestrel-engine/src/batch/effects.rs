use std::ops::{BitOr, BitOrAssign};

/// Mirroring applied to a sprite by negating its scale.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SpriteEffects(u8);

impl SpriteEffects {
    pub const NONE: SpriteEffects = SpriteEffects(0);
    pub const FLIP_HORIZONTALLY: SpriteEffects = SpriteEffects(1);
    pub const FLIP_VERTICALLY: SpriteEffects = SpriteEffects(2);

    #[inline]
    pub const fn contains(self, other: SpriteEffects) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `scale` with the flipped axes negated.
    #[inline]
    pub fn apply(self, scale: [f32; 2]) -> [f32; 2] {
        let [mut x, mut y] = scale;
        if self.contains(Self::FLIP_HORIZONTALLY) {
            x = -x;
        }
        if self.contains(Self::FLIP_VERTICALLY) {
            y = -y;
        }
        [x, y]
    }
}

impl BitOr for SpriteEffects {
    type Output = SpriteEffects;

    #[inline]
    fn bitor(self, rhs: SpriteEffects) -> SpriteEffects {
        SpriteEffects(self.0 | rhs.0)
    }
}

impl BitOrAssign for SpriteEffects {
    #[inline]
    fn bitor_assign(&mut self, rhs: SpriteEffects) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_flip_negates_x() {
        assert_eq!(SpriteEffects::FLIP_HORIZONTALLY.apply([2.0, 3.0]), [-2.0, 3.0]);
    }

    #[test]
    fn both_flips_negate_both_axes() {
        let both = SpriteEffects::FLIP_HORIZONTALLY | SpriteEffects::FLIP_VERTICALLY;
        assert!(both.contains(SpriteEffects::FLIP_VERTICALLY));
        assert_eq!(both.apply([1.0, 1.0]), [-1.0, -1.0]);
    }

    #[test]
    fn flip_of_negative_scale_is_positive() {
        assert_eq!(SpriteEffects::FLIP_HORIZONTALLY.apply([-2.0, 1.0]), [2.0, 1.0]);
        assert_eq!(SpriteEffects::NONE.apply([-2.0, 1.0]), [-2.0, 1.0]);
    }
}
