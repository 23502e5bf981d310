use crate::coords::Rect;

/// Named frame sequence cut from a spritesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    pub name: String,
    pub frames: Vec<Rect>,
    /// Seconds per frame.
    pub frame_duration: f32,
    pub looping: bool,
}

impl SpriteAnimation {
    pub fn new(name: impl Into<String>, frames: Vec<Rect>, frame_duration: f32, looping: bool) -> Self {
        Self {
            name: name.into(),
            frames,
            frame_duration,
            looping,
        }
    }

    /// Slices `frame_count` cells out of a grid of `columns` columns, starting
    /// at cell `start_frame` and reading left to right, top to bottom.
    #[allow(clippy::too_many_arguments)]
    pub fn from_grid(
        name: impl Into<String>,
        frame_width: i32,
        frame_height: i32,
        start_frame: usize,
        frame_count: usize,
        columns: usize,
        frame_duration: f32,
        looping: bool,
    ) -> Self {
        let columns = columns.max(1);
        let frames = (start_frame..start_frame + frame_count)
            .map(|idx| {
                let (col, row) = ((idx % columns) as i32, (idx / columns) as i32);
                Rect::new(col * frame_width, row * frame_height, frame_width, frame_height)
            })
            .collect();
        Self::new(name, frames, frame_duration, looping)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<Rect> {
        self.frames.get(index).copied()
    }

    pub fn total_duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_grid_wraps_rows() {
        let anim = SpriteAnimation::from_grid("walk", 16, 24, 2, 4, 4, 0.1, true);
        assert_eq!(
            anim.frames,
            vec![
                Rect::new(32, 0, 16, 24),
                Rect::new(48, 0, 16, 24),
                Rect::new(0, 24, 16, 24),
                Rect::new(16, 24, 16, 24),
            ]
        );
        assert_eq!(anim.frame_count(), 4);
        assert!((anim.total_duration() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn frame_out_of_range_is_none() {
        let anim = SpriteAnimation::from_grid("idle", 8, 8, 0, 2, 2, 0.5, false);
        assert_eq!(anim.frame(1), Some(Rect::new(8, 0, 8, 8)));
        assert_eq!(anim.frame(2), None);
    }
}
