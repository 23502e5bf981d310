use glam::{Mat4, Vec2, Vec3};

use crate::coords::Rect;

/// 2D camera centered on `position` in world space.
///
/// `zoom > 1` magnifies. `rotation` is in radians. When `bounds` is set, the
/// view is clamped so it never shows anything outside it; if the view is
/// larger than the bounds on an axis, it is centered on the bounds instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub rotation: f32,
    pub bounds: Option<Rect>,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            rotation: 0.0,
            bounds: None,
        }
    }
}

impl Camera2D {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World to screen-pixel transform for a `viewport_width × viewport_height`
    /// target.
    ///
    /// `T(viewport / 2) · S(zoom) · Rz(rotation) · T(-position)`
    pub fn view_matrix(&self, viewport_width: u32, viewport_height: u32) -> Mat4 {
        let pos = self.clamped_position(viewport_width, viewport_height);
        let center = Vec3::new(viewport_width as f32 / 2.0, viewport_height as f32 / 2.0, 0.0);

        Mat4::from_translation(center)
            * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_rotation_z(self.rotation)
            * Mat4::from_translation(-pos.extend(0.0))
    }

    /// Inverse of [`Self::world_to_screen`]. Returns `screen` unchanged when the
    /// view is degenerate (zero zoom).
    pub fn screen_to_world(&self, screen: Vec2, viewport_width: u32, viewport_height: u32) -> Vec2 {
        let view = self.view_matrix(viewport_width, viewport_height);
        if view.determinant() == 0.0 {
            return screen;
        }
        view.inverse().transform_point3(screen.extend(0.0)).truncate()
    }

    pub fn world_to_screen(&self, world: Vec2, viewport_width: u32, viewport_height: u32) -> Vec2 {
        self.view_matrix(viewport_width, viewport_height)
            .transform_point3(world.extend(0.0))
            .truncate()
    }

    /// Axis-aligned world rectangle covering the whole viewport, for culling.
    pub fn visible_area(&self, viewport_width: u32, viewport_height: u32) -> Rect {
        let (w, h) = (viewport_width as f32, viewport_height as f32);
        let corners = [Vec2::ZERO, Vec2::new(w, 0.0), Vec2::new(0.0, h), Vec2::new(w, h)]
            .map(|c| self.screen_to_world(c, viewport_width, viewport_height));

        let min = corners.iter().copied().reduce(Vec2::min).unwrap_or_default();
        let max = corners.iter().copied().reduce(Vec2::max).unwrap_or_default();

        Rect::new(
            min.x.floor() as i32,
            min.y.floor() as i32,
            (max.x - min.x).ceil() as i32,
            (max.y - min.y).ceil() as i32,
        )
    }

    /// Moves toward `target` by `lerp` of the remaining distance; `1.0` snaps.
    pub fn follow(&mut self, target: Vec2, lerp: f32) {
        self.position = self.position.lerp(target, lerp.min(1.0));
    }

    fn clamped_position(&self, viewport_width: u32, viewport_height: u32) -> Vec2 {
        let Some(b) = self.bounds else {
            return self.position;
        };

        let half = Vec2::new(viewport_width as f32, viewport_height as f32) / (2.0 * self.zoom);
        let axis = |p: f32, lo: i32, len: i32, half: f32| {
            let (min, max) = (lo as f32 + half, (lo + len) as f32 - half);
            if min > max {
                lo as f32 + len as f32 / 2.0
            } else {
                p.clamp(min, max)
            }
        };

        Vec2::new(
            axis(self.position.x, b.x, b.width, half.x),
            axis(self.position.y, b.y, b.height, half.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    // ── view transform ────────────────────────────────────────────────────

    #[test]
    fn position_maps_to_viewport_center() {
        let cam = Camera2D::new(Vec2::new(100.0, 50.0));
        assert!(approx(cam.world_to_screen(Vec2::new(100.0, 50.0), 200, 100), Vec2::new(100.0, 50.0)));
        assert!(approx(cam.world_to_screen(Vec2::new(0.0, 0.0), 200, 100), Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn zoom_magnifies_around_center() {
        let cam = Camera2D {
            zoom: 2.0,
            ..Camera2D::new(Vec2::new(100.0, 50.0))
        };
        assert!(approx(cam.world_to_screen(Vec2::new(110.0, 50.0), 200, 100), Vec2::new(120.0, 50.0)));
    }

    #[test]
    fn rotation_turns_world_axes() {
        let cam = Camera2D {
            rotation: std::f32::consts::FRAC_PI_2,
            ..Camera2D::new(Vec2::new(100.0, 50.0))
        };
        assert!(approx(cam.world_to_screen(Vec2::new(101.0, 50.0), 200, 100), Vec2::new(100.0, 51.0)));
    }

    #[test]
    fn screen_to_world_inverts() {
        let cam = Camera2D {
            zoom: 1.5,
            rotation: 0.3,
            ..Camera2D::new(Vec2::new(-40.0, 12.0))
        };
        let world = Vec2::new(7.0, -3.0);
        let screen = cam.world_to_screen(world, 320, 240);
        assert!(approx(cam.screen_to_world(screen, 320, 240), world));
    }

    #[test]
    fn zero_zoom_screen_to_world_is_identity() {
        let cam = Camera2D {
            zoom: 0.0,
            ..Camera2D::default()
        };
        assert_eq!(cam.screen_to_world(Vec2::new(3.0, 4.0), 100, 100), Vec2::new(3.0, 4.0));
    }

    // ── bounds / culling ──────────────────────────────────────────────────

    #[test]
    fn bounds_clamp_keeps_view_inside() {
        let cam = Camera2D {
            bounds: Some(Rect::new(0, 0, 400, 300)),
            ..Camera2D::default()
        };
        // View centered on (100, 50) shows exactly [0, 200) x [0, 100).
        assert!(approx(cam.world_to_screen(Vec2::new(100.0, 50.0), 200, 100), Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn bounds_smaller_than_view_center_on_bounds() {
        let cam = Camera2D {
            position: Vec2::new(999.0, -999.0),
            bounds: Some(Rect::new(10, 20, 50, 40)),
            ..Camera2D::default()
        };
        assert!(approx(cam.world_to_screen(Vec2::new(35.0, 40.0), 200, 100), Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn visible_area_matches_viewport() {
        let cam = Camera2D::new(Vec2::new(100.0, 50.0));
        assert_eq!(cam.visible_area(200, 100), Rect::new(0, 0, 200, 100));

        let zoomed = Camera2D {
            zoom: 2.0,
            ..cam
        };
        let area = zoomed.visible_area(200, 100);
        assert!((area.x - 50).abs() <= 1 && (area.y - 25).abs() <= 1);
        assert!((area.width - 100).abs() <= 1 && (area.height - 50).abs() <= 1);
    }

    #[test]
    fn follow_lerps_and_caps_at_target() {
        let mut cam = Camera2D::default();
        cam.follow(Vec2::new(10.0, 0.0), 0.5);
        assert_eq!(cam.position, Vec2::new(5.0, 0.0));
        cam.follow(Vec2::new(10.0, 0.0), 3.0);
        assert_eq!(cam.position, Vec2::new(10.0, 0.0));
    }
}
