use anyhow::{Context, Result};
use glam::Vec2;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use kestrel_engine::anim::{AnimatedSprite, SpriteAnimation};
use kestrel_engine::batch::{SpriteBatch, SpriteEffects, SpriteParams};
use kestrel_engine::camera::Camera2D;
use kestrel_engine::core::{App, AppControl, FrameCtx};
use kestrel_engine::device::{DrawTarget, Gpu, GpuInit};
use kestrel_engine::diagnostics::DebugOverlay;
use kestrel_engine::frame::GraphicsDevice;
use kestrel_engine::logging::{init_logging, LoggingConfig};
use kestrel_engine::paint::Color;
use kestrel_engine::text::SpriteFont;
use kestrel_engine::texture::{RenderTarget, Texture};
use kestrel_engine::tilemap::{TileLayer, TileMap};
use kestrel_engine::window::{Runtime, RuntimeConfig};

const WORLD_TILES: u32 = 24;
const TILE: i32 = 32;
const CAMERA_SPEED: f32 = 240.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Kestrel sprite demo".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), Demo::default())
}

/// GPU resources, created once the window exists.
struct Scene {
    batch: SpriteBatch,
    world: TileMap<Texture>,
    minimap: RenderTarget,
    runner: AnimatedSprite<Texture>,
    font: Option<SpriteFont>,
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
    camera: Camera2D,
    overlay: DebugOverlay,
    /// Held arrow keys: left, right, up, down.
    held: [bool; 4],
    spin: f32,
}

impl App for Demo {
    fn init(&mut self, gfx: &mut GraphicsDevice<Gpu<'_>>) -> Result<()> {
        let batch = SpriteBatch::new(gfx)?;
        let tiles = Texture::from_rgba(gfx, 64, 32, &tile_sheet(64, 32))?;
        let world = TileMap::new(tiles, TILE, TILE, vec![ground_layer()?])?;
        let minimap = RenderTarget::new(gfx, 128, 128)?;

        let sheet = Texture::from_rgba(gfx, 128, 32, &runner_sheet(128, 32))?;
        let mut runner = AnimatedSprite::new(sheet);
        runner.add_animation(SpriteAnimation::from_grid("run", 32, 32, 0, 4, 4, 0.12, true));
        runner.play("run")?;

        let font = match load_font() {
            Some(ttf) => Some(SpriteFont::from_ttf(gfx, &ttf, 16.0).context("failed to build demo font")?),
            None => {
                log::warn!("no system font found; text disabled");
                None
            }
        };

        let extent = WORLD_TILES as i32 * TILE;
        self.camera = Camera2D {
            position: Vec2::splat(extent as f32 / 2.0),
            bounds: Some(kestrel_engine::coords::Rect::new(0, 0, extent, extent)),
            ..Camera2D::default()
        };
        self.overlay = DebugOverlay::new(true);

        self.scene = Some(Scene {
            batch,
            world,
            minimap,
            runner,
            font,
        });
        Ok(())
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event: KeyEvent {
                physical_key: PhysicalKey::Code(code),
                state,
                repeat,
                ..
            },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        let down = *state == ElementState::Pressed;
        match code {
            KeyCode::Escape if down => return AppControl::Exit,
            KeyCode::F3 if down && !repeat => self.overlay.enabled = !self.overlay.enabled,
            KeyCode::Equal if down => self.camera.zoom = (self.camera.zoom * 1.1).min(8.0),
            KeyCode::Minus if down => self.camera.zoom = (self.camera.zoom / 1.1).max(0.25),
            KeyCode::ArrowLeft => self.held[0] = down,
            KeyCode::ArrowRight => self.held[1] = down,
            KeyCode::ArrowUp => self.held[2] = down,
            KeyCode::ArrowDown => self.held[3] = down,
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        let dt = ctx.time.dt;
        let dir = Vec2::new(
            (self.held[1] as i32 - self.held[0] as i32) as f32,
            (self.held[3] as i32 - self.held[2] as i32) as f32,
        );
        let target = self.camera.position + dir * CAMERA_SPEED * dt / self.camera.zoom;
        self.camera.follow(target, 1.0);
        self.spin += dt;

        scene.runner.update(dt);
        self.overlay.update(&ctx.time);

        let camera = self.camera;
        let spin = self.spin;
        let overlay = &mut self.overlay;

        ctx.render(Color::CORNFLOWER_BLUE, |gfx| {
            let (w, h) = (gfx.render_width(), gfx.render_height());
            let batch = &mut scene.batch;

            // Offscreen minimap: the whole world at 1/6 scale.
            batch.set_render_target(gfx, scene.minimap.target());
            batch.begin(None, Some(glam::Mat4::from_scale(glam::Vec3::new(1.0 / 6.0, 1.0 / 6.0, 1.0))));
            scene.world.draw(batch, gfx, None, 0, 0);
            batch.end(gfx);
            batch.set_render_target(gfx, DrawTarget::Surface);

            // World through the camera.
            batch.begin(None, Some(camera.view_matrix(w, h)));
            scene.world.draw(batch, gfx, Some(&camera), w, h);
            let center = Vec2::splat((WORLD_TILES as i32 * TILE) as f32 / 2.0);
            scene.runner.draw(batch, gfx, &SpriteParams {
                position: center,
                origin: Vec2::splat(16.0),
                scale: Vec2::splat(2.0),
                effects: if spin.sin() < 0.0 {
                    SpriteEffects::FLIP_HORIZONTALLY
                } else {
                    SpriteEffects::NONE
                },
                ..SpriteParams::default()
            });
            batch.end(gfx);

            // Screen-space UI.
            batch.begin(None, None);
            batch.draw_ex(gfx, &scene.minimap, &SpriteParams {
                position: Vec2::new(w as f32 - 140.0, 12.0),
                color: Color::WHITE.with_alpha(0.85),
                ..SpriteParams::default()
            });
            if let Some(font) = &scene.font {
                let label = "arrows: move  +/-: zoom  F3: stats";
                let size = font.measure_string(label);
                batch.draw_string(gfx, font, label, Vec2::new(12.0, h as f32 - size.y - 8.0), Color::WHITE);
            }
            batch.end(gfx);

            if let Some(font) = &scene.font {
                overlay.draw(batch, gfx, font);
            }
        })
    }
}

/// Grass (tile 1) scattered with the darker checker (tile 2).
fn ground_layer() -> Result<TileLayer> {
    let tiles = (0..WORLD_TILES)
        .flat_map(|y| (0..WORLD_TILES).map(move |x| 1 + (x * 7 + y * 13) % 2))
        .collect();
    Ok(TileLayer::new("ground", WORLD_TILES, WORLD_TILES, tiles)?)
}

/// Two 32×32 tiles side by side: grass and a darker checker.
fn tile_sheet(width: u32, height: u32) -> Vec<u8> {
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let tile = x / 32;
            let checker = ((x / 8) + (y / 8)) % 2 == 0;
            let rgba = match (tile, checker) {
                (0, true) => [86, 160, 72, 255],
                (0, false) => [78, 148, 66, 255],
                (_, true) => [60, 110, 56, 255],
                (_, false) => [52, 98, 50, 255],
            };
            px.extend_from_slice(&rgba);
        }
    }
    px
}

/// Four frames of a bouncing square, for the animation.
fn runner_sheet(width: u32, height: u32) -> Vec<u8> {
    let mut px = vec![0u8; (width * height * 4) as usize];
    for frame in 0..4u32 {
        let lift = [0, 4, 8, 4][frame as usize];
        for y in (8 + 8 - lift)..(24 + 8 - lift).min(height) {
            for x in (frame * 32 + 8)..(frame * 32 + 24) {
                let i = ((y * width + x) * 4) as usize;
                px[i..i + 4].copy_from_slice(&[240, 200, 60, 255]);
            }
        }
    }
    px
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}
