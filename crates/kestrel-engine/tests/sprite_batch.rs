//! Sprite batching behavior observed through the headless backend's command
//! stream.

use std::collections::HashMap;

use kestrel_engine::batch::{
    SpriteBatch, SpriteEffects, SpriteParams, SpriteRecord, TextParams, MAX_SPRITES,
};
use kestrel_engine::coords::{Rect, Vec2};
use kestrel_engine::device::{
    DrawTarget, GpuCommand, HeadlessBackend, LoadAction, PipelineId, TextureId,
};
use kestrel_engine::effect::{builtin, Effect};
use kestrel_engine::frame::GraphicsDevice;
use kestrel_engine::paint::Color;
use kestrel_engine::text::{Glyph, SpriteFont};
use kestrel_engine::texture::{ReloadError, RenderTarget, Texture};

/// One flush as seen by the device: the sampled texture, the records in the
/// storage upload that preceded it, and the vertex count drawn.
#[derive(Debug)]
struct Flush {
    texture: TextureId,
    records: Vec<SpriteRecord>,
    vertex_count: u32,
}

fn flushes(commands: &[GpuCommand]) -> Vec<Flush> {
    let mut last_upload: &[u8] = &[];
    let mut texture = None;
    let mut out = Vec::new();

    for cmd in commands {
        match cmd {
            GpuCommand::UploadBuffer { bytes, .. } => last_upload = bytes,
            GpuCommand::BindFragmentSampler { texture: t, .. } => texture = Some(*t),
            GpuCommand::DrawPrimitives { vertex_count } => out.push(Flush {
                texture: texture.expect("draw without a bound texture"),
                records: SpriteRecord::read_all(last_upload),
                vertex_count: *vertex_count,
            }),
            _ => {}
        }
    }
    out
}

struct Fixture {
    gfx: GraphicsDevice<HeadlessBackend>,
    batch: SpriteBatch,
    a: Texture,
    b: Texture,
}

fn fixture() -> Fixture {
    let mut gfx = GraphicsDevice::new(HeadlessBackend::new(640, 480));
    let batch = SpriteBatch::new(&mut gfx).unwrap();
    let a = Texture::solid(&mut gfx, 16, 16, Color::RED).unwrap();
    let b = Texture::solid(&mut gfx, 8, 8, Color::BLUE).unwrap();
    Fixture { gfx, batch, a, b }
}

// ── batching ──────────────────────────────────────────────────────────────

#[test]
fn same_texture_draws_flush_once() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    for i in 0..100 {
        batch.draw(&mut gfx, &a, Vec2::new(i as f32, 0.0), Color::WHITE);
    }
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    assert_eq!(f.len(), 1);
    assert_eq!(f[0].records.len(), 100);
    assert_eq!(f[0].vertex_count, 600);
    assert_eq!(batch.total_draw_calls(), 1);
}

#[test]
fn alternating_textures_flush_in_call_order() {
    let Fixture { mut gfx, mut batch, a, b } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::new(1.0, 0.0), Color::WHITE);
    batch.draw(&mut gfx, &b, Vec2::new(2.0, 0.0), Color::WHITE);
    batch.draw(&mut gfx, &a, Vec2::new(3.0, 0.0), Color::WHITE);
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    let summary: Vec<(TextureId, Vec<[f32; 2]>)> = f
        .iter()
        .map(|f| (f.texture, f.records.iter().map(|r| r.position).collect()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (a.id(), vec![[1.0, 0.0]]),
            (b.id(), vec![[2.0, 0.0]]),
            (a.id(), vec![[3.0, 0.0]]),
        ]
    );
}

#[test]
fn exactly_capacity_is_one_flush() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    for _ in 0..MAX_SPRITES {
        batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    }
    assert_eq!(batch.total_draw_calls(), 0);
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    assert_eq!(f.len(), 1);
    assert_eq!(f[0].records.len(), MAX_SPRITES);
}

#[test]
fn capacity_plus_one_forces_early_flush() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    for _ in 0..=MAX_SPRITES {
        batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    }
    assert_eq!(batch.total_draw_calls(), 1);
    assert_eq!(batch.pending(), 1);
    batch.end(&mut gfx);
    gfx.end_frame();

    let sizes: Vec<usize> = flushes(gfx.backend().commands())
        .iter()
        .map(|f| f.records.len())
        .collect();
    assert_eq!(sizes, vec![MAX_SPRITES, 1]);
    assert_eq!(batch.total_sprites(), MAX_SPRITES as u64 + 1);
}

// ── records ───────────────────────────────────────────────────────────────

#[test]
fn whole_texture_uses_unit_uv() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    batch.draw_region(&mut gfx, &a, Vec2::ZERO, Some(Rect::new(4, 8, 4, 8)), Color::WHITE);
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    assert_eq!(f[0].records[0].source_rect, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(f[0].records[0].size, [16.0, 16.0]);
    assert_eq!(f[0].records[1].source_rect, [0.25, 0.5, 0.25, 0.5]);
    assert_eq!(f[0].records[1].size, [4.0, 8.0]);
}

#[test]
fn flip_flags_negate_scale() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw_ex(&mut gfx, &a, &SpriteParams {
        effects: SpriteEffects::FLIP_HORIZONTALLY,
        ..SpriteParams::default()
    });
    batch.draw_ex(&mut gfx, &a, &SpriteParams {
        scale: Vec2::new(-1.0, 1.0),
        effects: SpriteEffects::FLIP_HORIZONTALLY,
        ..SpriteParams::default()
    });
    batch.draw_ex(&mut gfx, &a, &SpriteParams {
        effects: SpriteEffects::FLIP_HORIZONTALLY | SpriteEffects::FLIP_VERTICALLY,
        ..SpriteParams::default()
    });
    batch.end(&mut gfx);
    gfx.end_frame();

    let scales: Vec<[f32; 2]> = flushes(gfx.backend().commands())[0]
        .records
        .iter()
        .map(|r| r.scale)
        .collect();
    assert_eq!(scales, vec![[-1.0, 1.0], [1.0, 1.0], [-1.0, -1.0]]);
}

#[test]
fn text_glyphs_share_one_atlas_flush() {
    let Fixture { mut gfx, mut batch, .. } = fixture();
    let atlas = Texture::solid(&mut gfx, 64, 64, Color::WHITE).unwrap();
    let atlas_id = atlas.id();
    let glyph = |x: i32, advance: f32| Glyph {
        source: Rect::new(x, 0, 8, 10),
        offset: Vec2::new(1.0, 2.0),
        advance,
    };
    let glyphs = HashMap::from([
        ('A', glyph(0, 8.0)),
        ('V', glyph(8, 9.0)),
        (' ', Glyph { source: Rect::EMPTY, offset: Vec2::ZERO, advance: 4.0 }),
    ]);
    let font = SpriteFont::new(atlas, glyphs, 12.0, HashMap::from([(('A', 'V'), -2.0)]));

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw_string_ex(&mut gfx, &font, "AV ?\r\nA", &TextParams {
        position: Vec2::new(10.0, 20.0),
        scale: Vec2::splat(2.0),
        ..TextParams::default()
    });
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    assert_eq!(f.len(), 1);
    assert_eq!(f[0].texture, atlas_id);
    let positions: Vec<[f32; 2]> = f[0].records.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![[12.0, 24.0], [24.0, 24.0], [12.0, 48.0]]);
    assert!(f[0].records.iter().all(|r| r.scale == [2.0, 2.0]));
}

// ── effects ───────────────────────────────────────────────────────────────

#[test]
fn begin_with_effect_binds_its_pipeline() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();
    let effect = Effect::from_wgsl(
        &mut gfx,
        builtin::SPRITE_WGSL,
        builtin::VERTEX_ENTRY,
        builtin::FRAGMENT_ENTRY,
    )
    .unwrap();

    gfx.begin_frame().unwrap();
    batch.begin(Some(&effect), None);
    batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    batch.end(&mut gfx);
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    batch.end(&mut gfx);
    gfx.end_frame();

    let binds: Vec<PipelineId> = gfx
        .backend()
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::BindPipeline(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(binds.len(), 2);
    assert_eq!(binds[0], effect.pipeline());
    assert_ne!(binds[1], effect.pipeline());
}

// ── textures ──────────────────────────────────────────────────────────────

#[test]
fn reload_same_size_keeps_handle() {
    let Fixture { mut gfx, mut a, .. } = fixture();
    let id = a.id();

    let green = [0u8, 255, 0, 255].repeat(16 * 16);
    a.reload(&mut gfx, 16, 16, &green).unwrap();

    assert_eq!(a.id(), id);
    assert_eq!(gfx.backend().texture_pixels(id), Some(green.as_slice()));
}

#[test]
fn reload_64_then_reject_32() {
    let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
    let original = [9u8, 8, 7, 255].repeat(64 * 64);
    let mut tex = Texture::from_rgba(&mut gfx, 64, 64, &original).unwrap();
    let id = tex.id();

    let replacement = [1u8, 2, 3, 255].repeat(64 * 64);
    tex.reload(&mut gfx, 64, 64, &replacement).unwrap();
    assert_eq!(tex.id(), id);

    let small = [0u8; 32 * 32 * 4];
    let err = tex.reload(&mut gfx, 32, 32, &small).unwrap_err();
    assert!(matches!(
        err,
        ReloadError::SizeMismatch { width: 64, height: 64, new_width: 32, new_height: 32 }
    ));
    assert_eq!(gfx.backend().texture_pixels(id), Some(replacement.as_slice()));
    assert_eq!((tex.width(), tex.height()), (64, 64));
}

// ── frames ────────────────────────────────────────────────────────────────

#[test]
fn empty_frame_still_clears_surface_once() {
    let mut gfx = GraphicsDevice::new(HeadlessBackend::new(64, 64));
    gfx.clear(Color::CORNFLOWER_BLUE);
    gfx.begin_frame().unwrap();
    gfx.end_frame();

    let passes: Vec<&GpuCommand> = gfx
        .backend()
        .commands()
        .iter()
        .filter(|c| matches!(c, GpuCommand::BeginRenderPass { .. }))
        .collect();
    assert_eq!(
        passes,
        vec![&GpuCommand::BeginRenderPass {
            target: DrawTarget::Surface,
            load: LoadAction::Clear(Color::CORNFLOWER_BLUE),
        }]
    );
    assert_eq!(gfx.backend().frames_submitted(), 1);
}

#[test]
fn render_target_then_surface_each_clear_once() {
    let Fixture { mut gfx, mut batch, a, .. } = fixture();
    let rt = RenderTarget::new(&mut gfx, 128, 128).unwrap();

    gfx.begin_frame().unwrap();
    batch.set_render_target(&mut gfx, rt.target());
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    batch.end(&mut gfx);
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::ONE, Color::WHITE);
    batch.end(&mut gfx);

    batch.set_render_target(&mut gfx, DrawTarget::Surface);
    batch.begin(None, None);
    batch.draw(&mut gfx, &rt, Vec2::ZERO, Color::WHITE);
    batch.end(&mut gfx);
    gfx.end_frame();

    let loads: Vec<(DrawTarget, bool)> = gfx
        .backend()
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::BeginRenderPass { target, load } => {
                Some((*target, matches!(load, LoadAction::Clear(_))))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        loads,
        vec![(rt.target(), true), (rt.target(), false), (DrawTarget::Surface, true)]
    );
}

#[test]
fn dropped_texture_released_after_submit() {
    let Fixture { mut gfx, mut batch, a, b } = fixture();
    let id = b.id();

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::ZERO, Color::WHITE);
    batch.draw(&mut gfx, &b, Vec2::ZERO, Color::WHITE);
    batch.end(&mut gfx);
    drop(b);
    assert!(gfx.backend().is_live_texture(id));
    gfx.end_frame();

    assert!(!gfx.backend().is_live_texture(id));
}

// ── end to end ────────────────────────────────────────────────────────────

#[test]
fn two_textures_three_sprites() {
    let Fixture { mut gfx, mut batch, a, b } = fixture();
    let (calls, sprites) = (batch.total_draw_calls(), batch.total_sprites());

    gfx.begin_frame().unwrap();
    batch.begin(None, None);
    batch.draw(&mut gfx, &a, Vec2::new(0.0, 0.0), Color::WHITE);
    batch.draw(&mut gfx, &a, Vec2::new(10.0, 0.0), Color::WHITE);
    batch.draw(&mut gfx, &b, Vec2::new(0.0, 10.0), Color::WHITE);
    batch.end(&mut gfx);
    gfx.end_frame();

    let f = flushes(gfx.backend().commands());
    assert_eq!(f.len(), 2);
    assert_eq!((f[0].texture, f[0].records.len()), (a.id(), 2));
    assert_eq!((f[1].texture, f[1].records.len()), (b.id(), 1));
    assert_eq!(f[1].records[0].position, [0.0, 10.0]);
    assert_eq!(batch.total_sprites() - sprites, 3);
    assert_eq!(batch.total_draw_calls() - calls, 2);
}
