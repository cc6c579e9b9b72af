//! Staggered layer of 512x1024 diamond tiles with random flips.
//! Only the tiles around the camera are meshed, pan with the arrow keys and
//! zoom with PageUp/PageDown to see the geometry being rebuilt.

use bevy::{
    math::{ivec2, uvec2, vec2},
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
    sprite::Anchor,
    window::PresentMode,
};
use bevy_tile_layer::prelude::*;
use rand::Rng;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: String::from("Tile layer example"),
                    resolution: (1280., 720.).into(),
                    // disable vsync so we can see the raw FPS speed
                    present_mode: PresentMode::Immediate,
                    ..default()
                }),
                ..default()
            }),
            TileLayerPlugin,
        ))
        .add_systems(Startup, startup)
        .add_systems(Update, keyboard_controls_camera)
        .run();
}

/// Atlas of four 64x32 tiles in different colors.
fn atlas_image() -> Image {
    let (tile_w, tile_h) = (64usize, 32usize);
    let colors: [[u8; 4]; 4] = [[200, 60, 60, 255], [60, 200, 60, 255], [60, 60, 200, 255], [200, 200, 60, 255]];
    let width = tile_w * colors.len();

    let mut data = vec![0u8; width * tile_h * 4];
    for y in 0..tile_h {
        for x in 0..width {
            // diamond mask, brighter towards the top-left edge to make flips visible
            let (lx, ly) = ((x % tile_w) as f32 / tile_w as f32, y as f32 / tile_h as f32);
            if (lx - 0.5).abs() + (ly - 0.5).abs() > 0.5 {
                continue;
            }
            let shade = if lx < 0.5 && ly < 0.5 { 55 } else { 0 };
            let color = colors[x / tile_w];
            let i = (y * width + x) * 4;
            data[i] = color[0].saturating_add(shade);
            data[i + 1] = color[1].saturating_add(shade);
            data[i + 2] = color[2].saturating_add(shade);
            data[i + 3] = color[3];
        }
    }

    Image::new(
        Extent3d {
            width: width as u32,
            height: tile_h as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
    )
}

fn startup(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    let mut rng = rand::thread_rng();

    let layer = TileLayer::builder(uvec2(512, 1024), TileOrientation::Staggered)
        .with_tile_size(uvec2(64, 32))
        .with_anchor(Anchor::Center)
        .build_and_initialize(|grid| {
            for y in 0..grid.size().y as i32 {
                for x in 0..grid.size().x as i32 {
                    if rng.gen_bool(0.05) {
                        continue;
                    }
                    let mut flip = FlipFlags::NONE;
                    for f in Flip::ALL {
                        if rng.gen_bool(0.25) {
                            flip.insert(f);
                        }
                    }
                    grid.set(ivec2(x, y), Some(rng.gen_range(0..4)), flip);
                }
            }
        });

    let tileset = AtlasTileset::new(images.add(atlas_image()), vec2(64., 32.));

    commands.spawn(TileLayerBundle::new(
        layer,
        tileset,
        &mut meshes,
        &mut materials,
    ));
}

fn keyboard_controls_camera(
    keyboard: Res<Input<KeyCode>>,
    time: Res<Time>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>,
) {
    for (mut transform, mut projection) in cameras.iter_mut() {
        let mut direction = Vec2::ZERO;
        if keyboard.pressed(KeyCode::Left) {
            direction.x -= 1.;
        }
        if keyboard.pressed(KeyCode::Right) {
            direction.x += 1.;
        }
        if keyboard.pressed(KeyCode::Up) {
            direction.y += 1.;
        }
        if keyboard.pressed(KeyCode::Down) {
            direction.y -= 1.;
        }
        let speed = 800. * projection.scale * time.delta_seconds();
        transform.translation += (direction * speed).extend(0.);

        if keyboard.pressed(KeyCode::PageUp) {
            projection.scale = (projection.scale * 0.98).max(1. / 16.);
        }
        if keyboard.pressed(KeyCode::PageDown) {
            projection.scale = (projection.scale * 1.02).min(16.);
        }
    }
}
