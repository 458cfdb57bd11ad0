use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{PrimaryWindow, WindowResized};

use crate::field::{Field, Segment};

/// Draw order, back to front: halos, particle discs, connection lines.
const Z_HALO: f32 = -1.0;
const Z_CORE: f32 = 0.0;
const Z_LINE: f32 = 1.0;

const TEX_SIZE: u32 = 64;

/// Marks the disc drawn for the particle at this index in the field.
#[derive(Component)]
pub struct ParticleSprite(pub usize);

/// Marks the glow halo behind the particle at this index.
#[derive(Component)]
pub struct HaloSprite(pub usize);

/// Marks a pooled connection-line quad. Lines are reused across frames and
/// hidden when fewer are needed.
#[derive(Component)]
pub struct LineSprite;

/// The two shared textures every particle sprite is tinted from.
#[derive(Resource)]
pub struct ParticleTextures {
    pub disc: Handle<Image>,
    pub halo: Handle<Image>,
}

/// Camera centered on the window so world coordinates span the surface, plus
/// the shared particle textures.
pub fn setup(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    window: Single<&Window, With<PrimaryWindow>>,
) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(window.width() / 2.0, window.height() / 2.0, 0.0),
    ));
    commands.insert_resource(ParticleTextures {
        disc: images.add(texture(disc_pixels())),
        halo: images.add(texture(halo_pixels())),
    });
}

/// Keep the camera centered on the surface across resizes. Runs whether or
/// not the animator is running, so a remount always finds the camera where
/// the field expects it.
pub fn recenter_camera(
    mut resized: EventReader<WindowResized>,
    mut camera: Single<&mut Transform, With<Camera2d>>,
) {
    if let Some(event) = resized.read().last() {
        camera.translation.x = event.width / 2.0;
        camera.translation.y = event.height / 2.0;
    }
}

/// Field space is window space: origin top-left, y down. World space is y up
/// with the camera centered on the surface.
fn to_world(p: Vec2, bounds: Vec2, z: f32) -> Vec3 {
    Vec3::new(p.x, bounds.y - p.y, z)
}

/// Reconcile disc and halo entities with the particle collection, then push
/// current position, size and color into each sprite.
pub fn sync_particles(
    mut commands: Commands,
    field: Single<&Field>,
    textures: Res<ParticleTextures>,
    mut discs: Query<
        (Entity, &ParticleSprite, &mut Sprite, &mut Transform),
        Without<HaloSprite>,
    >,
    mut halos: Query<
        (Entity, &HaloSprite, &mut Sprite, &mut Transform, &mut Visibility),
        Without<ParticleSprite>,
    >,
) {
    let particles = &field.particles;
    let bounds = field.bounds;

    let mut live_discs = 0;
    for (entity, marker, mut sprite, mut transform) in &mut discs {
        let Some(particle) = particles.get(marker.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        transform.translation = to_world(particle.pos, bounds, Z_CORE);
        sprite.custom_size = Some(Vec2::splat(particle.radius * 2.0));
        sprite.color = particle.color.into();
        live_discs += 1;
    }

    let mut live_halos = 0;
    for (entity, marker, mut sprite, mut transform, mut visibility) in &mut halos {
        let Some(particle) = particles.get(marker.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        let outer = particle.radius * (1.0 + 2.0 * particle.glow);
        transform.translation = to_world(particle.pos, bounds, Z_HALO);
        sprite.custom_size = Some(Vec2::splat(outer * 2.0));
        sprite.color = particle.color.with_alpha(particle.color.alpha * particle.glow).into();
        *visibility = if particle.glow > 0.0 { Visibility::Visible } else { Visibility::Hidden };
        live_halos += 1;
    }

    // Entities are spawned with contiguous indices, so anything missing is a
    // tail of newly created particles.
    for index in live_discs..particles.len() {
        let particle = &particles[index];
        commands.spawn((
            ParticleSprite(index),
            Sprite {
                image: textures.disc.clone(),
                color: particle.color.into(),
                custom_size: Some(Vec2::splat(particle.radius * 2.0)),
                ..default()
            },
            Transform::from_translation(to_world(particle.pos, bounds, Z_CORE)),
        ));
    }
    for index in live_halos..particles.len() {
        let particle = &particles[index];
        commands.spawn((
            HaloSprite(index),
            Sprite {
                image: textures.halo.clone(),
                color: particle.color.with_alpha(0.0).into(),
                custom_size: Some(Vec2::splat(particle.radius * 2.0)),
                ..default()
            },
            Transform::from_translation(to_world(particle.pos, bounds, Z_HALO)),
            Visibility::Hidden,
        ));
    }
}

/// The connect phase. Segments come out of the field already colored and
/// sized; this just maps them onto a pool of rotated quad sprites.
pub fn sync_connections(
    mut commands: Commands,
    field: Single<&Field>,
    mut lines: Query<(&mut Sprite, &mut Transform, &mut Visibility), With<LineSprite>>,
) {
    let segments = field.connections();
    let bounds = field.bounds;

    let mut pool = lines.iter_mut();
    for segment in &segments {
        let length = segment.a.distance(segment.b);
        if let Some((mut sprite, mut transform, mut visibility)) = pool.next() {
            sprite.color = segment.color.into();
            sprite.custom_size = Some(Vec2::new(length, segment.width));
            *transform = line_transform(segment, bounds);
            *visibility = Visibility::Visible;
        } else {
            commands.spawn((
                LineSprite,
                Sprite::from_color(Color::from(segment.color), Vec2::new(length, segment.width)),
                line_transform(segment, bounds),
            ));
        }
    }
    for (_, _, mut visibility) in pool {
        *visibility = Visibility::Hidden;
    }
}

fn line_transform(segment: &Segment, bounds: Vec2) -> Transform {
    let a = to_world(segment.a, bounds, Z_LINE);
    let b = to_world(segment.b, bounds, Z_LINE);
    let angle = (b.y - a.y).atan2(b.x - a.x);
    Transform {
        translation: (a + b) / 2.0,
        rotation: Quat::from_rotation_z(angle),
        ..default()
    }
}

fn texture(pixels: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width: TEX_SIZE,
            height: TEX_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        pixels,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// White RGBA square with per-pixel alpha taken from `falloff`, which gets
/// the normalized distance from the center (1.0 == the disc edge).
fn radial_pixels(falloff: impl Fn(f32) -> f32) -> Vec<u8> {
    let half = TEX_SIZE as f32 / 2.0;
    let mut pixels = Vec::with_capacity((TEX_SIZE * TEX_SIZE * 4) as usize);
    for y in 0..TEX_SIZE {
        for x in 0..TEX_SIZE {
            let dx = x as f32 + 0.5 - half;
            let dy = y as f32 + 0.5 - half;
            let t = (dx * dx + dy * dy).sqrt() / half;
            let alpha = falloff(t).clamp(0.0, 1.0);
            pixels.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
        }
    }
    pixels
}

/// A filled disc with a one-pixel feathered rim, standing in for the flat
/// `arc` fill of the original surface.
fn disc_pixels() -> Vec<u8> {
    let half = TEX_SIZE as f32 / 2.0;
    radial_pixels(|t| (1.0 - t) * half)
}

/// A soft radial falloff for the glow halo: opaque center fading out to
/// transparent at the sprite edge.
fn halo_pixels() -> Vec<u8> {
    radial_pixels(|t| {
        let fade = (1.0 - t).max(0.0);
        fade * fade
    })
}
