use bevy::color::Srgba;
use bevy::math::Vec2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::{thread_rng, Rng};
use rayon::prelude::*;

use crate::args::ARGS;
use crate::palette::{LINE_COLOR, LINE_HIGHLIGHT_COLOR};
use crate::particle::Particle;

/// Tuning knobs for the field. Defaults are the values the animation was
/// designed around; the CLI can override them.
#[derive(Clone, Debug)]
pub struct FieldParams {
    /// Hard cap on the particle count, click bursts included.
    pub max_particles: usize,
    /// Cap on the batch created by `regenerate`.
    pub spawn_cap: usize,
    /// One particle per this many square pixels of surface.
    pub area_per_particle: f32,
    /// Particles appended per click (subject to `max_particles`).
    pub click_burst: usize,
    /// Distance within which the pointer influences particles.
    pub interaction_radius: f32,
    /// Distance within which two particles are joined by a line.
    pub connect_distance: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams {
            max_particles: 300,
            spawn_cap: 150,
            area_per_particle: 8000.0,
            click_burst: 5,
            interaction_radius: 200.0,
            connect_distance: 150.0,
        }
    }
}

impl FieldParams {
    pub fn from_args() -> FieldParams {
        FieldParams {
            max_particles: ARGS.max_particles,
            spawn_cap: ARGS.spawn_cap,
            area_per_particle: ARGS.area_per_particle,
            click_burst: ARGS.click_burst,
            interaction_radius: ARGS.interaction_radius,
            connect_distance: ARGS.connect_distance,
        }
    }
}

/// A line to draw between two nearby particles.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Srgba,
    pub width: f32,
}

/// The live animation state: the particle collection, the tracked pointer
/// position and the surface bounds. One instance is spawned on mount and
/// despawned on teardown; nothing here outlives it.
#[derive(Component)]
pub struct Field {
    pub particles: Vec<Particle>,
    pub pointer: Option<Vec2>,
    pub bounds: Vec2,
    pub params: FieldParams,
}

impl Field {
    pub fn new(params: FieldParams, bounds: Vec2) -> Field {
        Field {
            particles: Vec::with_capacity(params.max_particles),
            pointer: None,
            bounds,
            params,
        }
    }

    /// How many particles a fresh batch gets for the current surface area.
    pub fn target_count(&self) -> usize {
        let by_area = (self.bounds.x * self.bounds.y / self.params.area_per_particle) as usize;
        by_area.min(self.params.spawn_cap)
    }

    /// Throw away the whole collection and create a fresh batch sized to the
    /// surface.
    pub fn regenerate(&mut self, rng: &mut impl Rng) {
        let count = self.target_count();
        self.particles.clear();
        self.particles.extend((0..count).map(|_| Particle::random(self.bounds, rng)));
    }

    /// Adopt a new surface size. The collection is rebuilt, not rescaled.
    pub fn resize(&mut self, bounds: Vec2, rng: &mut impl Rng) {
        self.bounds = bounds;
        self.regenerate(rng);
    }

    /// Append up to `click_burst` particles at `pos`, never exceeding
    /// `max_particles`. Returns how many were actually added.
    pub fn click_burst(&mut self, pos: Vec2, rng: &mut impl Rng) -> usize {
        let room = self.params.max_particles.saturating_sub(self.particles.len());
        let count = self.params.click_burst.min(room);
        self.particles.extend((0..count).map(|_| Particle::at(pos, rng)));
        count
    }

    /// One frame of physics for every particle.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let pointer = self.pointer;
        let bounds = self.bounds;
        let interaction_radius = self.params.interaction_radius;
        for particle in &mut self.particles {
            particle.apply_pointer(pointer, interaction_radius);
            particle.integrate(bounds, rng);
        }
    }

    /// The connect phase: one segment per unordered pair of particles closer
    /// than `connect_distance`, faded with distance and highlighted near the
    /// pointer. The pairwise scan is the only O(n^2) work per frame, so it
    /// runs on the rayon pool.
    pub fn connections(&self) -> Vec<Segment> {
        let n = self.particles.len();
        (0..n)
            .into_par_iter()
            .flat_map_iter(|a| {
                (a + 1..n).filter_map(move |b| self.connection(a, b))
            })
            .collect()
    }

    fn connection(&self, a: usize, b: usize) -> Option<Segment> {
        let pa = self.particles[a].pos;
        let pb = self.particles[b].pos;
        let distance = pa.distance(pb);
        if distance >= self.params.connect_distance {
            return None;
        }

        let opacity = 1.0 - distance / self.params.connect_distance;
        let mut color = LINE_COLOR.with_alpha(opacity * LINE_COLOR.alpha);
        let mut width = 1.0;

        if let Some(pointer) = self.pointer {
            let midpoint = (pa + pb) / 2.0;
            let pointer_distance = pointer.distance(midpoint);
            if pointer_distance < self.params.interaction_radius {
                let highlight = 1.0 - pointer_distance / self.params.interaction_radius;
                color = LINE_HIGHLIGHT_COLOR
                    .with_alpha(((opacity + highlight * 0.5) * LINE_HIGHLIGHT_COLOR.alpha).min(1.0));
                width = 1.0 + highlight;
            }
        }

        Some(Segment { a: pa, b: pb, color, width })
    }
}

/// Mount: create the field sized to the primary window and give it its
/// first batch of particles.
pub fn mount(mut commands: Commands, window: Single<&Window, With<PrimaryWindow>>) {
    let bounds = Vec2::new(window.width(), window.height());
    let mut field = Field::new(FieldParams::from_args(), bounds);
    field.regenerate(&mut thread_rng());
    info!("field mounted: {} particles over {bounds:?}", field.particles.len());
    commands.spawn(field);
}

/// Teardown: remove the field and every entity the renderer created for it.
pub fn unmount(
    mut commands: Commands,
    fields: Query<Entity, With<Field>>,
    sprites: Query<
        Entity,
        Or<(
            With<crate::render::ParticleSprite>,
            With<crate::render::HaloSprite>,
            With<crate::render::LineSprite>,
        )>,
    >,
) {
    for entity in &fields {
        commands.entity(entity).despawn();
    }
    for entity in &sprites {
        commands.entity(entity).despawn();
    }
    debug!("field torn down");
}

/// Per-frame update, run while the animator is in the `Running` state.
pub fn step(mut field: Single<&mut Field>) {
    field.step(&mut thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(w: f32, h: f32) -> Field {
        Field::new(FieldParams::default(), Vec2::new(w, h))
    }

    #[test]
    fn regenerate_count_follows_surface_area() {
        let mut rng = StdRng::seed_from_u64(10);

        // 400x400 == 160_000 px^2 -> 20 particles.
        let mut small = field(400.0, 400.0);
        small.regenerate(&mut rng);
        assert_eq!(small.particles.len(), 20);

        // A large surface is capped at 150.
        let mut large = field(1920.0, 1080.0);
        large.regenerate(&mut rng);
        assert_eq!(large.particles.len(), 150);
    }

    #[test]
    fn resize_rebuilds_the_collection() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut f = field(400.0, 400.0);
        f.regenerate(&mut rng);
        assert_eq!(f.particles.len(), 20);

        f.resize(Vec2::new(800.0, 800.0), &mut rng);
        assert_eq!(f.particles.len(), 80);
        for p in &f.particles {
            assert!(p.pos.x <= 800.0 && p.pos.y <= 800.0);
        }
    }

    #[test]
    fn click_burst_respects_the_cap() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut f = field(1000.0, 1000.0);
        let at = Vec2::new(500.0, 500.0);

        assert_eq!(f.click_burst(at, &mut rng), 5);
        assert_eq!(f.particles.len(), 5);
        for p in &f.particles {
            assert_eq!(p.pos, at);
        }

        // Fill to 297, then a burst only has room for 3.
        while f.particles.len() < 297 {
            f.particles.push(Particle::random(f.bounds, &mut rng));
        }
        assert_eq!(f.click_burst(at, &mut rng), 3);
        assert_eq!(f.particles.len(), 300);

        // At the cap a click adds nothing.
        assert_eq!(f.click_burst(at, &mut rng), 0);
        assert_eq!(f.particles.len(), 300);
    }

    #[test]
    fn step_keeps_every_particle_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut f = field(300.0, 200.0);
        f.regenerate(&mut rng);
        f.pointer = Some(Vec2::new(150.0, 100.0));

        for _ in 0..500 {
            f.step(&mut rng);
            for p in &f.particles {
                assert!(p.pos.x >= 0.0 && p.pos.x <= 300.0);
                assert!(p.pos.y >= 0.0 && p.pos.y <= 200.0);
            }
        }
    }

    #[test]
    fn step_without_pointer_rests_at_base_values() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut f = field(1000.0, 1000.0);
        // Mid-field, slow: one step cannot reach an edge, so the base
        // velocity must come through untouched.
        let mut p = Particle::at(Vec2::new(500.0, 500.0), &mut rng);
        p.radius = p.base_radius * 2.0;
        p.glow = 0.3;
        f.particles.push(p);

        f.step(&mut rng);
        let p = &f.particles[0];
        assert_eq!(p.radius, p.base_radius);
        assert_eq!(p.color, p.base_color);
        assert_eq!(p.vel, p.base_vel);
        assert_eq!(p.glow, 0.0);
    }

    #[test]
    fn distant_pairs_are_not_connected() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut f = field(1000.0, 1000.0);
        f.particles.push(Particle::at(Vec2::new(100.0, 100.0), &mut rng));
        f.particles.push(Particle::at(Vec2::new(100.0, 250.0), &mut rng)); // exactly 150
        f.particles.push(Particle::at(Vec2::new(100.0, 600.0), &mut rng));
        assert!(f.connections().is_empty());
    }

    #[test]
    fn close_pairs_fade_with_distance() {
        let mut rng = StdRng::seed_from_u64(16);
        let mut f = field(1000.0, 1000.0);
        f.particles.push(Particle::at(Vec2::new(100.0, 100.0), &mut rng));
        f.particles.push(Particle::at(Vec2::new(100.0, 175.0), &mut rng)); // 75 == half

        let segments = f.connections();
        assert_eq!(segments.len(), 1);
        let segment = &segments[0];
        assert_eq!(segment.width, 1.0);
        assert!((segment.color.alpha - 0.25).abs() < 1e-5, "alpha {}", segment.color.alpha);
    }

    #[test]
    fn pointer_near_midpoint_brightens_and_thickens() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut f = field(1000.0, 1000.0);
        f.particles.push(Particle::at(Vec2::new(100.0, 100.0), &mut rng));
        f.particles.push(Particle::at(Vec2::new(100.0, 175.0), &mut rng));
        f.pointer = Some(Vec2::new(100.0, 137.5)); // exactly on the midpoint

        let segments = f.connections();
        assert_eq!(segments.len(), 1);
        let segment = &segments[0];
        assert_eq!(segment.width, 2.0);
        // opacity 0.5, highlight 1.0 -> (0.5 + 0.5) * 0.8
        assert!((segment.color.alpha - 0.8).abs() < 1e-5, "alpha {}", segment.color.alpha);
    }

    #[test]
    fn connection_count_matches_a_serial_scan() {
        let mut rng = StdRng::seed_from_u64(18);
        let mut f = field(600.0, 600.0);
        f.regenerate(&mut rng);

        let mut expected = 0;
        for a in 0..f.particles.len() {
            for b in a + 1..f.particles.len() {
                if f.particles[a].pos.distance(f.particles[b].pos) < 150.0 {
                    expected += 1;
                }
            }
        }
        assert_eq!(f.connections().len(), expected);
    }
}
