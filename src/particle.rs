use bevy::color::Srgba;
use bevy::math::Vec2;
use rand::Rng;

use crate::palette::random_particle_color;

/// A single animated point. Plain data; all behavior lives in the step
/// functions below and in [`crate::field::Field`].
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub radius: f32,
    pub base_radius: f32,
    /// Initialized but not yet consumed by the update rule.
    pub density: f32,
    pub vel: Vec2,
    pub base_vel: Vec2,
    pub color: Srgba,
    pub base_color: Srgba,
    /// 0 == no glow; scales the halo drawn behind the particle.
    pub glow: f32,
}

impl Particle {
    /// A particle at a random position inside `bounds`.
    pub fn random(bounds: Vec2, rng: &mut impl Rng) -> Particle {
        let pos = Vec2::new(rng.gen_range(0.0..bounds.x), rng.gen_range(0.0..bounds.y));
        Particle::at(pos, rng)
    }

    /// A particle at an exact position (click bursts).
    pub fn at(pos: Vec2, rng: &mut impl Rng) -> Particle {
        let radius = rng.gen_range(0.5..3.5);
        let vel = Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
        let color = random_particle_color(rng);
        Particle {
            pos,
            radius,
            base_radius: radius,
            density: rng.gen_range(1.0..31.0),
            vel,
            base_vel: vel,
            color,
            base_color: color,
            glow: 0.0,
        }
    }

    /// Pull radius, glow, color alpha and velocity toward the pointer when it
    /// is within `interaction_radius`; otherwise snap everything back to the
    /// base values. No easing in either direction.
    pub fn apply_pointer(&mut self, pointer: Option<Vec2>, interaction_radius: f32) {
        let force = pointer.and_then(|p| {
            let offset = p - self.pos;
            let distance = offset.length();
            if distance < interaction_radius {
                let direction = if distance > 0.0 { offset / distance } else { Vec2::Y };
                Some((direction, (interaction_radius - distance) / interaction_radius))
            } else {
                None
            }
        });

        match force {
            Some((direction, force)) => {
                self.glow = force * 0.5;
                self.radius = self.base_radius * (1.0 + force * 0.5);
                self.color.alpha = (self.base_color.alpha + force * 0.3).min(1.0);
                self.vel = self.base_vel + direction * force * 2.0;
            }
            None => {
                self.glow = 0.0;
                self.radius = self.base_radius;
                self.color = self.base_color;
                self.vel = self.base_vel;
            }
        }
    }

    /// Advance one frame and bounce off the edges of `bounds`. A bounce
    /// reflects the velocity component scaled by a random factor in
    /// [0.9, 1.1) and keeps it as the new resting velocity.
    pub fn integrate(&mut self, bounds: Vec2, rng: &mut impl Rng) {
        self.pos += self.vel;

        if self.pos.x < 0.0 || self.pos.x > bounds.x {
            self.vel.x = -self.vel.x * rng.gen_range(0.9..1.1);
            self.base_vel.x = self.vel.x;
        }
        if self.pos.y < 0.0 || self.pos.y > bounds.y {
            self.vel.y = -self.vel.y * rng.gen_range(0.9..1.1);
            self.base_vel.y = self.vel.y;
        }

        self.pos = self.pos.clamp(Vec2::ZERO, bounds);
    }
}
