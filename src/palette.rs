use bevy::color::Srgba;
use rand::Rng;

/// Base colors a particle can be born with. All carry the same resting alpha;
/// proximity to the pointer only ever raises it.
pub const PARTICLE_COLORS: [Srgba; 4] = [
    Srgba::new(0.231, 0.510, 0.965, 0.7), // blue
    Srgba::new(0.545, 0.361, 0.965, 0.7), // purple
    Srgba::new(0.063, 0.725, 0.506, 0.7), // green
    Srgba::new(0.388, 0.400, 0.945, 0.7), // indigo
];

/// Connection lines are always indigo...
pub const LINE_COLOR: Srgba = Srgba::new(0.388, 0.400, 0.945, 0.5);

/// ...unless the pointer is near, which shifts them purple.
pub const LINE_HIGHLIGHT_COLOR: Srgba = Srgba::new(0.545, 0.361, 0.965, 0.8);

/// Near-black backdrop behind everything.
pub const BACKDROP: Srgba = Srgba::new(0.01, 0.015, 0.03, 1.0);

pub fn random_particle_color(rng: &mut impl Rng) -> Srgba {
    PARTICLE_COLORS[rng.gen_range(0..PARTICLE_COLORS.len())]
}
