use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, WindowResized};
use rand::thread_rng;

use crate::field::Field;

/// Keep the field's pointer in sync with the cursor. Cursor positions arrive
/// in window-local logical pixels, origin top-left, which is the space the
/// field simulates in.
pub fn track_pointer(
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    mut field: Single<&mut Field>,
) {
    for event in moved.read() {
        field.pointer = Some(event.position);
    }
    if left.read().next().is_some() {
        field.pointer = None;
    }
}

/// A resize throws the whole collection away and rebuilds it for the new
/// surface.
pub fn handle_resize(mut resized: EventReader<WindowResized>, mut field: Single<&mut Field>) {
    let Some(event) = resized.read().last() else {
        return;
    };
    field.resize(Vec2::new(event.width, event.height), &mut thread_rng());
    info!(
        "surface resized to {}x{}; regenerated {} particles",
        event.width,
        event.height,
        field.particles.len()
    );
}

/// A left click injects a burst of particles at the tracked pointer position.
pub fn handle_click(buttons: Res<ButtonInput<MouseButton>>, mut field: Single<&mut Field>) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(at) = field.pointer else {
        return;
    };
    let added = field.click_burst(at, &mut thread_rng());
    debug!("click at {at:?} added {added} particles ({} total)", field.particles.len());
}
