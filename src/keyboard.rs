use bevy::app::AppExit;
use bevy::input::ButtonInput;
use bevy::prelude::*;
use rand::thread_rng;

use crate::field::Field;
use crate::RunState;

pub fn handle_keypress(
    kb: Res<ButtonInput<KeyCode>>,
    state: Res<State<RunState>>,
    mut next_state: ResMut<NextState<RunState>>,
    mut app_exit: EventWriter<AppExit>,
    mut field: Query<&mut Field>,
) {
    // Esc / Q: quit the app
    if kb.pressed(KeyCode::Escape) || kb.pressed(KeyCode::KeyQ) {
        app_exit.write(AppExit::Success);
    }

    // Space: stop / restart the animator. Stopping tears the whole field
    // down; restarting mounts a fresh one.
    if kb.just_pressed(KeyCode::Space) {
        let target = match state.get() {
            RunState::Running => RunState::Stopped,
            RunState::Stopped => RunState::Running,
        };
        info!("animator -> {target:?}");
        next_state.set(target);
    }

    // R: throw the particles away and start over.
    if kb.just_pressed(KeyCode::KeyR) {
        if let Ok(mut field) = field.single_mut() {
            field.regenerate(&mut thread_rng());
            info!("field reset: {} particles", field.particles.len());
        }
    }
}
