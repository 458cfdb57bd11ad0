use bevy::prelude::*;
use bevy::window::WindowResolution;

mod args;
mod field;
mod input;
mod keyboard;
mod palette;
mod particle;
mod render;

use crate::args::ARGS;

/// The animator is either running (field mounted, update and input systems
/// live) or stopped (everything torn down). Space toggles between the two.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    #[default]
    Running,
    Stopped,
}

fn main() {
    let (width, height) = ARGS.win;
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Particle field".into(),
                resolution: WindowResolution::new(width, height),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(palette::BACKDROP.into()))
        .init_state::<RunState>()
        .add_systems(Startup, render::setup)
        .add_systems(OnEnter(RunState::Running), field::mount)
        .add_systems(OnExit(RunState::Running), field::unmount)
        .add_systems(
            Update,
            (
                input::handle_resize,
                input::track_pointer,
                input::handle_click,
                field::step,
                render::sync_particles,
                render::sync_connections,
            )
                .chain()
                .run_if(in_state(RunState::Running)),
        )
        .add_systems(Update, (keyboard::handle_keypress, render::recenter_camera))
        .run();
}
