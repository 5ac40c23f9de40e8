//! A small 3D driving toy using Bevy.
//!
//! One glTF vehicle on a flat ground plane, driven with the arrow keys, WASD
//! or an on-screen arrow pad. The motion model lives in `toycar-core`; this
//! crate owns the scene, input gathering and the HUD.

mod camera;
mod input;
mod launch_params;
mod loading;
mod scene;
mod ui;
mod vehicle;
mod window;

use bevy::prelude::*;
use camera::CameraControllerPlugin;
use input::InputPlugin;
use loading::LoadingPlugin;
use scene::ScenePlugin;
use ui::HudPlugin;
use vehicle::VehiclePlugin;
use window::WindowControlPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ScenePlugin,
            InputPlugin,
            LoadingPlugin,
            VehiclePlugin,
            CameraControllerPlugin,
            WindowControlPlugin,
            HudPlugin,
        ));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let launch_params = launch_params::parse();
    tracing::info!(
        "Starting with max speed {} and {:?} steering",
        launch_params.motion.max_speed,
        launch_params.motion.steering
    );

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "toycar".to_string(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(launch_params)
        .add_plugins(AppPlugin)
        .run();
}
