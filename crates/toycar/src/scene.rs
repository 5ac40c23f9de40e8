//! Static scene: sky, fog, ground, lights and the camera.

use bevy::{
    light::light_consts::lux,
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
};

use crate::camera::OrbitCamera;

/// Sky and fog colour (#b2f8ec).
pub const SKY_COLOR: Color = Color::srgb(0.698, 0.973, 0.925);

/// Ground colour (#5cc75e).
const GROUND_COLOR: Color = Color::srgb(0.361, 0.780, 0.369);

/// Height of the ground plane; the vehicle sits on it.
pub const GROUND_LEVEL: f32 = -2.0;

/// Side length of the square ground plane.
const GROUND_SIZE: f32 = 500.0;

/// Where the camera starts, looking at the origin.
const CAMERA_START: Vec3 = Vec3::new(2.0, 1.0, 5.0);

/// Plugin for the static scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .add_systems(Startup, setup_scene);
    }
}

/// Set up the ground, lights and camera.
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: GROUND_COLOR,
            unlit: true,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_LEVEL, 0.0),
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: Color::WHITE,
            illuminance: lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(3.0, 5.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 55.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking_from(CAMERA_START, Vec3::ZERO),
        DistanceFog {
            color: SKY_COLOR,
            falloff: FogFalloff::Linear {
                start: 1.0,
                end: 100.0,
            },
            ..default()
        },
        AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
            ..default()
        },
    ));

    tracing::info!("Scene setup complete - use arrow keys or WASD to drive");
}
