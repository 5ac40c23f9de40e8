//! The driven vehicle.
//!
//! Spawns the vehicle model, advances the motion model once per frame from the
//! held controls, and copies the result onto the vehicle transform and its
//! wheel rig.

mod rig;

use bevy::prelude::*;
use toycar_core::{
    VehicleKinematics,
    telemetry::{
        FileTelemetryOutput, TELEMETRY_PATH, TelemetryOutput, TelemetrySnapshot,
        emit_telemetry_to, reset_telemetry_to,
    },
    tick, wheel_feedback,
};

use rig::{RigPart, WheelNaming, WheelRig};

use crate::{
    input::HeldControls,
    launch_params::LaunchParams,
    loading::{LoadPhase, LoadProgress, VehicleAsset},
    scene::GROUND_LEVEL,
};

/// Uniform scale applied to the vehicle model.
const VEHICLE_SCALE: f32 = 0.7;

/// Plugin for the driven vehicle.
pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WheelNaming>()
            .init_resource::<TelemetrySink>()
            .add_systems(Startup, (spawn_vehicle, open_telemetry))
            .add_systems(Update, drive_vehicle.run_if(vehicle_loaded))
            .add_observer(rig::on_vehicle_scene_ready);
    }
}

/// Motion state of the driven vehicle.
#[derive(Component, Debug, Default)]
pub struct Vehicle {
    /// Kinematics after the most recent tick.
    pub kinematics: VehicleKinematics,
    /// Ticks run so far.
    pub ticks: u64,
}

/// Where per-tick telemetry goes, if anywhere.
#[derive(Resource, Default)]
pub struct TelemetrySink(pub Option<Box<dyn TelemetryOutput>>);

fn spawn_vehicle(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    launch_params: Res<LaunchParams>,
) {
    let path = launch_params.model_path.clone();
    tracing::info!("Loading vehicle model {path}");

    commands.insert_resource(VehicleAsset {
        gltf: asset_server.load(path.clone()),
    });
    commands.spawn((
        Name::new("Vehicle"),
        Vehicle::default(),
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path))),
        Transform::from_xyz(0.0, GROUND_LEVEL, 0.0).with_scale(Vec3::splat(VEHICLE_SCALE)),
    ));
}

fn open_telemetry(launch_params: Res<LaunchParams>, mut sink: ResMut<TelemetrySink>) {
    if !launch_params.telemetry {
        return;
    }
    let mut output = FileTelemetryOutput::default();
    reset_telemetry_to(&mut output);
    sink.0 = Some(Box::new(output));
    tracing::info!("Writing telemetry to {}", TELEMETRY_PATH);
}

/// Run condition: the vehicle model has finished loading.
///
/// The kinematics start from zero once the car exists; input held while
/// loading, or after a failed load, does not move it.
fn vehicle_loaded(progress: Res<LoadProgress>) -> bool {
    progress.phase() == LoadPhase::Ready
}

/// Run one motion tick and apply it to the vehicle and its wheels.
fn drive_vehicle(
    launch_params: Res<LaunchParams>,
    held: Res<HeldControls>,
    mut sink: ResMut<TelemetrySink>,
    mut vehicles: Query<(&mut Vehicle, &mut Transform, Option<&WheelRig>)>,
    mut parts: Query<(&mut RigPart, &mut Transform), Without<Vehicle>>,
) {
    let params = &launch_params.motion;

    for (mut vehicle, mut transform, rig) in &mut vehicles {
        let kinematics = tick(params, &held.0, &vehicle.kinematics);
        let feedback = wheel_feedback(params, &kinematics);
        vehicle.kinematics = kinematics;
        vehicle.ticks += 1;

        transform.translation = Vec3::new(
            kinematics.position.x as f32,
            GROUND_LEVEL,
            kinematics.position.y as f32,
        );
        transform.rotation = Quat::from_rotation_y(kinematics.heading as f32);

        if let Some(rig) = rig {
            let mut iter = parts.iter_many_mut(&rig.parts);
            while let Some((mut part, mut part_transform)) = iter.fetch_next() {
                part_transform.rotation = part.advance(&feedback);
            }
        }

        if let Some(output) = sink.0.as_deref_mut() {
            emit_telemetry_to(
                &TelemetrySnapshot {
                    tick: vehicle.ticks,
                    controls: held.0,
                    kinematics,
                    feedback,
                },
                output,
            );
        }
    }
}
