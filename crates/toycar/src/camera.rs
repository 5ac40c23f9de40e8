//! Orbit camera.
//!
//! The camera sits on a sphere around a target point. Left-drag orbits and
//! the scroll wheel zooms, with damped motion towards the requested pose.
//! Mouse control is off unless the app was launched with `--orbit`; the
//! camera still keeps looking at its target either way.

use bevy::{
    ecs::message::MessageReader,
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
};
use bevy_egui::EguiContexts;

use crate::launch_params::LaunchParams;

// ============================================================================
// Constants
// ============================================================================

/// Closest zoom distance.
const MIN_RADIUS: f32 = 1.0;
/// Furthest zoom distance (the fog ends at 100).
const MAX_RADIUS: f32 = 60.0;
/// Pitch limit, just short of straight up or down.
const MAX_PITCH: f32 = 1.55;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin for the orbit camera.
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitSettings>().add_systems(
            Update,
            (orbit_input.run_if(orbit_enabled), apply_orbit).chain(),
        );
    }
}

/// Run condition: mouse orbiting was enabled at launch.
fn orbit_enabled(params: Res<LaunchParams>) -> bool {
    params.orbit
}

// ============================================================================
// Components and settings
// ============================================================================

/// Settings for orbit control.
#[derive(Resource)]
pub struct OrbitSettings {
    /// Radians of orbit per pixel of mouse drag.
    pub rotate_sensitivity: f32,
    /// Zoom factor per scroll line.
    pub zoom_step: f32,
    /// Fraction of the remaining distance covered each frame.
    pub damping: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_step: 1.1,
            damping: 0.05,
        }
    }
}

/// Spherical camera pose around a target.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at.
    pub target: Vec3,
    /// Current yaw about +Y (0 looks from +Z).
    pub yaw: f32,
    /// Current elevation above the target's horizontal plane.
    pub pitch: f32,
    /// Current distance from the target.
    pub radius: f32,
    /// Yaw the camera is easing towards.
    pub goal_yaw: f32,
    /// Pitch the camera is easing towards.
    pub goal_pitch: f32,
    /// Radius the camera is easing towards.
    pub goal_radius: f32,
}

impl OrbitCamera {
    /// Orbit pose for a camera at `eye` looking at `target`.
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length().max(MIN_RADIUS);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            target,
            yaw,
            pitch,
            radius,
            goal_yaw: yaw,
            goal_pitch: pitch,
            goal_radius: radius,
        }
    }

    /// World position of the camera for the current pose.
    pub fn eye(&self) -> Vec3 {
        self.target + orbit_offset(self.yaw, self.pitch, self.radius)
    }

    /// Request a rotation by the given yaw/pitch deltas.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.goal_yaw += delta_yaw;
        self.goal_pitch = (self.goal_pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Request a zoom by a multiplicative factor.
    pub fn zoom(&mut self, factor: f32) {
        self.goal_radius = (self.goal_radius * factor).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    /// Move the current pose a fraction of the way towards the goal pose.
    pub fn step(&mut self, damping: f32) {
        let damping = damping.clamp(0.0, 1.0);
        self.yaw += (self.goal_yaw - self.yaw) * damping;
        self.pitch += (self.goal_pitch - self.pitch) * damping;
        self.radius += (self.goal_radius - self.radius) * damping;
    }
}

/// Offset from the target for a spherical pose.
pub fn orbit_offset(yaw: f32, pitch: f32, radius: f32) -> Vec3 {
    let horizontal = radius * pitch.cos();
    Vec3::new(horizontal * yaw.sin(), radius * pitch.sin(), horizontal * yaw.cos())
}

// ============================================================================
// Systems
// ============================================================================

/// Turn mouse drag and scroll into orbit goals.
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut scroll_events: MessageReader<MouseWheel>,
    settings: Res<OrbitSettings>,
    mut contexts: EguiContexts,
    mut query: Query<&mut OrbitCamera>,
) {
    // Ignore the mouse while it is over the HUD.
    let egui_wants_pointer = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());

    let mut drag = Vec2::ZERO;
    for event in mouse_motion.read() {
        drag += event.delta;
    }
    if !mouse.pressed(MouseButton::Left) || egui_wants_pointer {
        drag = Vec2::ZERO;
    }

    let mut scroll = 0.0;
    for event in scroll_events.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        scroll += match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
    }
    if egui_wants_pointer {
        scroll = 0.0;
    }

    if drag == Vec2::ZERO && scroll == 0.0 {
        return;
    }

    for mut orbit in &mut query {
        orbit.rotate(
            -drag.x * settings.rotate_sensitivity,
            drag.y * settings.rotate_sensitivity,
        );
        if scroll != 0.0 {
            // Scrolling up zooms in.
            orbit.zoom(settings.zoom_step.powf(-scroll));
        }
    }
}

/// Ease towards the goal pose and aim the camera at the target.
fn apply_orbit(settings: Res<OrbitSettings>, mut query: Query<(&mut OrbitCamera, &mut Transform)>) {
    for (mut orbit, mut transform) in &mut query {
        orbit.step(settings.damping);
        *transform = Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y);
    }
}
