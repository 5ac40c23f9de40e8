//! Wheel rig: named lookup of the wheels inside the vehicle model.
//!
//! The vehicle glTF is walked once when its scene instance is ready. Nodes are
//! classified by name into spinning wheels and steering hubs, and the result
//! is stored on the vehicle as a [`WheelRig`].

use std::f32::consts::TAU;

use bevy::{prelude::*, scene::SceneInstanceReady};
use toycar_core::WheelFeedback;

use super::Vehicle;

// ============================================================================
// Naming rule
// ============================================================================

/// Keywords used to recognise wheel parts by node name (case-insensitive).
#[derive(Resource, Clone, Debug)]
pub struct WheelNaming {
    /// A node whose name contains any of these spins.
    pub spin: Vec<String>,
    /// A node whose name contains any of these steers.
    pub steer: Vec<String>,
    /// A spinning node whose name also contains any of these steers too.
    pub front: Vec<String>,
}

impl Default for WheelNaming {
    fn default() -> Self {
        Self {
            spin: vec!["wheel".into(), "tire".into(), "tyre".into()],
            steer: vec!["steer".into()],
            front: vec!["front".into()],
        }
    }
}

/// What a rig part does with the wheel feedback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WheelRole {
    /// Rolls about its local X axis with speed.
    pub spins: bool,
    /// Yaws about its local Y axis with the turn rate.
    pub steers: bool,
}

impl WheelRole {
    /// Whether the part reacts to feedback at all.
    pub fn is_part(self) -> bool {
        self.spins || self.steers
    }
}

/// Classify a node by name.
pub fn classify_part(name: &str, naming: &WheelNaming) -> WheelRole {
    let name = name.to_lowercase();
    let contains_any = |keywords: &[String]| {
        keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && name.contains(&keyword.to_lowercase()))
    };

    let spins = contains_any(&naming.spin);
    let steers = contains_any(&naming.steer) || (spins && contains_any(&naming.front));
    WheelRole { spins, steers }
}

/// Find the rig parts below `root`.
///
/// A spinning part is taken whole: its descendants are not searched, since
/// rotating a child under a rotated parent would apply the motion twice. A
/// steer-only hub is kept and its descendants are still searched for wheels.
pub fn resolve_parts(
    root: Entity,
    naming: &WheelNaming,
    children_of: impl Fn(Entity) -> Vec<Entity>,
    name_of: impl Fn(Entity) -> Option<String>,
) -> Vec<(Entity, WheelRole)> {
    let mut parts = Vec::new();
    let mut stack = children_of(root);
    stack.reverse();

    while let Some(entity) = stack.pop() {
        let role = name_of(entity)
            .map(|name| classify_part(&name, naming))
            .unwrap_or_default();
        if role.is_part() {
            parts.push((entity, role));
        }
        if !role.spins {
            let mut children = children_of(entity);
            children.reverse();
            stack.extend(children);
        }
    }

    parts
}

// ============================================================================
// Components
// ============================================================================

/// A wheel part driven by the motion feedback.
#[derive(Component, Clone, Debug)]
pub struct RigPart {
    /// How the part moves.
    pub role: WheelRole,
    /// Rotation authored in the model.
    pub rest: Quat,
    /// Accumulated roll, in `[0, 2π)`.
    pub spin: f32,
}

impl RigPart {
    /// Advance the part by one tick of feedback and return its new rotation.
    pub fn advance(&mut self, feedback: &WheelFeedback) -> Quat {
        if self.role.spins {
            self.spin = (self.spin + feedback.spin_delta as f32).rem_euclid(TAU);
        }
        let steer = if self.role.steers {
            feedback.steer_angle as f32
        } else {
            0.0
        };
        part_rotation(self.rest, self.role, self.spin, steer)
    }
}

/// The wheel parts of a vehicle, resolved once from its model.
#[derive(Component, Clone, Debug, Default)]
pub struct WheelRig {
    pub parts: Vec<Entity>,
}

/// Rotation of a part: steer about Y first, then roll about the axle.
pub fn part_rotation(rest: Quat, role: WheelRole, spin: f32, steer: f32) -> Quat {
    let steer = if role.steers { steer } else { 0.0 };
    let spin = if role.spins { spin } else { 0.0 };
    rest * Quat::from_rotation_y(steer) * Quat::from_rotation_x(spin)
}

// ============================================================================
// Observer
// ============================================================================

/// Build the wheel rig once the vehicle model has been instantiated.
pub(super) fn on_vehicle_scene_ready(
    trigger: On<SceneInstanceReady>,
    mut commands: Commands,
    naming: Res<WheelNaming>,
    vehicles: Query<(), With<Vehicle>>,
    children: Query<&Children>,
    names: Query<&Name>,
    transforms: Query<&Transform>,
) {
    let root = trigger.event_target();
    if !vehicles.contains(root) {
        return;
    }

    let parts = resolve_parts(
        root,
        &naming,
        |entity| {
            children
                .get(entity)
                .map(|c| c.iter().collect())
                .unwrap_or_default()
        },
        |entity| names.get(entity).ok().map(|name| name.as_str().to_owned()),
    );

    if parts.is_empty() {
        tracing::warn!("Vehicle model has no parts matching the wheel naming rule");
    } else {
        tracing::info!(
            "Vehicle ready: {} spinning, {} steering parts",
            parts.iter().filter(|(_, role)| role.spins).count(),
            parts.iter().filter(|(_, role)| role.steers).count()
        );
    }

    let mut rig = WheelRig::default();
    for (entity, role) in parts {
        let rest = transforms
            .get(entity)
            .map(|transform| transform.rotation)
            .unwrap_or_default();
        commands.entity(entity).insert(RigPart {
            role,
            rest,
            spin: 0.0,
        });
        rig.parts.push(entity);
    }
    commands.entity(root).insert(rig);
}
