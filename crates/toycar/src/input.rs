//! Keyboard input and the shared control state.
//!
//! Keyboard bindings are declared with `leafwing-input-manager`. Press and
//! release edges of every bound key are folded into the [`HeldControls`]
//! resource, which the on-screen pad in [`crate::ui`] also writes to. The
//! motion system only ever reads [`HeldControls`].

use bevy::{prelude::*, window::PrimaryWindow};
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};
use toycar_core::{Control, ControlState};

use crate::ui::OnScreenPad;

// ============================================================================
// Actions
// ============================================================================

/// Driving actions bound to keys.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Arrow up / W.
    Forward,
    /// Arrow down / S.
    Back,
    /// Arrow left / A.
    Left,
    /// Arrow right / D.
    Right,
}

impl DriveAction {
    const ALL: [DriveAction; 4] = [
        DriveAction::Forward,
        DriveAction::Back,
        DriveAction::Left,
        DriveAction::Right,
    ];

    /// The logical control this action drives.
    pub fn control(self) -> Control {
        match self {
            DriveAction::Forward => Control::Forward,
            DriveAction::Back => Control::Back,
            DriveAction::Left => Control::Left,
            DriveAction::Right => Control::Right,
        }
    }
}

/// Create the default input map for driving.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Forward, KeyCode::ArrowUp)
        .with(DriveAction::Forward, KeyCode::KeyW)
        .with(DriveAction::Back, KeyCode::ArrowDown)
        .with(DriveAction::Back, KeyCode::KeyS)
        .with(DriveAction::Left, KeyCode::ArrowLeft)
        .with(DriveAction::Left, KeyCode::KeyA)
        .with(DriveAction::Right, KeyCode::ArrowRight)
        .with(DriveAction::Right, KeyCode::KeyD)
}

// ============================================================================
// Control state
// ============================================================================

/// The controls currently held by any input source.
#[derive(Resource, Default, Debug)]
pub struct HeldControls(pub ControlState);

impl HeldControls {
    /// Press a control, logging the edge.
    pub fn press(&mut self, control: Control) {
        if self.0.activate(control) {
            tracing::debug!("Control {control} pressed");
        }
    }

    /// Release a control, logging the edge.
    pub fn release(&mut self, control: Control) {
        if self.0.deactivate(control) {
            tracing::debug!("Control {control} released");
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers the driving actions and gathers key edges.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .init_resource::<HeldControls>()
            .add_systems(Startup, spawn_driver_input)
            .add_systems(
                PreUpdate,
                (gather_key_edges, release_on_focus_loss)
                    .chain()
                    .after(InputManagerSystem::Update),
            );
    }
}

fn spawn_driver_input(mut commands: Commands) {
    commands.spawn((
        Name::new("Driver input"),
        default_drive_input_map(),
        ActionState::<DriveAction>::default(),
    ));
}

/// Fold key press/release edges into the held control set.
fn gather_key_edges(
    action_query: Query<&ActionState<DriveAction>>,
    mut held: ResMut<HeldControls>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    for action in DriveAction::ALL {
        if action_state.just_pressed(&action) {
            held.press(action.control());
        }
        if action_state.just_released(&action) {
            held.release(action.control());
        }
    }
}

/// Drop every held control when the window loses focus, so keys released
/// elsewhere do not stay stuck.
fn release_on_focus_loss(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut held: ResMut<HeldControls>,
    pad: Option<ResMut<OnScreenPad>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    if !window.focused {
        release_all(&mut held, pad.map(ResMut::into_inner));
    }
}

/// Release every held control and forget the pad's buttons, so a button
/// still down when focus returns presses again.
fn release_all(held: &mut HeldControls, pad: Option<&mut OnScreenPad>) {
    if let Some(pad) = pad {
        pad.reset();
    }
    if held.0.is_empty() {
        return;
    }
    let released: Vec<&str> = held.0.iter().map(Control::name).collect();
    tracing::debug!("Window lost focus, releasing {}", released.join(", "));
    held.0.clear();
}
