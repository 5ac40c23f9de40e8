//! HUD overlay: loading progress, the on-screen arrow pad and a readout.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use toycar_core::{Control, ControlState};

use crate::{
    input::HeldControls,
    loading::{LoadPhase, LoadProgress},
    vehicle::Vehicle,
};

/// Side length of an arrow pad button, in points.
const PAD_BUTTON_SIZE: f32 = 48.0;

/// Plugin for the HUD overlay.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<OnScreenPad>()
            .add_systems(
                EguiPrimaryContextPass,
                (
                    loading_overlay.run_if(|progress: Res<LoadProgress>| !progress.is_finished()),
                    arrow_pad,
                    readout,
                ),
            );
    }
}

/// The arrow pad's held buttons as of the previous frame.
#[derive(Resource, Default, Debug)]
pub struct OnScreenPad {
    prev: ControlState,
}

impl OnScreenPad {
    /// Turn the pad's current button state into press/release edges.
    pub fn apply(&mut self, now: ControlState, held: &mut HeldControls) {
        for control in Control::ALL {
            match (self.prev.is_active(control), now.is_active(control)) {
                (false, true) => held.press(control),
                (true, false) => held.release(control),
                _ => {}
            }
        }
        self.prev = now;
    }

    /// Forget which buttons were down.
    pub fn reset(&mut self) {
        self.prev = ControlState::new();
    }
}

fn loading_overlay(mut contexts: EguiContexts, progress: Res<LoadProgress>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("loading_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.heading(format!("Loading… {}%", progress.percent()));
            });
        });
}

fn arrow_pad(
    mut contexts: EguiContexts,
    mut pad: ResMut<OnScreenPad>,
    mut held: ResMut<HeldControls>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut now = ControlState::new();
    egui::Area::new(egui::Id::new("arrow_pad"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
        .show(ctx, |ui| {
            egui::Grid::new("arrow_pad_grid")
                .spacing([4.0, 4.0])
                .show(ui, |ui| {
                    ui.label("");
                    pad_button(ui, "⬆", Control::Forward, &mut now);
                    ui.label("");
                    ui.end_row();

                    pad_button(ui, "⬅", Control::Left, &mut now);
                    pad_button(ui, "⬇", Control::Back, &mut now);
                    pad_button(ui, "➡", Control::Right, &mut now);
                    ui.end_row();
                });
        });

    pad.apply(now, &mut held);
}

/// One pad button; held while a pointer or touch is down on it.
fn pad_button(ui: &mut egui::Ui, glyph: &str, control: Control, now: &mut ControlState) {
    let response = ui.add_sized(
        [PAD_BUTTON_SIZE, PAD_BUTTON_SIZE],
        egui::Button::new(egui::RichText::new(glyph).size(24.0)),
    );
    if response.is_pointer_button_down_on() {
        now.activate(control);
    }
}

fn readout(mut contexts: EguiContexts, progress: Res<LoadProgress>, vehicles: Query<&Vehicle>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let Ok(vehicle) = vehicles.single() else {
        return;
    };

    let kinematics = &vehicle.kinematics;
    egui::Area::new(egui::Id::new("readout"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.monospace(format!("Speed:   {:+.3}", kinematics.speed));
                ui.monospace(format!("Heading: {:.1}°", kinematics.heading.to_degrees()));
                if progress.phase() == LoadPhase::Failed {
                    ui.colored_label(egui::Color32::LIGHT_RED, "Vehicle model unavailable");
                }
            });
        });
}
