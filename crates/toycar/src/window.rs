//! Window behaviour: double-click fullscreen and the pixel ratio cap.

use std::time::Duration;

use bevy::{
    prelude::*,
    window::{MonitorSelection, PrimaryWindow, WindowMode},
};
use bevy_egui::EguiContexts;
use web_time::Instant;

/// Highest device pixel ratio the renderer uses.
const MAX_SCALE_FACTOR: f32 = 2.0;

/// Two clicks closer together than this count as a double-click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Plugin for window-level controls.
pub struct WindowControlPlugin;

impl Plugin for WindowControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DoubleClickDetector>()
            .add_systems(Update, (toggle_fullscreen, cap_pixel_ratio));
    }
}

/// Detects double-clicks from a stream of click instants.
#[derive(Resource, Default, Debug)]
pub struct DoubleClickDetector {
    last_click: Option<Instant>,
}

impl DoubleClickDetector {
    /// Register a click. Returns `true` when it completes a double-click.
    ///
    /// A third quick click starts a new pair rather than firing again.
    pub fn register(&mut self, now: Instant) -> bool {
        match self.last_click.take() {
            Some(previous) if now.saturating_duration_since(previous) <= DOUBLE_CLICK_WINDOW => {
                true
            }
            _ => {
                self.last_click = Some(now);
                false
            }
        }
    }
}

/// The window mode a fullscreen toggle switches to.
pub fn toggled_mode(mode: WindowMode) -> WindowMode {
    match mode {
        WindowMode::Windowed => WindowMode::BorderlessFullscreen(MonitorSelection::Current),
        _ => WindowMode::Windowed,
    }
}

/// Scale factor override needed to keep the pixel ratio at or below the cap,
/// or `None` when the native ratio is already within it.
pub fn capped_scale_factor(base: f32) -> Option<f32> {
    (base > MAX_SCALE_FACTOR).then_some(MAX_SCALE_FACTOR)
}

fn toggle_fullscreen(
    mouse: Res<ButtonInput<MouseButton>>,
    mut detector: ResMut<DoubleClickDetector>,
    mut contexts: EguiContexts,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    // Clicks on the arrow pad are not fullscreen requests.
    if contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area())
    {
        return;
    }

    if detector.register(Instant::now()) {
        window.mode = toggled_mode(window.mode);
        tracing::info!("Window mode set to {:?}", window.mode);
    }
}

fn cap_pixel_ratio(mut windows: Query<&mut Window, (With<PrimaryWindow>, Changed<Window>)>) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    let wanted = capped_scale_factor(window.resolution.base_scale_factor());
    if window.resolution.scale_factor_override() != wanted {
        tracing::debug!("Scale factor override: {wanted:?}");
        window.resolution.set_scale_factor_override(wanted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_click_within_window() {
        let mut detector = DoubleClickDetector::default();
        let start = Instant::now();
        assert!(!detector.register(start));
        assert!(detector.register(start + Duration::from_millis(200)));
        // The pair is consumed.
        assert!(!detector.register(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_slow_clicks_are_not_double() {
        let mut detector = DoubleClickDetector::default();
        let start = Instant::now();
        assert!(!detector.register(start));
        assert!(!detector.register(start + Duration::from_millis(900)));
        assert!(detector.register(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_toggled_mode() {
        assert_eq!(
            toggled_mode(WindowMode::Windowed),
            WindowMode::BorderlessFullscreen(MonitorSelection::Current)
        );
        assert_eq!(
            toggled_mode(WindowMode::BorderlessFullscreen(MonitorSelection::Current)),
            WindowMode::Windowed
        );
    }

    #[test]
    fn test_pixel_ratio_cap() {
        assert_eq!(capped_scale_factor(1.0), None);
        assert_eq!(capped_scale_factor(2.0), None);
        assert_eq!(capped_scale_factor(3.0), Some(2.0));
    }
}
