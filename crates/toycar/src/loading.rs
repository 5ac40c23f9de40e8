//! Vehicle model load tracking.
//!
//! Follows the glTF through the asset server and exposes a floored
//! percentage for the loading overlay. A failed load is logged and treated as
//! finished so the scene keeps running without the vehicle.

use bevy::{
    asset::{LoadState, RecursiveDependencyLoadState, UntypedAssetId},
    gltf::Gltf,
    prelude::*,
};

/// Plugin for tracking the vehicle model load.
pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadProgress>().add_systems(
            Update,
            track_vehicle_load.run_if(resource_exists::<VehicleAsset>),
        );
    }
}

/// Handle to the vehicle glTF being loaded.
#[derive(Resource)]
pub struct VehicleAsset {
    /// The whole glTF document.
    pub gltf: Handle<Gltf>,
}

/// Where the vehicle load currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    /// Parts still arriving.
    Loading {
        /// Parts fully loaded.
        loaded: usize,
        /// Parts known so far.
        total: usize,
    },
    /// Everything loaded.
    Ready,
    /// The load failed; the scene continues without the vehicle.
    Failed,
}

/// Load progress resource read by the loading overlay.
#[derive(Resource, Debug)]
pub struct LoadProgress {
    phase: LoadPhase,
}

impl Default for LoadProgress {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Loading {
                loaded: 0,
                total: 0,
            },
        }
    }
}

impl LoadProgress {
    /// Current phase.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Whether loading has ended, successfully or not.
    pub fn is_finished(&self) -> bool {
        !matches!(self.phase, LoadPhase::Loading { .. })
    }

    /// Loaded share as a whole percentage, rounded down.
    pub fn percent(&self) -> u32 {
        match self.phase {
            LoadPhase::Loading { total: 0, .. } => 0,
            LoadPhase::Loading { loaded, total } => {
                let loaded = loaded.min(total);
                u32::try_from(loaded * 100 / total).unwrap_or(100)
            }
            LoadPhase::Ready | LoadPhase::Failed => 100,
        }
    }

    /// Record how many parts have loaded.
    pub fn update(&mut self, loaded: usize, total: usize) {
        if !self.is_finished() {
            self.phase = LoadPhase::Loading { loaded, total };
        }
    }

    /// Mark the load as complete.
    pub fn finish(&mut self) {
        self.phase = LoadPhase::Ready;
    }

    /// Mark the load as failed.
    pub fn fail(&mut self) {
        self.phase = LoadPhase::Failed;
    }
}

/// Poll the asset server for the vehicle glTF and its parts.
fn track_vehicle_load(
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    vehicle_asset: Res<VehicleAsset>,
    mut progress: ResMut<LoadProgress>,
) {
    if progress.is_finished() {
        return;
    }

    let id = vehicle_asset.gltf.id();
    if let LoadState::Failed(err) = asset_server.load_state(id) {
        tracing::warn!("Vehicle model failed to load, continuing without it: {err}");
        progress.fail();
        return;
    }
    if let RecursiveDependencyLoadState::Failed(err) =
        asset_server.recursive_dependency_load_state(id)
    {
        tracing::warn!("Vehicle model dependency failed to load: {err}");
        progress.fail();
        return;
    }

    // The document itself counts as one part; its meshes and materials are
    // only known once it has been parsed.
    let Some(gltf) = gltfs.get(id) else {
        progress.update(0, 1);
        return;
    };

    let parts: Vec<UntypedAssetId> = gltf
        .meshes
        .iter()
        .map(|handle| handle.id().untyped())
        .chain(gltf.materials.iter().map(|handle| handle.id().untyped()))
        .collect();
    let loaded = parts
        .iter()
        .filter(|part| asset_server.is_loaded_with_dependencies(**part))
        .count();
    progress.update(loaded + 1, parts.len() + 1);

    if asset_server.is_loaded_with_dependencies(id) {
        tracing::info!(
            "Vehicle model loaded ({} meshes, {} materials)",
            gltf.meshes.len(),
            gltf.materials.len()
        );
        progress.finish();
    }
}
