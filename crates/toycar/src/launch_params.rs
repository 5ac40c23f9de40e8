//! Launch parameter parsing.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use toycar_core::MotionParams;

/// Default vehicle model, relative to the asset folder.
pub const DEFAULT_MODEL: &str = "models/car.gltf";

/// Launch parameters for the application.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Motion model constants in effect for this session.
    pub motion: MotionParams,
    /// Path of the vehicle glTF, relative to the asset folder.
    pub model_path: String,
    /// Whether the orbit camera responds to the mouse.
    pub orbit: bool,
    /// Whether per-tick telemetry is written to `telemetry.csv`.
    pub telemetry: bool,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            motion: MotionParams::default(),
            model_path: DEFAULT_MODEL.to_string(),
            orbit: false,
            telemetry: false,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use toycar_core::{Profile, SteeringPolicy};

    use super::*;

    #[derive(Parser, Debug)]
    #[command(about = "A small 3D driving toy")]
    pub(super) struct CliArgs {
        /// Motion profile.
        #[arg(long, value_enum, default_value_t = Profile::default())]
        pub profile: Profile,

        /// Turn-rate to heading policy (overrides the params file).
        #[arg(long, value_enum)]
        pub steering: Option<SteeringPolicy>,

        /// TOML file overriding individual motion parameters.
        #[arg(long)]
        pub params: Option<PathBuf>,

        /// Vehicle glTF path, relative to the asset folder.
        #[arg(long, default_value = DEFAULT_MODEL)]
        pub model: String,

        /// Enable mouse orbit controls for the camera.
        #[arg(long)]
        pub orbit: bool,

        /// Write per-tick telemetry to telemetry.csv.
        #[arg(long)]
        pub telemetry: bool,
    }

    impl From<CliArgs> for LaunchParams {
        fn from(args: CliArgs) -> Self {
            LaunchParams {
                motion: args.profile.resolve(args.params.as_deref(), args.steering),
                model_path: args.model,
                orbit: args.orbit,
                telemetry: args.telemetry,
            }
        }
    }

    pub fn parse() -> LaunchParams {
        CliArgs::parse().into()
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use clap::Parser;
    use toycar_core::{MotionParams, SteeringPolicy};

    use super::{LaunchParams, native::CliArgs};

    fn parse_from(args: &[&str]) -> LaunchParams {
        CliArgs::try_parse_from(std::iter::once("toycar").chain(args.iter().copied()))
            .unwrap()
            .into()
    }

    #[test]
    fn test_defaults() {
        let params = parse_from(&[]);
        assert_eq!(params.motion, MotionParams::sport());
        assert_eq!(params.model_path, super::DEFAULT_MODEL);
        assert!(!params.orbit);
        assert!(!params.telemetry);
    }

    #[test]
    fn test_flags() {
        let params = parse_from(&[
            "--profile",
            "cruiser",
            "--steering",
            "proportional",
            "--model",
            "models/van.glb",
            "--orbit",
        ]);
        assert_eq!(params.motion.max_speed, 0.3);
        assert_eq!(params.motion.steering, SteeringPolicy::Proportional);
        assert_eq!(params.model_path, "models/van.glb");
        assert!(params.orbit);
    }

    #[test]
    fn test_rejects_unknown_profile() {
        assert!(CliArgs::try_parse_from(["toycar", "--profile", "rally"]).is_err());
    }
}
