//! Core of the toycar driving toy.
//!
//! A pure kinematic motion model driven by a closed set of held controls.
//! No rendering types appear here so the model can be tested and simulated
//! headlessly; the Bevy application owns the scene and calls [`tick`] once
//! per frame.

pub mod controls;
pub mod error;
pub mod motion;
pub mod params;
pub mod telemetry;

pub use controls::{Control, ControlState};
pub use error::{Error, Result};
pub use motion::{VehicleKinematics, WheelFeedback, tick, wheel_feedback};
pub use params::{MotionParams, Profile, SteeringPolicy};
