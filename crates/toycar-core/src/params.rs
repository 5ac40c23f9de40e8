//! Motion model tuning.
//!
//! Every constant the motion model uses lives in [`MotionParams`]. Two named
//! [`Profile`]s cover the shipped feel; a TOML file can override any subset of
//! fields on top of a profile.

use std::{f64::consts::PI, fs, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// How turn rate is converted into heading change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SteeringPolicy {
    /// Heading changes at a fixed rate whenever the vehicle moves, signed by
    /// the direction of travel. Throttle amount does not matter.
    #[default]
    Sign,
    /// Heading change is scaled by `speed / max_speed`, so the vehicle turns
    /// slower at partial throttle.
    Proportional,
}

/// Named parameter sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Top speed 0.7 per tick.
    #[default]
    Sport,
    /// Top speed 0.3 per tick.
    Cruiser,
}

impl Profile {
    /// The parameters for this profile.
    pub fn params(self) -> MotionParams {
        match self {
            Profile::Sport => MotionParams::sport(),
            Profile::Cruiser => MotionParams::cruiser(),
        }
    }

    /// The parameters for this profile with an optional overrides file and
    /// then an explicit steering policy applied.
    ///
    /// A params file that cannot be used is logged and skipped; the profile
    /// values stay in effect.
    pub fn resolve(self, params_file: Option<&Path>, steering: Option<SteeringPolicy>) -> MotionParams {
        let mut params = self.params();
        if let Some(path) = params_file {
            match params.clone().with_overrides_from_file(path) {
                Ok(overridden) => params = overridden,
                Err(e) => tracing::warn!("Ignoring params file: {e}"),
            }
        }
        if let Some(steering) = steering {
            params = params.with_steering(steering);
        }
        params
    }
}

/// Constants for the kinematic motion model.
///
/// Rates are per tick; the model does not look at wall-clock time.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionParams {
    /// Speed cap in either direction.
    pub max_speed: f64,
    /// Speed added per tick while forward/back is held.
    pub acceleration: f64,
    /// Speed removed per tick while neither forward nor back is held.
    pub speed_decay: f64,
    /// Speeds below this magnitude snap to zero during decay.
    pub speed_epsilon: f64,
    /// Turn rate cap in either direction.
    pub max_turn_rate: f64,
    /// Turn rate added per tick while left/right is held.
    pub turn_acceleration: f64,
    /// Turn rate removed per tick while neither left nor right is held.
    pub turn_decay: f64,
    /// Turn rates below this magnitude snap to zero during decay.
    pub turn_epsilon: f64,
    /// Heading change (radians) per tick at full turn rate.
    pub base_yaw_rate: f64,
    /// Distance travelled per tick per unit of speed.
    pub step_scale: f64,
    /// Wheel roll (radians) per tick at full speed.
    pub wheel_spin_rate: f64,
    /// Front wheel yaw (radians) at full turn rate.
    pub max_steer_angle: f64,
    /// Turn-rate to heading policy.
    pub steering: SteeringPolicy,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::sport()
    }
}

impl MotionParams {
    /// The fast profile.
    pub fn sport() -> Self {
        Self {
            max_speed: 0.7,
            acceleration: 0.02,
            speed_decay: 0.005,
            speed_epsilon: 0.01,
            max_turn_rate: 1.0,
            turn_acceleration: 0.1,
            turn_decay: 0.05,
            turn_epsilon: 0.05,
            base_yaw_rate: 0.05,
            step_scale: 0.2,
            wheel_spin_rate: 0.2,
            max_steer_angle: PI / 10.0,
            steering: SteeringPolicy::Sign,
        }
    }

    /// The slow profile. Identical to [`MotionParams::sport`] apart from the
    /// speed cap.
    pub fn cruiser() -> Self {
        Self {
            max_speed: 0.3,
            ..Self::sport()
        }
    }

    /// Replace the steering policy.
    #[must_use]
    pub fn with_steering(mut self, steering: SteeringPolicy) -> Self {
        self.steering = steering;
        self
    }

    /// Check that every field is finite and has the right sign.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_speed", self.max_speed),
            ("max_turn_rate", self.max_turn_rate),
        ];
        let non_negative = [
            ("acceleration", self.acceleration),
            ("speed_decay", self.speed_decay),
            ("speed_epsilon", self.speed_epsilon),
            ("turn_acceleration", self.turn_acceleration),
            ("turn_decay", self.turn_decay),
            ("turn_epsilon", self.turn_epsilon),
            ("step_scale", self.step_scale),
        ];
        let finite = [
            ("base_yaw_rate", self.base_yaw_rate),
            ("wheel_spin_rate", self.wheel_spin_rate),
            ("max_steer_angle", self.max_steer_angle),
        ];

        for (field, value) in positive.into_iter().chain(non_negative).chain(finite) {
            if !value.is_finite() {
                return Err(Error::InvalidParams {
                    field,
                    detail: format!("{value} is not finite"),
                });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(Error::InvalidParams {
                    field,
                    detail: format!("must be positive, got {value}"),
                });
            }
        }
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(Error::InvalidParams {
                    field,
                    detail: format!("must not be negative, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Apply a TOML document of overrides on top of these params.
    pub fn with_overrides_from_str(self, source: &str) -> Result<Self> {
        let overrides: ParamOverrides = toml::from_str(source).map_err(|e| Error::Config {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        let params = overrides.apply(self);
        params.validate()?;
        Ok(params)
    }

    /// Load a TOML overrides file on top of these params.
    pub fn with_overrides_from_file(self, path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.with_overrides_from_str(&source)
            .map_err(|e| match e {
                Error::Config { message, .. } => Error::Config {
                    path: path.to_path_buf(),
                    message,
                },
                other => other,
            })
            .inspect(|_| tracing::info!("Loaded motion params from {}", path.display()))
    }
}

/// Optional replacement for each [`MotionParams`] field, as read from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamOverrides {
    max_speed: Option<f64>,
    acceleration: Option<f64>,
    speed_decay: Option<f64>,
    speed_epsilon: Option<f64>,
    max_turn_rate: Option<f64>,
    turn_acceleration: Option<f64>,
    turn_decay: Option<f64>,
    turn_epsilon: Option<f64>,
    base_yaw_rate: Option<f64>,
    step_scale: Option<f64>,
    wheel_spin_rate: Option<f64>,
    max_steer_angle: Option<f64>,
    steering: Option<SteeringPolicy>,
}

impl ParamOverrides {
    fn apply(self, base: MotionParams) -> MotionParams {
        MotionParams {
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            acceleration: self.acceleration.unwrap_or(base.acceleration),
            speed_decay: self.speed_decay.unwrap_or(base.speed_decay),
            speed_epsilon: self.speed_epsilon.unwrap_or(base.speed_epsilon),
            max_turn_rate: self.max_turn_rate.unwrap_or(base.max_turn_rate),
            turn_acceleration: self.turn_acceleration.unwrap_or(base.turn_acceleration),
            turn_decay: self.turn_decay.unwrap_or(base.turn_decay),
            turn_epsilon: self.turn_epsilon.unwrap_or(base.turn_epsilon),
            base_yaw_rate: self.base_yaw_rate.unwrap_or(base.base_yaw_rate),
            step_scale: self.step_scale.unwrap_or(base.step_scale),
            wheel_spin_rate: self.wheel_spin_rate.unwrap_or(base.wheel_spin_rate),
            max_steer_angle: self.max_steer_angle.unwrap_or(base.max_steer_angle),
            steering: self.steering.unwrap_or(base.steering),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_only_in_cap() {
        let sport = Profile::Sport.params();
        let cruiser = Profile::Cruiser.params();
        assert_eq!(sport.max_speed, 0.7);
        assert_eq!(cruiser.max_speed, 0.3);
        assert_eq!(
            MotionParams {
                max_speed: sport.max_speed,
                ..cruiser
            },
            sport
        );
    }

    #[test]
    fn test_profiles_validate() {
        assert!(MotionParams::sport().validate().is_ok());
        assert!(MotionParams::cruiser().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let params = MotionParams {
            max_speed: 0.0,
            ..MotionParams::sport()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParams {
                field: "max_speed",
                ..
            })
        ));

        let params = MotionParams {
            speed_decay: -0.1,
            ..MotionParams::sport()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidParams {
                field: "speed_decay",
                ..
            })
        ));

        let params = MotionParams {
            base_yaw_rate: f64::NAN,
            ..MotionParams::sport()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_overrides_keep_unlisted_fields() {
        let params = MotionParams::cruiser()
            .with_overrides_from_str("acceleration = 0.05\nsteering = \"proportional\"\n")
            .unwrap();
        assert_eq!(params.acceleration, 0.05);
        assert_eq!(params.steering, SteeringPolicy::Proportional);
        assert_eq!(params.max_speed, 0.3);
        assert_eq!(params.speed_decay, 0.005);
    }

    #[test]
    fn test_overrides_reject_unknown_and_invalid() {
        let err = MotionParams::sport()
            .with_overrides_from_str("top_speed = 2.0")
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = MotionParams::sport()
            .with_overrides_from_str("max_speed = -1.0")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams { .. }));
    }

    #[test]
    fn test_resolve_steering_override() {
        let params = Profile::Sport.resolve(None, Some(SteeringPolicy::Proportional));
        assert_eq!(params.steering, SteeringPolicy::Proportional);
        assert_eq!(params.max_speed, 0.7);
        assert_eq!(Profile::Cruiser.resolve(None, None), MotionParams::cruiser());
    }

    #[test]
    fn test_resolve_falls_back_on_bad_file() {
        let params = Profile::Sport.resolve(Some(Path::new("/nonexistent/params.toml")), None);
        assert_eq!(params, MotionParams::sport());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = MotionParams::sport()
            .with_overrides_from_file(Path::new("/nonexistent/toycar-params.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("toycar-params.toml"));
    }
}
