//! Kinematic motion model.
//!
//! Pure functions that advance the vehicle by one tick from the held controls.
//! Nothing here knows about rendering; the host calls [`tick`] once per frame
//! and copies the result onto the vehicle transform.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::{
    controls::{Control, ControlState},
    params::{MotionParams, SteeringPolicy},
};

/// Values this close to a clamp bound snap onto it, so repeated fixed
/// increments land exactly on the cap instead of a rounding error short.
const BOUND_SNAP: f64 = 1e-9;

/// Planar vehicle state carried from tick to tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleKinematics {
    /// Signed speed, forward positive. Stays within `±max_speed`.
    pub speed: f64,
    /// Signed turn rate, left positive. Stays within `±max_turn_rate`.
    pub turn_rate: f64,
    /// Yaw about the vertical axis in `[0, 2π)`. Zero faces +Z.
    pub heading: f64,
    /// Ground-plane position; `x` is world X and `y` is world Z.
    pub position: DVec2,
}

impl VehicleKinematics {
    /// Unit direction of travel on the ground plane for the current heading.
    pub fn forward(&self) -> DVec2 {
        DVec2::new(self.heading.sin(), self.heading.cos())
    }

    /// Whether the vehicle is fully at rest (no speed and no turn).
    pub fn is_idle(&self) -> bool {
        self.speed == 0.0 && self.turn_rate == 0.0
    }
}

/// Cosmetic wheel motion derived from the current kinematics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelFeedback {
    /// Roll (radians) to add to every wheel this tick.
    pub spin_delta: f64,
    /// Yaw (radians) to set on the steering wheels.
    pub steer_angle: f64,
}

/// Advance the vehicle by one tick.
///
/// Decay runs before input, and only on an axis with no input held, so a held
/// control always gains its full increment. Heading and position are then
/// integrated from the updated speed and turn rate.
pub fn tick(
    params: &MotionParams,
    controls: &ControlState,
    prev: &VehicleKinematics,
) -> VehicleKinematics {
    let forward = controls.is_active(Control::Forward);
    let back = controls.is_active(Control::Back);
    let left = controls.is_active(Control::Left);
    let right = controls.is_active(Control::Right);

    // Decay.
    let mut speed = prev.speed;
    if !forward && !back {
        speed = decay_toward_zero(speed, params.speed_decay, params.speed_epsilon);
    }
    let mut turn_rate = prev.turn_rate;
    if !left && !right {
        turn_rate = decay_toward_zero(turn_rate, params.turn_decay, params.turn_epsilon);
    }

    // Input.
    if forward {
        speed = accelerate(speed, params.acceleration, params.max_speed);
    }
    if back {
        speed = accelerate(speed, -params.acceleration, params.max_speed);
    }
    if left {
        turn_rate = accelerate(turn_rate, params.turn_acceleration, params.max_turn_rate);
    }
    if right {
        turn_rate = accelerate(turn_rate, -params.turn_acceleration, params.max_turn_rate);
    }

    // Heading.
    let yaw = params.base_yaw_rate * turn_rate * steering_factor(params, speed);
    let heading = wrap_heading(prev.heading + yaw);

    // Position.
    let mut next = VehicleKinematics {
        speed,
        turn_rate,
        heading,
        position: prev.position,
    };
    next.position += next.forward() * (params.step_scale * speed);
    next
}

/// Wheel roll and steering yaw for the given kinematics.
pub fn wheel_feedback(params: &MotionParams, kinematics: &VehicleKinematics) -> WheelFeedback {
    WheelFeedback {
        spin_delta: params.wheel_spin_rate * kinematics.speed / params.max_speed,
        steer_angle: kinematics.turn_rate * params.max_steer_angle,
    }
}

/// How much of the turn rate becomes heading change at this speed.
pub fn steering_factor(params: &MotionParams, speed: f64) -> f64 {
    match params.steering {
        SteeringPolicy::Sign => {
            if speed == 0.0 {
                0.0
            } else {
                speed.signum()
            }
        }
        SteeringPolicy::Proportional => speed / params.max_speed,
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_heading(heading: f64) -> f64 {
    let wrapped = heading.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shrink the magnitude of `value` by `step`, never crossing zero, and snap to
/// zero once the magnitude drops below `epsilon`.
fn decay_toward_zero(value: f64, step: f64, epsilon: f64) -> f64 {
    let magnitude = (value.abs() - step).max(0.0);
    if magnitude < epsilon {
        0.0
    } else {
        magnitude.copysign(value)
    }
}

/// Add `delta` to `value`, clamped to `±bound`.
fn accelerate(value: f64, delta: f64, bound: f64) -> f64 {
    let next = (value + delta).clamp(-bound, bound);
    if bound - next.abs() < BOUND_SNAP {
        bound.copysign(next)
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn held(controls: &[Control]) -> ControlState {
        controls.iter().copied().collect()
    }

    fn run(
        params: &MotionParams,
        controls: &ControlState,
        start: VehicleKinematics,
        ticks: usize,
    ) -> VehicleKinematics {
        (0..ticks).fold(start, |state, _| tick(params, controls, &state))
    }

    fn moving(speed: f64) -> VehicleKinematics {
        VehicleKinematics {
            speed,
            ..Default::default()
        }
    }

    /// Number of empty-input ticks until speed reaches zero.
    fn ticks_to_stop(params: &MotionParams, speed: f64) -> usize {
        let empty = ControlState::new();
        let mut state = moving(speed);
        let mut ticks = 0;
        while state.speed != 0.0 {
            state = tick(params, &empty, &state);
            ticks += 1;
            assert!(ticks < 10_000, "speed never settled");
        }
        ticks
    }

    #[test]
    fn test_decay_is_monotonic_and_settles() {
        let params = MotionParams::sport();
        let empty = ControlState::new();
        for start in [0.7, 0.33, -0.5, 0.011] {
            let mut state = moving(start);
            loop {
                let next = tick(&params, &empty, &state);
                if state.speed == 0.0 {
                    assert_eq!(next.speed, 0.0);
                    break;
                }
                assert!(next.speed.abs() < state.speed.abs());
                // No overshoot past zero.
                assert!(next.speed == 0.0 || next.speed.signum() == start.signum());
                state = next;
            }
            let settled = run(&params, &empty, state, 20);
            assert_eq!(settled.speed, 0.0);
        }
    }

    #[test]
    fn test_decay_is_symmetric() {
        let params = MotionParams::sport();
        for start in [0.7, 0.42, 0.1, 0.0151] {
            assert_eq!(
                ticks_to_stop(&params, start),
                ticks_to_stop(&params, -start)
            );
        }
    }

    #[test]
    fn test_forward_reaches_cap_exactly() {
        let params = MotionParams::sport();
        let forward = held(&[Control::Forward]);

        let mut state = VehicleKinematics::default();
        for _ in 0..34 {
            let next = tick(&params, &forward, &state);
            assert!(next.speed > state.speed);
            assert!(next.speed < params.max_speed);
            state = next;
        }
        state = tick(&params, &forward, &state);
        assert_eq!(state.speed, 0.7);

        let held_longer = run(&params, &forward, state, 50);
        assert_eq!(held_longer.speed, 0.7);
    }

    #[test]
    fn test_cruiser_cap() {
        let params = MotionParams::cruiser();
        let forward = held(&[Control::Forward]);
        let mut state = VehicleKinematics::default();
        for _ in 0..200 {
            state = tick(&params, &forward, &state);
            assert!(state.speed <= 0.3);
        }
        assert_eq!(state.speed, 0.3);

        let back = held(&[Control::Back]);
        let reversed = run(&params, &back, state, 200);
        assert_eq!(reversed.speed, -0.3);
    }

    #[test]
    fn test_release_decays_next_tick() {
        let params = MotionParams::sport();
        let at_cap = run(
            &params,
            &held(&[Control::Forward]),
            VehicleKinematics::default(),
            40,
        );
        let released = tick(&params, &ControlState::new(), &at_cap);
        assert!((released.speed - 0.695).abs() < 1e-12);
    }

    #[test]
    fn test_full_stop_from_cap_in_140_ticks() {
        let params = MotionParams::sport();
        let stopped = run(&params, &ControlState::new(), moving(0.7), 140);
        assert_eq!(stopped.speed, 0.0);
        assert!(stopped.speed.is_sign_positive());
    }

    #[test]
    fn test_idle_state_is_fixed_point() {
        let params = MotionParams::sport();
        let state = VehicleKinematics {
            speed: 0.0,
            turn_rate: 0.0,
            heading: 1.234,
            position: DVec2::new(-3.5, 8.25),
        };
        assert_eq!(tick(&params, &ControlState::new(), &state), state);
        assert!(state.is_idle());
    }

    #[test]
    fn test_turn_rate_clamps_and_decays() {
        let params = MotionParams::sport();
        let left = run(
            &params,
            &held(&[Control::Left]),
            VehicleKinematics::default(),
            30,
        );
        assert_eq!(left.turn_rate, 1.0);

        let right = run(
            &params,
            &held(&[Control::Right]),
            VehicleKinematics::default(),
            30,
        );
        assert_eq!(right.turn_rate, -1.0);

        let released = run(&params, &ControlState::new(), left, 25);
        assert_eq!(released.turn_rate, 0.0);
    }

    #[test]
    fn test_turn_decay_is_mirrored() {
        let params = MotionParams::sport();
        let empty = ControlState::new();
        let mut left = VehicleKinematics {
            turn_rate: 1.0,
            ..Default::default()
        };
        let mut right = VehicleKinematics {
            turn_rate: -1.0,
            ..Default::default()
        };
        for _ in 0..30 {
            left = tick(&params, &empty, &left);
            right = tick(&params, &empty, &right);
            assert_eq!(left.turn_rate, -right.turn_rate);
            assert!(left.turn_rate >= 0.0);
        }
        assert_eq!(left.turn_rate, 0.0);
        assert_eq!(right.turn_rate, 0.0);
    }

    #[test]
    fn test_no_heading_change_at_rest() {
        let params = MotionParams::sport();
        let state = run(
            &params,
            &held(&[Control::Left]),
            VehicleKinematics::default(),
            10,
        );
        assert!(state.turn_rate > 0.0);
        assert_eq!(state.heading, 0.0);
        assert_eq!(state.position, DVec2::ZERO);
    }

    #[test]
    fn test_heading_wraps_forward() {
        let params = MotionParams::sport();
        let state = VehicleKinematics {
            speed: 0.5,
            turn_rate: 1.0,
            heading: TAU - 0.01,
            position: DVec2::ZERO,
        };
        let next = tick(&params, &held(&[Control::Forward, Control::Left]), &state);
        assert!(next.heading > 0.0);
        assert!((next.heading - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_heading_wraps_backward() {
        let params = MotionParams::sport();
        let state = VehicleKinematics {
            speed: 0.5,
            turn_rate: -1.0,
            heading: 0.01,
            position: DVec2::ZERO,
        };
        let next = tick(&params, &held(&[Control::Forward, Control::Right]), &state);
        assert!(next.heading < TAU);
        assert!((next.heading - (TAU - 0.04)).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_heading_range() {
        for angle in [-1e-20, -TAU, TAU, 3.0 * TAU + 0.5, -0.25, 0.0] {
            let wrapped = wrap_heading(angle);
            assert!((0.0..TAU).contains(&wrapped), "{angle} -> {wrapped}");
        }
        assert_eq!(wrap_heading(1.5), 1.5);
    }

    #[test]
    fn test_reverse_inverts_steering() {
        let params = MotionParams::sport();
        let state = VehicleKinematics {
            speed: -0.4,
            turn_rate: 1.0,
            heading: PI,
            position: DVec2::ZERO,
        };
        let next = tick(&params, &held(&[Control::Back, Control::Left]), &state);
        assert!(next.heading < PI);
    }

    #[test]
    fn test_steering_policies() {
        let sign = MotionParams::sport();
        let proportional = MotionParams::sport().with_steering(SteeringPolicy::Proportional);

        assert_eq!(steering_factor(&sign, 0.0), 0.0);
        assert_eq!(steering_factor(&sign, 0.01), 1.0);
        assert_eq!(steering_factor(&sign, -0.7), -1.0);
        assert_eq!(steering_factor(&proportional, 0.0), 0.0);
        assert!((steering_factor(&proportional, 0.35) - 0.5).abs() < 1e-12);
        assert!((steering_factor(&proportional, -0.7) + 1.0).abs() < 1e-12);

        // Partial throttle turns half as fast under the proportional policy.
        let state = VehicleKinematics {
            speed: 0.355,
            turn_rate: 1.0,
            heading: 1.0,
            position: DVec2::ZERO,
        };
        let left = held(&[Control::Left]);
        let by_sign = tick(&sign, &left, &state);
        let by_speed = tick(&proportional, &left, &state);
        assert!((by_sign.heading - 1.05).abs() < 1e-9);
        assert!((by_speed.heading - 1.025).abs() < 1e-9);
    }

    #[test]
    fn test_position_follows_heading() {
        let params = MotionParams::sport();
        let forward = held(&[Control::Forward]);

        let east = VehicleKinematics {
            speed: 0.5,
            heading: FRAC_PI_2,
            ..Default::default()
        };
        let next = tick(&params, &forward, &east);
        assert!((next.position.x - 0.2 * 0.52).abs() < 1e-12);
        assert!(next.position.y.abs() < 1e-12);

        // Heading in the third quadrant moves towards -X and -Z.
        let south_west = VehicleKinematics {
            speed: 0.5,
            heading: PI + 0.5,
            ..Default::default()
        };
        let next = tick(&params, &forward, &south_west);
        assert!(next.position.x < 0.0);
        assert!(next.position.y < 0.0);
        assert!((next.position.length() - 0.2 * 0.52).abs() < 1e-12);
        assert!((next.forward() - DVec2::new(next.heading.sin(), next.heading.cos())).length() < 1e-12);
    }

    #[test]
    fn test_wheel_feedback() {
        let params = MotionParams::sport();
        let state = VehicleKinematics {
            speed: 0.35,
            turn_rate: -0.5,
            ..Default::default()
        };
        let feedback = wheel_feedback(&params, &state);
        assert!((feedback.spin_delta - 0.1).abs() < 1e-12);
        assert!((feedback.steer_angle + PI / 20.0).abs() < 1e-12);
        assert_eq!(
            wheel_feedback(&params, &VehicleKinematics::default()),
            WheelFeedback::default()
        );
    }
}
