//! Headless drive simulator.
//!
//! Runs the motion model through a scripted scenario without a window and
//! writes per-tick CSV telemetry to stdout, with a short summary on stderr.
//!
//! Run with: cargo run -p toycar --bin drive-sim -- --scenario circle --ticks 600

#[cfg(target_family = "wasm")]
fn main() {}

#[cfg(not(target_family = "wasm"))]
fn main() {
    sim::run();
}

#[cfg(not(target_family = "wasm"))]
mod sim {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};
    use toycar_core::{
        Control, ControlState, MotionParams, Profile, SteeringPolicy, VehicleKinematics,
        telemetry::{StdoutTelemetryOutput, TelemetrySnapshot, emit_telemetry_to, reset_telemetry_to},
        tick, wheel_feedback,
    };

    /// Ticks a scripted control is held before the scenario changes phase.
    const PHASE_TICKS: u64 = 60;

    #[derive(Parser, Debug)]
    #[command(about = "Run the toycar motion model headlessly")]
    struct Args {
        /// Motion profile.
        #[arg(long, value_enum, default_value_t = Profile::default())]
        profile: Profile,

        /// Turn-rate to heading policy (overrides the params file).
        #[arg(long, value_enum)]
        steering: Option<SteeringPolicy>,

        /// TOML file overriding individual motion parameters.
        #[arg(long)]
        params: Option<PathBuf>,

        /// Scripted input to drive with.
        #[arg(long, value_enum, default_value_t = Scenario::Accelerate)]
        scenario: Scenario,

        /// Number of ticks to run.
        #[arg(long, default_value_t = 300)]
        ticks: u64,
    }

    /// Scripted input sequences.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    pub(crate) enum Scenario {
        /// Hold forward throughout.
        Accelerate,
        /// Hold forward for a while, then release.
        Coast,
        /// Hold forward and left throughout.
        Circle,
        /// Hold back for a while, then forward.
        Reverse,
    }

    impl Scenario {
        /// The controls held at a given tick (counting from zero).
        pub(crate) fn controls(self, tick: u64) -> ControlState {
            let early = tick < PHASE_TICKS;
            let held: &[Control] = match self {
                Scenario::Accelerate => &[Control::Forward],
                Scenario::Coast if early => &[Control::Forward],
                Scenario::Coast => &[],
                Scenario::Circle => &[Control::Forward, Control::Left],
                Scenario::Reverse if early => &[Control::Back],
                Scenario::Reverse => &[Control::Forward],
            };
            held.iter().copied().collect()
        }
    }

    /// Summary of a run.
    #[derive(Debug, Default, PartialEq)]
    pub(crate) struct Summary {
        /// Largest speed magnitude seen.
        pub max_speed: f64,
        /// First tick (1-based) at which the speed cap was reached.
        pub ticks_to_cap: Option<u64>,
        /// Total ground distance travelled.
        pub distance: f64,
        /// State after the last tick.
        pub last: VehicleKinematics,
    }

    /// Run a scenario, handing every tick to `on_tick`.
    pub(crate) fn simulate(
        params: &MotionParams,
        scenario: Scenario,
        ticks: u64,
        mut on_tick: impl FnMut(&TelemetrySnapshot),
    ) -> Summary {
        let mut summary = Summary::default();
        let mut state = VehicleKinematics::default();

        for n in 0..ticks {
            let controls = scenario.controls(n);
            let next = tick(params, &controls, &state);

            summary.distance += next.position.distance(state.position);
            summary.max_speed = summary.max_speed.max(next.speed.abs());
            if summary.ticks_to_cap.is_none() && next.speed.abs() >= params.max_speed {
                summary.ticks_to_cap = Some(n + 1);
            }

            on_tick(&TelemetrySnapshot {
                tick: n + 1,
                controls,
                kinematics: next,
                feedback: wheel_feedback(params, &next),
            });
            state = next;
        }

        summary.last = state;
        summary
    }

    pub fn run() {
        let args = Args::parse();
        let params = args.profile.resolve(args.params.as_deref(), args.steering);

        let mut output = StdoutTelemetryOutput;
        reset_telemetry_to(&mut output);
        let summary = simulate(&params, args.scenario, args.ticks, |snapshot| {
            emit_telemetry_to(snapshot, &mut output);
        });

        eprintln!("# scenario: {:?}, {} ticks", args.scenario, args.ticks);
        eprintln!("# max speed: {:.4} (cap {})", summary.max_speed, params.max_speed);
        match summary.ticks_to_cap {
            Some(n) => eprintln!("# ticks to cap: {n}"),
            None => eprintln!("# ticks to cap: not reached"),
        }
        eprintln!("# distance: {:.3}", summary.distance);
        eprintln!(
            "# final position: ({:.3}, {:.3}), heading {:.1}°",
            summary.last.position.x,
            summary.last.position.y,
            summary.last.heading.to_degrees()
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_accelerate_reaches_cap_in_35_ticks() {
            let summary = simulate(&MotionParams::sport(), Scenario::Accelerate, 100, |_| {});
            assert_eq!(summary.ticks_to_cap, Some(35));
            assert_eq!(summary.max_speed, 0.7);
            assert_eq!(summary.last.heading, 0.0);
        }

        #[test]
        fn test_coast_comes_to_rest() {
            let summary = simulate(&MotionParams::cruiser(), Scenario::Coast, 400, |_| {});
            assert_eq!(summary.max_speed, 0.3);
            assert!(summary.last.is_idle());
        }

        #[test]
        fn test_circle_turns() {
            let summary = simulate(&MotionParams::sport(), Scenario::Circle, 200, |_| {});
            assert!(summary.last.heading > 0.0);
            assert!(summary.last.turn_rate > 0.0);
        }

        #[test]
        fn test_reverse_goes_backwards_first() {
            let mut speeds = Vec::new();
            simulate(&MotionParams::sport(), Scenario::Reverse, 120, |snapshot| {
                speeds.push(snapshot.kinematics.speed);
            });
            assert!(speeds[59] < 0.0);
            assert!(speeds[119] > speeds[59]);
        }

        #[test]
        fn test_every_tick_is_reported() {
            let mut count = 0;
            simulate(&MotionParams::sport(), Scenario::Accelerate, 17, |_| count += 1);
            assert_eq!(count, 17);
        }
    }
}
