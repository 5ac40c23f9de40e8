//! Per-tick telemetry logging.
//!
//! Outputs CSV data for analysis. Supports multiple output destinations via
//! the `TelemetryOutput` trait.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::{
    controls::{Control, ControlState},
    motion::{VehicleKinematics, WheelFeedback},
};

/// Default telemetry output file path.
pub const TELEMETRY_PATH: &str = "telemetry.csv";

/// Snapshot of one tick for telemetry logging.
pub struct TelemetrySnapshot {
    pub tick: u64,
    pub controls: ControlState,
    pub kinematics: VehicleKinematics,
    pub feedback: WheelFeedback,
}

/// Trait for telemetry output destinations.
pub trait TelemetryOutput: Send + Sync {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str);
    /// Write a data row.
    fn write_row(&mut self, row: &str);
}

/// File-based output.
pub struct FileTelemetryOutput {
    path: PathBuf,
}

impl FileTelemetryOutput {
    /// Write to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileTelemetryOutput {
    fn default() -> Self {
        Self::new(TELEMETRY_PATH)
    }
}

impl TelemetryOutput for FileTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        match File::create(&self.path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{header}");
            }
            Err(e) => tracing::warn!("Failed to create {}: {e}", self.path.display()),
        }
    }

    fn write_row(&mut self, row: &str) {
        if let Ok(mut file) = OpenOptions::new().append(true).open(&self.path) {
            let _ = writeln!(file, "{row}");
        }
    }
}

/// Stdout output for the headless simulator.
pub struct StdoutTelemetryOutput;

impl TelemetryOutput for StdoutTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        println!("{header}");
    }

    fn write_row(&mut self, row: &str) {
        println!("{row}");
    }
}

/// Macro to define the CSV schema and generate the header/row functions.
///
/// Keeps column names and formats in sync from a single definition.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        row_values: |$snapshot:ident| { $( $val:expr ),* $(,)? }
    ) => {
        /// The CSV header line.
        pub fn telemetry_header() -> &'static str {
            const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );
            CSV_HEADER.trim_end_matches(',')
        }

        /// Format one snapshot as a CSV row.
        pub fn telemetry_row($snapshot: &TelemetrySnapshot) -> String {
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            line.trim_end_matches(',').to_string()
        }
    };
}

define_telemetry! {
    columns: {
        tick: "{}",
        forward: "{}",
        back: "{}",
        left: "{}",
        right: "{}",
        speed: "{:.4}",
        turn_rate: "{:.3}",
        heading_deg: "{:.2}",
        pos_x: "{:.3}",
        pos_z: "{:.3}",
        wheel_spin: "{:.4}",
        steer_deg: "{:.2}",
    },
    row_values: |t| {
        t.tick,
        u8::from(t.controls.is_active(Control::Forward)),
        u8::from(t.controls.is_active(Control::Back)),
        u8::from(t.controls.is_active(Control::Left)),
        u8::from(t.controls.is_active(Control::Right)),
        t.kinematics.speed,
        t.kinematics.turn_rate,
        t.kinematics.heading.to_degrees(),
        t.kinematics.position.x,
        t.kinematics.position.y,
        t.feedback.spin_delta,
        t.feedback.steer_angle.to_degrees(),
    }
}

/// Write the header to an output (call when a run starts).
pub fn reset_telemetry_to(output: &mut dyn TelemetryOutput) {
    output.write_header(telemetry_header());
}

/// Write one snapshot to an output.
pub fn emit_telemetry_to(snapshot: &TelemetrySnapshot, output: &mut dyn TelemetryOutput) {
    output.write_row(&telemetry_row(snapshot));
}
