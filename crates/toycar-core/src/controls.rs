//! Input aggregation.
//!
//! Physical inputs (keys, on-screen buttons) are folded into a closed set of
//! logical [`Control`]s. [`ControlState`] records which of them are currently
//! held. Several physical sources may map to the same control; the state only
//! tracks the logical token.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// A logical driving control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Accelerate forward.
    Forward,
    /// Brake / reverse.
    Back,
    /// Steer left.
    Left,
    /// Steer right.
    Right,
}

impl Control {
    /// Every control, in a stable order.
    pub const ALL: [Control; 4] = [Control::Forward, Control::Back, Control::Left, Control::Right];

    /// The token name of this control.
    pub fn name(self) -> &'static str {
        match self {
            Control::Forward => "forward",
            Control::Back => "back",
            Control::Left => "left",
            Control::Right => "right",
        }
    }

    /// Map a DOM-style key name to a control.
    ///
    /// Arrow keys and WASD (either case) are bound; every other key is ignored.
    pub fn from_key(key: &str) -> Option<Control> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Control::Forward),
            "ArrowDown" | "s" | "S" => Some(Control::Back),
            "ArrowLeft" | "a" | "A" => Some(Control::Left),
            "ArrowRight" | "d" | "D" => Some(Control::Right),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Control::Forward => 1 << 0,
            Control::Back => 1 << 1,
            Control::Left => 1 << 2,
            Control::Right => 1 << 3,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Control {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Control::ALL
            .into_iter()
            .find(|control| control.name() == s)
            .ok_or_else(|| Error::UnknownControl {
                token: s.to_string(),
            })
    }
}

/// The set of currently held controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    held: u8,
}

impl ControlState {
    /// An empty state with nothing held.
    pub const fn new() -> Self {
        Self { held: 0 }
    }

    /// Mark a control as held. Returns `true` if it was not held before.
    pub fn activate(&mut self, control: Control) -> bool {
        let changed = !self.is_active(control);
        self.held |= control.bit();
        changed
    }

    /// Release a control. Returns `true` if it was held before.
    pub fn deactivate(&mut self, control: Control) -> bool {
        let changed = self.is_active(control);
        self.held &= !control.bit();
        changed
    }

    /// Whether the control is currently held.
    pub fn is_active(&self, control: Control) -> bool {
        self.held & control.bit() != 0
    }

    /// Activate a control by token name, rejecting unknown tokens.
    pub fn activate_named(&mut self, token: &str) -> Result<bool> {
        let control = token.parse::<Control>()?;
        Ok(self.activate(control))
    }

    /// Release a control by token name, rejecting unknown tokens.
    pub fn deactivate_named(&mut self, token: &str) -> Result<bool> {
        let control = token.parse::<Control>()?;
        Ok(self.deactivate(control))
    }

    /// Release every control.
    pub fn clear(&mut self) {
        self.held = 0;
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.held == 0
    }

    /// Iterate over the held controls.
    pub fn iter(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL
            .into_iter()
            .filter(move |control| self.is_active(*control))
    }
}

impl FromIterator<Control> for ControlState {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        let mut state = ControlState::new();
        for control in iter {
            state.activate(control);
        }
        state
    }
}
