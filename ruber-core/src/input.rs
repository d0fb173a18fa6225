//! Keyboard commands and ship steering input
use crate::camera::{ProjectionMode, ViewPreset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerAxis {
    Pitch,
    Yaw,
    Roll,
    Thrust,
}

/// Steering accumulated between two updates.
///
/// Positive pitch raises the nose, positive yaw turns left, positive roll
/// lifts the right wing and positive thrust moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteerInput {
    pub pitch: i32,
    pub yaw: i32,
    pub roll: i32,
    pub thrust: i32,
}

impl SteerInput {
    pub fn nudge(&mut self, axis: SteerAxis, amount: i32) {
        let value = match axis {
            SteerAxis::Pitch => &mut self.pitch,
            SteerAxis::Yaw => &mut self.yaw,
            SteerAxis::Roll => &mut self.roll,
            SteerAxis::Thrust => &mut self.thrust,
        };
        *value = value.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Switch between the interval and idle timers.
    ToggleTimer,
    View(ViewPreset),
    /// Move to the next follow camera.
    NextCamera,
    ToggleWireframe,
    Projection(ProjectionMode),
    Steer(SteerAxis, i32),
}

impl Command {
    /// Command bound to a character key, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        let command = match c.to_ascii_lowercase() {
            'q' | '\x1b' => Command::Quit,
            'a' => Command::ToggleTimer,
            'f' => Command::View(ViewPreset::Front),
            't' => Command::View(ViewPreset::Top),
            'b' => Command::View(ViewPreset::Bottom),
            'h' => Command::View(ViewPreset::Overhead),
            'v' => Command::NextCamera,
            'w' => Command::ToggleWireframe,
            'o' => Command::Projection(ProjectionMode::Orthographic),
            'p' => Command::Projection(ProjectionMode::Perspective),
            'i' => Command::Steer(SteerAxis::Pitch, -1),
            'k' => Command::Steer(SteerAxis::Pitch, 1),
            'j' => Command::Steer(SteerAxis::Roll, 1),
            'l' => Command::Steer(SteerAxis::Roll, -1),
            _ => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(Command::from_char('q'), Some(Command::Quit));
        assert_eq!(Command::from_char('Q'), Some(Command::Quit));
        assert_eq!(Command::from_char('\x1b'), Some(Command::Quit));
        assert_eq!(Command::from_char('T'), Some(Command::View(ViewPreset::Top)));
        assert_eq!(
            Command::from_char('o'),
            Some(Command::Projection(ProjectionMode::Orthographic))
        );
        assert_eq!(Command::from_char('k'), Some(Command::Steer(SteerAxis::Pitch, 1)));
        assert_eq!(Command::from_char('z'), None);
    }

    #[test]
    fn test_steer_accumulates_and_resets() {
        let mut steer = SteerInput::default();
        assert!(steer.is_idle());
        steer.nudge(SteerAxis::Thrust, 1);
        steer.nudge(SteerAxis::Thrust, 1);
        steer.nudge(SteerAxis::Yaw, -1);
        assert_eq!(steer.thrust, 2);
        assert_eq!(steer.yaw, -1);
        assert!(!steer.is_idle());
        steer.reset();
        assert!(steer.is_idle());
    }

    #[test]
    fn test_steer_saturates() {
        let mut steer = SteerInput {
            roll: i32::MAX,
            ..SteerInput::default()
        };
        steer.nudge(SteerAxis::Roll, 1);
        assert_eq!(steer.roll, i32::MAX);
    }
}
