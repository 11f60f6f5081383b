//! This module contains structs describing the commands sent to the drive, such as [`Move`] and [`PositionProfile`].
//! They can be passed into functions such as [`crate::Epos4::move_to`].

/// Whether a move target is an absolute position or relative to the previous target.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    /// The target is an absolute position in increments.
    Absolute,
    /// The target is added to the previous target position.
    #[default]
    Relative,
}

/// When the drive starts processing a new profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    /// Abort the profile in progress and start the new one right away.
    Immediately,
    /// Queue the new profile behind the one in progress.
    #[default]
    AfterCurrent,
}

/// A profile position move.
///
/// The default is a relative move of 0 increments, queued behind the current profile.
///
/// ```rust
/// use epos4::command::{Move, Positioning, Start};
///
/// let m = Move::absolute(20_000).immediately();
/// assert_eq!(m.positioning, Positioning::Absolute);
/// assert_eq!(m.start, Start::Immediately);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Target position in increments (quadcounts for an encoder).
    pub target: i32,
    #[allow(missing_docs)]
    pub positioning: Positioning,
    #[allow(missing_docs)]
    pub start: Start,
}

impl Move {
    /// A move to an absolute position.
    pub fn absolute(target: i32) -> Self {
        Self {
            target,
            positioning: Positioning::Absolute,
            ..Self::default()
        }
    }

    /// A move relative to the previous target.
    pub fn relative(target: i32) -> Self {
        Self {
            target,
            positioning: Positioning::Relative,
            ..Self::default()
        }
    }

    /// Start the move right away instead of after the profile in progress.
    pub fn immediately(mut self) -> Self {
        self.start = Start::Immediately;
        self
    }

    pub(crate) fn is_absolute(&self) -> bool {
        self.positioning == Positioning::Absolute
    }

    pub(crate) fn is_immediate(&self) -> bool {
        self.start == Start::Immediately
    }
}

/// Parameters of the profile position mode trajectory generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionProfile {
    /// Profile velocity in rpm.
    pub velocity: u32,
    /// Profile acceleration in rpm/s.
    pub acceleration: u32,
    /// Profile deceleration in rpm/s.
    pub deceleration: u32,
}

impl Default for PositionProfile {
    /// 500 rpm, accelerating and decelerating at 1000 rpm/s.
    fn default() -> Self {
        Self {
            velocity: 500,
            acceleration: 1000,
            deceleration: 1000,
        }
    }
}

impl From<(u32, u32, u32)> for PositionProfile {
    fn from((velocity, acceleration, deceleration): (u32, u32, u32)) -> Self {
        Self {
            velocity,
            acceleration,
            deceleration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_move_is_queued_relative() {
        let m = Move::default();
        assert!(!m.is_absolute());
        assert!(!m.is_immediate());
        assert_eq!(Move::relative(-20_000).target, -20_000);
    }

    #[test]
    fn absolute_immediate_move() {
        let m = Move::absolute(5).immediately();
        assert!(m.is_absolute());
        assert!(m.is_immediate());
    }
}
