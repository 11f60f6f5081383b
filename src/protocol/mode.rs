use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};

use crate::Error;

/// Operation modes supported by the EPOS4 (`0x6060` / `0x6061`).
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum OperationMode {
    /// Profile Position Mode (PPM)
    ProfilePosition = 1,
    /// Profile Velocity Mode (PVM)
    ProfileVelocity = 3,
    /// Homing Mode (HMM)
    Homing = 6,
    /// Cyclic Synchronous Position Mode (CSP)
    CyclicSynchronousPosition = 8,
    /// Cyclic Synchronous Velocity Mode (CSV)
    CyclicSynchronousVelocity = 9,
    /// Cyclic Synchronous Torque Mode (CST)
    CyclicSynchronousTorque = 10,
}

impl OperationMode {
    /// The value written to / read from the device.
    pub fn value(&self) -> i8 {
        // repr(i8), always in range
        self.to_i8().unwrap_or_default()
    }
}

impl TryFrom<i8> for OperationMode {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        OperationMode::from_i8(value).ok_or(Error::UnknownOperationMode(value))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn round_trip_known_modes() {
        assert_eq!(OperationMode::ProfilePosition.value(), 1);
        assert_eq!(OperationMode::CyclicSynchronousTorque.value(), 10);
        assert_eq!(
            OperationMode::try_from(3).unwrap(),
            OperationMode::ProfileVelocity
        );
    }

    #[test]
    fn unknown_mode() {
        assert!(matches!(
            OperationMode::try_from(2),
            Err(Error::UnknownOperationMode(2))
        ));
    }
}
