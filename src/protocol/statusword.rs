/// The CiA 402 statusword (`0x6041`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statusword(pub u16);

impl Statusword {
    /// Bit 3
    pub const FAULT: u16 = 0x0008;
    /// Bit 4
    pub const VOLTAGE_ENABLED: u16 = 0x0010;
    /// Bit 7
    pub const WARNING: u16 = 0x0080;
    /// Bit 10
    pub const TARGET_REACHED: u16 = 0x0400;
    /// Bit 11
    pub const INTERNAL_LIMIT_ACTIVE: u16 = 0x0800;
    /// Bit 12, in profile position mode.
    pub const SETPOINT_ACKNOWLEDGE: u16 = 0x1000;
    /// Bit 13, in profile position mode.
    pub const FOLLOWING_ERROR: u16 = 0x2000;
    /// Bit 15
    pub const POSITION_REFERENCED: u16 = 0x8000;

    fn is_set(&self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    /// The drive is in the fault or fault reaction active state.
    pub fn fault(&self) -> bool {
        self.is_set(Self::FAULT)
    }

    /// Power stage supply voltage is present.
    pub fn voltage_enabled(&self) -> bool {
        self.is_set(Self::VOLTAGE_ENABLED)
    }

    #[allow(missing_docs)]
    pub fn warning(&self) -> bool {
        self.is_set(Self::WARNING)
    }

    /// The target of the current profile has been reached.
    pub fn target_reached(&self) -> bool {
        self.is_set(Self::TARGET_REACHED)
    }

    #[allow(missing_docs)]
    pub fn internal_limit_active(&self) -> bool {
        self.is_set(Self::INTERNAL_LIMIT_ACTIVE)
    }

    /// The drive accepted a new setpoint and has not started processing it yet.
    ///
    /// The bit is cleared again once the new profile starts.
    pub fn setpoint_acknowledged(&self) -> bool {
        self.is_set(Self::SETPOINT_ACKNOWLEDGE)
    }

    #[allow(missing_docs)]
    pub fn following_error(&self) -> bool {
        self.is_set(Self::FOLLOWING_ERROR)
    }

    #[allow(missing_docs)]
    pub fn position_referenced(&self) -> bool {
        self.is_set(Self::POSITION_REFERENCED)
    }

    /// Decodes the device state from bits 0-3, 5 and 6.
    pub fn state(&self) -> DriveState {
        match (self.0 & 0x004F, self.0 & 0x006F) {
            (0x0000, _) => DriveState::NotReadyToSwitchOn,
            (0x0040, _) => DriveState::SwitchOnDisabled,
            (0x000F, _) => DriveState::FaultReactionActive,
            (0x0008, _) => DriveState::Fault,
            (_, 0x0021) => DriveState::ReadyToSwitchOn,
            (_, 0x0023) => DriveState::SwitchedOn,
            (_, 0x0027) => DriveState::OperationEnabled,
            (_, 0x0007) => DriveState::QuickStopActive,
            _ => DriveState::Unknown,
        }
    }
}

impl std::fmt::Display for Statusword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x} ({:?})", self.0, self.state())
    }
}

/// States of the CiA 402 device state machine, as reported by the statusword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DriveState {
    NotReadyToSwitchOn,
    SwitchOnDisabled,
    ReadyToSwitchOn,
    SwitchedOn,
    OperationEnabled,
    QuickStopActive,
    FaultReactionActive,
    Fault,
    /// The bit pattern matches no state.
    Unknown,
}
