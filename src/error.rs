use thiserror::Error;

/// Errors that can occur when driving an EPOS4.
#[derive(Error, Debug)]
pub enum Error {
    /// The vendor library could not be loaded, or a function is missing from it.
    #[error("failed to load EposCmd library: {reason}")]
    Library {
        /// The loader's error message.
        reason: String,
    },
    /// A vendor function reported a failure.
    /// `description` is the text the vendor library returns for `code`.
    #[error("{op} failed with error code {code}: {description}")]
    Driver {
        /// The vendor function that failed, e.g. `VCS_SetEnableState`.
        op: &'static str,
        /// The communication error code returned through the error code output parameter.
        code: ErrorCode,
        /// Human readable description of `code`.
        description: String,
    },
    /// The device itself is in an error state. See the EPOS4 firmware specification for the meaning of the code.
    #[error("device error {0}")]
    DeviceFault(DeviceErrorCode),
    /// The operation needs an open connection.
    #[error("no open connection to the device")]
    NotConnected,
    /// The enable state was requested but the device did not report being enabled.
    #[error("device not enabled")]
    NotEnabled,
    /// The disable state was requested but the device did not report being disabled.
    #[error("device could not be disabled")]
    NotDisabled,
    /// The setpoint acknowledge bit of the statusword stayed set.
    #[error("setpoint not acknowledged after {polls} polls")]
    AcknowledgeTimeout {
        /// The number of times the statusword was read.
        polls: u32,
    },
    /// The target position was not reached in time.
    #[error("target not reached after {polls} polls")]
    TargetTimeout {
        /// The number of times the movement state was read.
        polls: u32,
    },
    /// Fewer bytes than the object's size were returned when reading an object.
    #[error("short read of object {index:#06x}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Object dictionary index.
        index: u16,
        /// Size of the object in bytes.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },
    /// The device reported an operation mode this crate does not know.
    #[error("unknown operation mode: {0}")]
    UnknownOperationMode(i8),
    /// A connection setting contained an interior nul byte.
    #[error(transparent)]
    InvalidString(#[from] std::ffi::NulError),
}

#[cfg(feature = "eposcmd")]
impl From<libloading::Error> for Error {
    fn from(e: libloading::Error) -> Self {
        Error::Library {
            reason: e.to_string(),
        }
    }
}

/// A communication error code, returned by every vendor function through its error code output parameter.
///
/// `0` means no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    /// The code reported when a call succeeded.
    pub const NONE: ErrorCode = ErrorCode(0);

    /// Returns `true` if the code signals an error.
    pub fn is_err(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// An entry of the device error history, as stored by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceErrorCode(pub u32);

impl std::fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_display_as_padded_hex() {
        assert_eq!(ErrorCode(0x1000_0003).to_string(), "0x10000003");
        assert_eq!(DeviceErrorCode(0x8611).to_string(), "0x00008611");
    }

    #[test]
    fn driver_error_message() {
        let e = Error::Driver {
            op: "VCS_OpenDevice",
            code: ErrorCode(0x1000_0001),
            description: "Internal error".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "VCS_OpenDevice failed with error code 0x10000001: Internal error"
        );
        assert!(!ErrorCode::NONE.is_err());
    }
}
