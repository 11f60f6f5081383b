//! A trait over the vendor command library functions used to drive the device.
//!
//! Each method maps onto one `VCS_*` function. A call succeeds when the vendor function returns
//! a non-zero value and leaves the error code at `0`; otherwise the method returns the error code.

#[cfg(feature = "eposcmd")]
mod eposcmd;
#[cfg(test)]
pub(crate) mod mock;

#[cfg(feature = "eposcmd")]
pub use eposcmd::EposCmd;

use std::ffi::CStr;

use crate::ErrorCode;

/// The handle of an open device connection, as returned by `VCS_OpenDevice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub usize);

impl std::fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:8}", self.0)
    }
}

/// Result of a single vendor call.
pub type DriverResult<T> = Result<T, ErrorCode>;

/// The vendor functions needed by [`crate::Epos4`].
#[allow(missing_docs)]
pub trait Driver {
    /// `VCS_OpenDevice`. Opens the port and returns the key handle used by every other call.
    fn open_device(
        &mut self,
        device_name: &CStr,
        protocol_stack_name: &CStr,
        interface_name: &CStr,
        port_name: &CStr,
    ) -> DriverResult<KeyHandle>;

    /// `VCS_CloseDevice`
    fn close_device(&mut self, handle: KeyHandle) -> DriverResult<()>;

    /// `VCS_GetErrorInfo`. Returns the description of a communication error code.
    fn error_info(&self, code: ErrorCode) -> Option<String>;

    /// `VCS_GetNbOfDeviceError`
    fn device_error_count(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<u8>;

    /// `VCS_GetDeviceErrorCode`. `error_number` starts at 1, the most recent error.
    fn device_error_code(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        error_number: u8,
    ) -> DriverResult<u32>;

    fn clear_fault(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()>;

    fn fault_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool>;

    fn activate_profile_position_mode(&mut self, handle: KeyHandle, node_id: u16)
        -> DriverResult<()>;

    fn activate_profile_velocity_mode(&mut self, handle: KeyHandle, node_id: u16)
        -> DriverResult<()>;

    fn set_operation_mode(&mut self, handle: KeyHandle, node_id: u16, mode: i8)
        -> DriverResult<()>;

    fn operation_mode(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i8>;

    /// `VCS_SetPositionProfile`. Velocity in rpm, acceleration and deceleration in rpm/s.
    fn set_position_profile(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        velocity: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> DriverResult<()>;

    /// `VCS_GetPositionProfile`. Returns `(velocity, acceleration, deceleration)`.
    fn position_profile(&mut self, handle: KeyHandle, node_id: u16)
        -> DriverResult<(u32, u32, u32)>;

    fn set_enable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()>;

    fn enable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool>;

    fn set_disable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()>;

    fn disable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool>;

    /// `VCS_GetObject`. Reads up to `data.len()` bytes of an object and returns the number of bytes read.
    fn get_object(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        index: u16,
        sub_index: u8,
        data: &mut [u8],
    ) -> DriverResult<usize>;

    fn position_is(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i32>;

    fn velocity_is(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i32>;

    /// `VCS_MoveToPosition`. `absolute == false` moves relative to the current target,
    /// `immediately == false` queues the profile behind the one in progress.
    fn move_to_position(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        target: i32,
        absolute: bool,
        immediately: bool,
    ) -> DriverResult<()>;

    fn halt_position_movement(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()>;

    /// `VCS_GetMovementState`. Returns `true` once the target is reached.
    fn movement_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool>;

    fn move_with_velocity(&mut self, handle: KeyHandle, node_id: u16, velocity: i32)
        -> DriverResult<()>;

    fn halt_velocity_movement(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()>;
}
