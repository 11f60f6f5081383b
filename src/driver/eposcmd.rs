//! [`Driver`] backed by the maxon EposCmd shared library, loaded at runtime.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::path::Path;

use libloading::Library;

use super::{Driver, DriverResult, KeyHandle};
use crate::{Error, ErrorCode};

type Handle = *mut c_void;
type Bool = c_int;

type OpenDevice = unsafe extern "system" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    *mut u32,
) -> Handle;
type CloseDevice = unsafe extern "system" fn(Handle, *mut u32) -> Bool;
type GetErrorInfo = unsafe extern "system" fn(u32, *mut c_char, u16) -> Bool;
type GetNbOfDeviceError = unsafe extern "system" fn(Handle, u16, *mut u8, *mut u32) -> Bool;
type GetDeviceErrorCode = unsafe extern "system" fn(Handle, u16, u8, *mut u32, *mut u32) -> Bool;
/// Functions taking only a node id, e.g. `VCS_SetEnableState`.
type NodeCommand = unsafe extern "system" fn(Handle, u16, *mut u32) -> Bool;
/// Functions reading a single flag, e.g. `VCS_GetEnableState`.
type NodeFlag = unsafe extern "system" fn(Handle, u16, *mut Bool, *mut u32) -> Bool;
/// Functions reading a single 32 bit value, e.g. `VCS_GetPositionIs`.
type NodeValue = unsafe extern "system" fn(Handle, u16, *mut i32, *mut u32) -> Bool;
type SetOperationMode = unsafe extern "system" fn(Handle, u16, c_char, *mut u32) -> Bool;
type GetOperationMode = unsafe extern "system" fn(Handle, u16, *mut c_char, *mut u32) -> Bool;
type SetPositionProfile = unsafe extern "system" fn(Handle, u16, u32, u32, u32, *mut u32) -> Bool;
type GetPositionProfile =
    unsafe extern "system" fn(Handle, u16, *mut u32, *mut u32, *mut u32, *mut u32) -> Bool;
type GetObject = unsafe extern "system" fn(
    Handle,
    u16,
    u16,
    u8,
    *mut c_void,
    u32,
    *mut u32,
    *mut u32,
) -> Bool;
type MoveToPosition = unsafe extern "system" fn(Handle, u16, i32, Bool, Bool, *mut u32) -> Bool;
type MoveWithVelocity = unsafe extern "system" fn(Handle, u16, i32, *mut u32) -> Bool;

/// Size of the buffer handed to `VCS_GetErrorInfo`.
const ERROR_INFO_LEN: usize = 255;

#[cfg(windows)]
const DEFAULT_LIBRARY: &str = "EposCmd64.dll";
#[cfg(not(windows))]
const DEFAULT_LIBRARY: &str = "libEposCmd.so";

/// The EposCmd library with every function used by this crate resolved.
pub struct EposCmd {
    open_device: OpenDevice,
    close_device: CloseDevice,
    get_error_info: GetErrorInfo,
    get_nb_of_device_error: GetNbOfDeviceError,
    get_device_error_code: GetDeviceErrorCode,
    clear_fault: NodeCommand,
    get_fault_state: NodeFlag,
    activate_profile_position_mode: NodeCommand,
    activate_profile_velocity_mode: NodeCommand,
    set_operation_mode: SetOperationMode,
    get_operation_mode: GetOperationMode,
    set_position_profile: SetPositionProfile,
    get_position_profile: GetPositionProfile,
    set_enable_state: NodeCommand,
    get_enable_state: NodeFlag,
    set_disable_state: NodeCommand,
    get_disable_state: NodeFlag,
    get_object: GetObject,
    get_position_is: NodeValue,
    get_velocity_is: NodeValue,
    move_to_position: MoveToPosition,
    halt_position_movement: NodeCommand,
    get_movement_state: NodeFlag,
    move_with_velocity: MoveWithVelocity,
    halt_velocity_movement: NodeCommand,
    // Keeps the function pointers above valid.
    _library: Library,
}

unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> Result<T, Error> {
    Ok(*library.get::<T>(name)?)
}

impl EposCmd {
    /// Loads the library from `path` and resolves the `VCS_*` functions.
    ///
    /// ```no_run
    /// # fn main() -> Result<(), epos4::Error> {
    /// let driver = epos4::EposCmd::load("lib/EposCmd64.dll")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("loading EposCmd from {}", path.display());
        // SAFETY: EposCmd runs no initialisation routines with preconditions on load, and every
        // symbol below is cast to the signature declared in the EposCmd definitions header.
        unsafe {
            let library = Library::new(path)?;
            Ok(Self {
                open_device: symbol(&library, b"VCS_OpenDevice\0")?,
                close_device: symbol(&library, b"VCS_CloseDevice\0")?,
                get_error_info: symbol(&library, b"VCS_GetErrorInfo\0")?,
                get_nb_of_device_error: symbol(&library, b"VCS_GetNbOfDeviceError\0")?,
                get_device_error_code: symbol(&library, b"VCS_GetDeviceErrorCode\0")?,
                clear_fault: symbol(&library, b"VCS_ClearFault\0")?,
                get_fault_state: symbol(&library, b"VCS_GetFaultState\0")?,
                activate_profile_position_mode: symbol(
                    &library,
                    b"VCS_ActivateProfilePositionMode\0",
                )?,
                activate_profile_velocity_mode: symbol(
                    &library,
                    b"VCS_ActivateProfileVelocityMode\0",
                )?,
                set_operation_mode: symbol(&library, b"VCS_SetOperationMode\0")?,
                get_operation_mode: symbol(&library, b"VCS_GetOperationMode\0")?,
                set_position_profile: symbol(&library, b"VCS_SetPositionProfile\0")?,
                get_position_profile: symbol(&library, b"VCS_GetPositionProfile\0")?,
                set_enable_state: symbol(&library, b"VCS_SetEnableState\0")?,
                get_enable_state: symbol(&library, b"VCS_GetEnableState\0")?,
                set_disable_state: symbol(&library, b"VCS_SetDisableState\0")?,
                get_disable_state: symbol(&library, b"VCS_GetDisableState\0")?,
                get_object: symbol(&library, b"VCS_GetObject\0")?,
                get_position_is: symbol(&library, b"VCS_GetPositionIs\0")?,
                get_velocity_is: symbol(&library, b"VCS_GetVelocityIs\0")?,
                move_to_position: symbol(&library, b"VCS_MoveToPosition\0")?,
                halt_position_movement: symbol(&library, b"VCS_HaltPositionMovement\0")?,
                get_movement_state: symbol(&library, b"VCS_GetMovementState\0")?,
                move_with_velocity: symbol(&library, b"VCS_MoveWithVelocity\0")?,
                halt_velocity_movement: symbol(&library, b"VCS_HaltVelocityMovement\0")?,
                _library: library,
            })
        }
    }

    /// Loads the library by its platform file name (`EposCmd64.dll` or `libEposCmd.so`) from the default search path.
    pub fn load_default() -> Result<Self, Error> {
        Self::load(DEFAULT_LIBRARY)
    }

    fn node_command(f: NodeCommand, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        let mut code: u32 = 0;
        let ok = unsafe { f(raw(handle), node_id, &mut code) };
        check(ok, code)
    }

    fn node_flag(f: NodeFlag, handle: KeyHandle, node_id: u16) -> DriverResult<bool> {
        let mut flag: Bool = 0;
        let mut code: u32 = 0;
        let ok = unsafe { f(raw(handle), node_id, &mut flag, &mut code) };
        check(ok, code).map(|_| flag != 0)
    }

    fn node_value(f: NodeValue, handle: KeyHandle, node_id: u16) -> DriverResult<i32> {
        let mut value: i32 = 0;
        let mut code: u32 = 0;
        let ok = unsafe { f(raw(handle), node_id, &mut value, &mut code) };
        check(ok, code).map(|_| value)
    }
}

fn raw(handle: KeyHandle) -> Handle {
    handle.0 as Handle
}

fn check(ok: Bool, code: u32) -> DriverResult<()> {
    if ok != 0 && code == 0 {
        Ok(())
    } else {
        Err(ErrorCode(code))
    }
}

impl Driver for EposCmd {
    fn open_device(
        &mut self,
        device_name: &CStr,
        protocol_stack_name: &CStr,
        interface_name: &CStr,
        port_name: &CStr,
    ) -> DriverResult<KeyHandle> {
        let mut code: u32 = 0;
        let handle = unsafe {
            (self.open_device)(
                device_name.as_ptr(),
                protocol_stack_name.as_ptr(),
                interface_name.as_ptr(),
                port_name.as_ptr(),
                &mut code,
            )
        };
        if handle.is_null() {
            Err(ErrorCode(code))
        } else {
            Ok(KeyHandle(handle as usize))
        }
    }

    fn close_device(&mut self, handle: KeyHandle) -> DriverResult<()> {
        let mut code: u32 = 0;
        let ok = unsafe { (self.close_device)(raw(handle), &mut code) };
        check(ok, code)
    }

    fn error_info(&self, code: ErrorCode) -> Option<String> {
        let mut buf = [0u8; ERROR_INFO_LEN];
        let ok = unsafe {
            (self.get_error_info)(code.0, buf.as_mut_ptr().cast(), ERROR_INFO_LEN as u16)
        };
        if ok == 0 {
            return None;
        }
        let info = CStr::from_bytes_until_nul(&buf).ok()?;
        Some(info.to_string_lossy().trim_end().to_string())
    }

    fn device_error_count(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<u8> {
        let mut count: u8 = 0;
        let mut code: u32 = 0;
        let ok =
            unsafe { (self.get_nb_of_device_error)(raw(handle), node_id, &mut count, &mut code) };
        check(ok, code).map(|_| count)
    }

    fn device_error_code(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        error_number: u8,
    ) -> DriverResult<u32> {
        let mut device_error: u32 = 0;
        let mut code: u32 = 0;
        let ok = unsafe {
            (self.get_device_error_code)(
                raw(handle),
                node_id,
                error_number,
                &mut device_error,
                &mut code,
            )
        };
        check(ok, code).map(|_| device_error)
    }

    fn clear_fault(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        Self::node_command(self.clear_fault, handle, node_id)
    }

    fn fault_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool> {
        Self::node_flag(self.get_fault_state, handle, node_id)
    }

    fn activate_profile_position_mode(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
    ) -> DriverResult<()> {
        Self::node_command(self.activate_profile_position_mode, handle, node_id)
    }

    fn activate_profile_velocity_mode(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
    ) -> DriverResult<()> {
        Self::node_command(self.activate_profile_velocity_mode, handle, node_id)
    }

    fn set_operation_mode(&mut self, handle: KeyHandle, node_id: u16, mode: i8) -> DriverResult<()> {
        let mut code: u32 = 0;
        let mode = c_char::from_ne_bytes(mode.to_ne_bytes());
        let ok = unsafe { (self.set_operation_mode)(raw(handle), node_id, mode, &mut code) };
        check(ok, code)
    }

    fn operation_mode(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i8> {
        let mut mode: c_char = 0;
        let mut code: u32 = 0;
        let ok = unsafe { (self.get_operation_mode)(raw(handle), node_id, &mut mode, &mut code) };
        check(ok, code).map(|_| i8::from_ne_bytes(mode.to_ne_bytes()))
    }

    fn set_position_profile(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        velocity: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> DriverResult<()> {
        let mut code: u32 = 0;
        let ok = unsafe {
            (self.set_position_profile)(
                raw(handle),
                node_id,
                velocity,
                acceleration,
                deceleration,
                &mut code,
            )
        };
        check(ok, code)
    }

    fn position_profile(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
    ) -> DriverResult<(u32, u32, u32)> {
        let (mut velocity, mut acceleration, mut deceleration) = (0u32, 0u32, 0u32);
        let mut code: u32 = 0;
        let ok = unsafe {
            (self.get_position_profile)(
                raw(handle),
                node_id,
                &mut velocity,
                &mut acceleration,
                &mut deceleration,
                &mut code,
            )
        };
        check(ok, code).map(|_| (velocity, acceleration, deceleration))
    }

    fn set_enable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        Self::node_command(self.set_enable_state, handle, node_id)
    }

    fn enable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool> {
        Self::node_flag(self.get_enable_state, handle, node_id)
    }

    fn set_disable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        Self::node_command(self.set_disable_state, handle, node_id)
    }

    fn disable_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool> {
        Self::node_flag(self.get_disable_state, handle, node_id)
    }

    fn get_object(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        index: u16,
        sub_index: u8,
        data: &mut [u8],
    ) -> DriverResult<usize> {
        let mut read: u32 = 0;
        let mut code: u32 = 0;
        let ok = unsafe {
            (self.get_object)(
                raw(handle),
                node_id,
                index,
                sub_index,
                data.as_mut_ptr().cast(),
                data.len() as u32,
                &mut read,
                &mut code,
            )
        };
        check(ok, code).map(|_| read as usize)
    }

    fn position_is(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i32> {
        Self::node_value(self.get_position_is, handle, node_id)
    }

    fn velocity_is(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<i32> {
        Self::node_value(self.get_velocity_is, handle, node_id)
    }

    fn move_to_position(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        target: i32,
        absolute: bool,
        immediately: bool,
    ) -> DriverResult<()> {
        let mut code: u32 = 0;
        let ok = unsafe {
            (self.move_to_position)(
                raw(handle),
                node_id,
                target,
                Bool::from(absolute),
                Bool::from(immediately),
                &mut code,
            )
        };
        check(ok, code)
    }

    fn halt_position_movement(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        Self::node_command(self.halt_position_movement, handle, node_id)
    }

    fn movement_state(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<bool> {
        Self::node_flag(self.get_movement_state, handle, node_id)
    }

    fn move_with_velocity(
        &mut self,
        handle: KeyHandle,
        node_id: u16,
        velocity: i32,
    ) -> DriverResult<()> {
        let mut code: u32 = 0;
        let ok = unsafe { (self.move_with_velocity)(raw(handle), node_id, velocity, &mut code) };
        check(ok, code)
    }

    fn halt_velocity_movement(&mut self, handle: KeyHandle, node_id: u16) -> DriverResult<()> {
        Self::node_command(self.halt_velocity_movement, handle, node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_needs_success_and_zero_code() {
        assert_eq!(check(1, 0), Ok(()));
        assert_eq!(check(0, 0x1000_0003), Err(ErrorCode(0x1000_0003)));
        assert_eq!(check(1, 0x0503_0000), Err(ErrorCode(0x0503_0000)));
    }

    #[test]
    fn missing_library() {
        assert!(matches!(
            EposCmd::load("/nonexistent/libEposCmd.so"),
            Err(Error::Library { .. })
        ));
    }
}
