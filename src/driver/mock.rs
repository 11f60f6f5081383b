//! A scripted [`Driver`] recording every call, used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::CStr;
use std::rc::Rc;

use super::{Driver, DriverResult, KeyHandle};
use crate::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    OpenDevice {
        device: String,
        protocol: String,
        interface: String,
        port: String,
    },
    CloseDevice(KeyHandle),
    DeviceErrorCount,
    DeviceErrorCode(u8),
    ClearFault,
    FaultState,
    ActivateProfilePositionMode,
    ActivateProfileVelocityMode,
    SetOperationMode(i8),
    OperationMode,
    SetPositionProfile(u32, u32, u32),
    PositionProfile,
    SetEnableState,
    EnableState,
    SetDisableState,
    DisableState,
    GetObject { index: u16, sub_index: u8, len: usize },
    PositionIs,
    VelocityIs,
    MoveToPosition {
        target: i32,
        absolute: bool,
        immediately: bool,
    },
    HaltPositionMovement,
    MovementState,
    MoveWithVelocity(i32),
    HaltVelocityMovement,
}

pub(crate) struct MockDriver {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub nodes: Vec<u16>,
    /// Vendor function names which fail with the given code.
    pub failures: HashMap<&'static str, ErrorCode>,
    pub handle: usize,
    pub open_error: ErrorCode,
    pub device_errors: Vec<u32>,
    pub fault: bool,
    pub enabled: bool,
    pub disabled: bool,
    pub mode: i8,
    pub profile: (u32, u32, u32),
    pub position: i32,
    pub velocity: i32,
    /// Replies to `VCS_GetObject`. The last reply of a queue repeats.
    pub objects: HashMap<(u16, u8), VecDeque<Vec<u8>>>,
    /// Replies to `VCS_GetMovementState`. The last reply repeats.
    pub target_reached: VecDeque<bool>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            calls: Rc::default(),
            nodes: Vec::new(),
            failures: HashMap::new(),
            handle: 0x1234,
            open_error: ErrorCode::NONE,
            device_errors: Vec::new(),
            fault: false,
            enabled: true,
            disabled: true,
            mode: 1,
            profile: (0, 0, 0),
            position: 0,
            velocity: 0,
            objects: HashMap::new(),
            target_reached: VecDeque::from([true]),
        }
    }
}

impl MockDriver {
    pub fn with_object(mut self, index: u16, sub_index: u8, replies: &[&[u8]]) -> Self {
        let _ = self.objects.insert(
            (index, sub_index),
            replies.iter().map(|r| r.to_vec()).collect(),
        );
        self
    }

    pub fn failing(mut self, op: &'static str, code: u32) -> Self {
        let _ = self.failures.insert(op, ErrorCode(code));
        self
    }

    fn record(&mut self, op: &'static str, node_id: u16, call: Call) -> DriverResult<()> {
        self.nodes.push(node_id);
        self.calls.borrow_mut().push(call);
        match self.failures.get(op) {
            Some(code) => Err(*code),
            None => Ok(()),
        }
    }
}

fn next<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

fn lossy(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

impl Driver for MockDriver {
    fn open_device(
        &mut self,
        device_name: &CStr,
        protocol_stack_name: &CStr,
        interface_name: &CStr,
        port_name: &CStr,
    ) -> DriverResult<KeyHandle> {
        self.calls.borrow_mut().push(Call::OpenDevice {
            device: lossy(device_name),
            protocol: lossy(protocol_stack_name),
            interface: lossy(interface_name),
            port: lossy(port_name),
        });
        if self.handle == 0 {
            Err(self.open_error)
        } else {
            Ok(KeyHandle(self.handle))
        }
    }

    fn close_device(&mut self, handle: KeyHandle) -> DriverResult<()> {
        self.calls.borrow_mut().push(Call::CloseDevice(handle));
        match self.failures.get("VCS_CloseDevice") {
            Some(code) => Err(*code),
            None => Ok(()),
        }
    }

    fn error_info(&self, code: ErrorCode) -> Option<String> {
        match code.0 {
            0x1000_0001 => Some("Internal error".to_string()),
            0x1000_0003 => Some("Handle not valid".to_string()),
            _ => None,
        }
    }

    fn device_error_count(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<u8> {
        self.record("VCS_GetNbOfDeviceError", node_id, Call::DeviceErrorCount)?;
        Ok(self.device_errors.len() as u8)
    }

    fn device_error_code(
        &mut self,
        _: KeyHandle,
        node_id: u16,
        error_number: u8,
    ) -> DriverResult<u32> {
        self.record(
            "VCS_GetDeviceErrorCode",
            node_id,
            Call::DeviceErrorCode(error_number),
        )?;
        Ok(self
            .device_errors
            .get(usize::from(error_number).wrapping_sub(1))
            .copied()
            .unwrap_or(0))
    }

    fn clear_fault(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record("VCS_ClearFault", node_id, Call::ClearFault)?;
        self.fault = false;
        self.device_errors.clear();
        Ok(())
    }

    fn fault_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<bool> {
        self.record("VCS_GetFaultState", node_id, Call::FaultState)?;
        Ok(self.fault)
    }

    fn activate_profile_position_mode(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record(
            "VCS_ActivateProfilePositionMode",
            node_id,
            Call::ActivateProfilePositionMode,
        )?;
        self.mode = 1;
        Ok(())
    }

    fn activate_profile_velocity_mode(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record(
            "VCS_ActivateProfileVelocityMode",
            node_id,
            Call::ActivateProfileVelocityMode,
        )?;
        self.mode = 3;
        Ok(())
    }

    fn set_operation_mode(&mut self, _: KeyHandle, node_id: u16, mode: i8) -> DriverResult<()> {
        self.record("VCS_SetOperationMode", node_id, Call::SetOperationMode(mode))?;
        self.mode = mode;
        Ok(())
    }

    fn operation_mode(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<i8> {
        self.record("VCS_GetOperationMode", node_id, Call::OperationMode)?;
        Ok(self.mode)
    }

    fn set_position_profile(
        &mut self,
        _: KeyHandle,
        node_id: u16,
        velocity: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> DriverResult<()> {
        self.record(
            "VCS_SetPositionProfile",
            node_id,
            Call::SetPositionProfile(velocity, acceleration, deceleration),
        )?;
        self.profile = (velocity, acceleration, deceleration);
        Ok(())
    }

    fn position_profile(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<(u32, u32, u32)> {
        self.record("VCS_GetPositionProfile", node_id, Call::PositionProfile)?;
        Ok(self.profile)
    }

    fn set_enable_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record("VCS_SetEnableState", node_id, Call::SetEnableState)
    }

    fn enable_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<bool> {
        self.record("VCS_GetEnableState", node_id, Call::EnableState)?;
        Ok(self.enabled)
    }

    fn set_disable_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record("VCS_SetDisableState", node_id, Call::SetDisableState)
    }

    fn disable_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<bool> {
        self.record("VCS_GetDisableState", node_id, Call::DisableState)?;
        Ok(self.disabled)
    }

    fn get_object(
        &mut self,
        _: KeyHandle,
        node_id: u16,
        index: u16,
        sub_index: u8,
        data: &mut [u8],
    ) -> DriverResult<usize> {
        self.record(
            "VCS_GetObject",
            node_id,
            Call::GetObject {
                index,
                sub_index,
                len: data.len(),
            },
        )?;
        let reply = self
            .objects
            .get_mut(&(index, sub_index))
            .and_then(next)
            .ok_or(ErrorCode(0x0602_0000))?;
        let n = reply.len().min(data.len());
        data[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn position_is(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<i32> {
        self.record("VCS_GetPositionIs", node_id, Call::PositionIs)?;
        Ok(self.position)
    }

    fn velocity_is(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<i32> {
        self.record("VCS_GetVelocityIs", node_id, Call::VelocityIs)?;
        Ok(self.velocity)
    }

    fn move_to_position(
        &mut self,
        _: KeyHandle,
        node_id: u16,
        target: i32,
        absolute: bool,
        immediately: bool,
    ) -> DriverResult<()> {
        self.record(
            "VCS_MoveToPosition",
            node_id,
            Call::MoveToPosition {
                target,
                absolute,
                immediately,
            },
        )
    }

    fn halt_position_movement(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record("VCS_HaltPositionMovement", node_id, Call::HaltPositionMovement)
    }

    fn movement_state(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<bool> {
        self.record("VCS_GetMovementState", node_id, Call::MovementState)?;
        Ok(next(&mut self.target_reached).unwrap_or(true))
    }

    fn move_with_velocity(&mut self, _: KeyHandle, node_id: u16, velocity: i32) -> DriverResult<()> {
        self.record("VCS_MoveWithVelocity", node_id, Call::MoveWithVelocity(velocity))
    }

    fn halt_velocity_movement(&mut self, _: KeyHandle, node_id: u16) -> DriverResult<()> {
        self.record("VCS_HaltVelocityMovement", node_id, Call::HaltVelocityMovement)
    }
}
