use std::ffi::CString;

use itertools::Itertools;

use crate::command::{Move, PositionProfile};
use crate::config::{PollPolicy, Settings};
use crate::driver::{Driver, DriverResult, KeyHandle};
use crate::protocol::objects::{PositionActualValue, Status};
use crate::protocol::{Object, OperationMode, Statusword};
use crate::{DeviceErrorCode, Error, ErrorCode};

/// The main struct for driving an EPOS4.
///
/// Holds the vendor [`Driver`] and, while connected, the key handle of the open port.
/// Dropping an open [`Epos4`] closes the port.
pub struct Epos4<D>
where
    D: Driver,
{
    driver: D,
    settings: Settings,
    handle: Option<KeyHandle>,
}

#[cfg(feature = "eposcmd")]
impl Epos4<crate::EposCmd> {
    /// Loads the EposCmd library from `library` and creates a new, not yet opened, [`Epos4`].
    ///
    /// ```no_run
    /// # fn main() -> Result<(), epos4::Error> {
    /// let mut epos = epos4::Epos4::load("lib/EposCmd64.dll", epos4::Settings::default())?;
    /// epos.open()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(
        library: impl AsRef<std::path::Path>,
        settings: Settings,
    ) -> Result<Self, Error> {
        Ok(Self::new(crate::EposCmd::load(library)?, settings))
    }
}

impl<D> Epos4<D>
where
    D: Driver,
{
    /// Create a new [`Epos4`] instance with a given driver. The port is opened by [`Epos4::open`].
    pub fn new(driver: D, settings: Settings) -> Self {
        Self {
            driver,
            settings,
            handle: None,
        }
    }

    /// The settings this instance was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Node id of the drive, see [`Settings::node_id`].
    pub fn node_id(&self) -> u16 {
        self.settings.node_id
    }

    /// The key handle of the open port.
    pub fn handle(&self) -> Option<KeyHandle> {
        self.handle
    }

    /// Returns `true` while the port is open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The underlying driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn session(&self) -> Result<(KeyHandle, u16), Error> {
        let handle = self.handle.ok_or(Error::NotConnected)?;
        Ok((handle, self.settings.node_id))
    }

    fn driver_error(&self, op: &'static str, code: ErrorCode) -> Error {
        let description = self
            .driver
            .error_info(code)
            .unwrap_or_else(|| "unknown error".to_string());
        log::error!("Error Code {code}");
        log::error!("Description: {description}");
        Error::Driver {
            op,
            code,
            description,
        }
    }

    fn evaluate<T>(&self, op: &'static str, result: DriverResult<T>) -> Result<T, Error> {
        result.map_err(|code| self.driver_error(op, code))
    }

    /// Runs one vendor call against the open session.
    fn call<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut D, KeyHandle, u16) -> DriverResult<T>,
    ) -> Result<T, Error> {
        let (handle, node_id) = self.session()?;
        log::trace!("{op} (node {node_id})");
        let result = f(&mut self.driver, handle, node_id);
        self.evaluate(op, result)
    }

    /// Opens the port described by the [`Settings`]. Does nothing if already open.
    pub fn open(&mut self) -> Result<KeyHandle, Error> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        log::info!("node_id: {}", self.settings.node_id);
        let device = CString::new(self.settings.device_name.as_str())?;
        let protocol = CString::new(self.settings.protocol_stack_name.as_str())?;
        let interface = CString::new(self.settings.interface_name.as_str())?;
        let port = CString::new(self.settings.port_name.as_str())?;

        match self
            .driver
            .open_device(&device, &protocol, &interface, &port)
        {
            Ok(handle) => {
                log::info!("Keyhandle: {handle}");
                self.handle = Some(handle);
                Ok(handle)
            }
            Err(code) => {
                log::error!("Could not open port {}", self.settings.port_name);
                Err(self.driver_error("VCS_OpenDevice", code))
            }
        }
    }

    /// Closes the port. The handle is kept if the vendor library fails to close it.
    pub fn close(&mut self) -> Result<(), Error> {
        let handle = self.handle.ok_or(Error::NotConnected)?;
        let result = self.driver.close_device(handle);
        self.evaluate("VCS_CloseDevice", result)?;
        log::debug!("closed port {}", self.settings.port_name);
        self.handle = None;
        Ok(())
    }

    /// Checks the device error history. Fails with the most recent error if there is one.
    pub fn device_error(&mut self) -> Result<(), Error> {
        let count = self.call("VCS_GetNbOfDeviceError", |d, h, n| d.device_error_count(h, n))?;
        if count == 0 {
            return Ok(());
        }
        let code = self.call("VCS_GetDeviceErrorCode", |d, h, n| {
            d.device_error_code(h, n, 1)
        })?;
        if code == 0 {
            return Ok(());
        }
        let code = DeviceErrorCode(code);
        log::error!("Device Error: {code}");
        log::error!("For more information see Firmware Specification");
        Err(Error::DeviceFault(code))
    }

    /// Reads the whole device error history, most recent first.
    pub fn device_errors(&mut self) -> Result<Vec<DeviceErrorCode>, Error> {
        let count = self.call("VCS_GetNbOfDeviceError", |d, h, n| d.device_error_count(h, n))?;
        let mut errors = Vec::with_capacity(usize::from(count));
        for number in 1..=count {
            let code = self.call("VCS_GetDeviceErrorCode", |d, h, n| {
                d.device_error_code(h, n, number)
            })?;
            errors.push(DeviceErrorCode(code));
        }
        if !errors.is_empty() {
            log::warn!("device errors: {}", errors.iter().join(", "));
        }
        Ok(errors)
    }

    /// Resets the fault state and clears the device error history.
    pub fn clear_fault(&mut self) -> Result<(), Error> {
        self.call("VCS_ClearFault", |d, h, n| d.clear_fault(h, n))
    }

    /// Returns `true` if the drive is in the fault state.
    pub fn fault_state(&mut self) -> Result<bool, Error> {
        self.call("VCS_GetFaultState", |d, h, n| d.fault_state(h, n))
    }

    /// Switches to profile position mode.
    pub fn activate_profile_position_mode(&mut self) -> Result<(), Error> {
        self.call("VCS_ActivateProfilePositionMode", |d, h, n| {
            d.activate_profile_position_mode(h, n)
        })
    }

    /// Switches to profile velocity mode.
    pub fn activate_profile_velocity_mode(&mut self) -> Result<(), Error> {
        self.call("VCS_ActivateProfileVelocityMode", |d, h, n| {
            d.activate_profile_velocity_mode(h, n)
        })
    }

    /// Writes the modes of operation object. Unlike the `activate_*` functions, no mode
    /// parameters are written.
    pub fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), Error> {
        log::debug!("setting operation mode {mode:?}");
        self.call("VCS_SetOperationMode", |d, h, n| {
            d.set_operation_mode(h, n, mode.value())
        })
    }

    /// Reads the active operation mode.
    pub fn operation_mode(&mut self) -> Result<OperationMode, Error> {
        let mode = self.call("VCS_GetOperationMode", |d, h, n| d.operation_mode(h, n))?;
        OperationMode::try_from(mode)
    }

    /// Writes velocity, acceleration and deceleration of profile position moves.
    pub fn set_position_profile(&mut self, profile: PositionProfile) -> Result<(), Error> {
        self.call("VCS_SetPositionProfile", |d, h, n| {
            d.set_position_profile(
                h,
                n,
                profile.velocity,
                profile.acceleration,
                profile.deceleration,
            )
        })
    }

    /// Reads the position profile back from the drive.
    pub fn position_profile(&mut self) -> Result<PositionProfile, Error> {
        self.call("VCS_GetPositionProfile", |d, h, n| d.position_profile(h, n))
            .map(PositionProfile::from)
    }

    /// Prepares the drive for profile position moves and enables it.
    ///
    /// Activates profile position mode, sets the profile from the [`Settings`], checks the device
    /// error state and then switches to the enabled state.
    pub fn enable(&mut self) -> Result<(), Error> {
        self.activate_profile_position_mode()?;
        self.set_position_profile(self.settings.profile)?;
        self.device_error()?;
        self.call("VCS_SetEnableState", |d, h, n| d.set_enable_state(h, n))?;
        if self.call("VCS_GetEnableState", |d, h, n| d.enable_state(h, n))? {
            log::info!("Device Enabled");
            Ok(())
        } else {
            log::error!("Device Not Enabled!");
            Err(Error::NotEnabled)
        }
    }

    /// Switches to the disabled state and checks that the drive reports it.
    pub fn disable(&mut self) -> Result<(), Error> {
        self.call("VCS_SetDisableState", |d, h, n| d.set_disable_state(h, n))?;
        if self.call("VCS_GetDisableState", |d, h, n| d.disable_state(h, n))? {
            log::info!("Device Disabled");
            Ok(())
        } else {
            log::error!("Device could not be disabled");
            Err(Error::NotDisabled)
        }
    }

    /// Reads an object dictionary entry.
    ///
    /// ```no_run
    /// # fn main() -> Result<(), epos4::Error> {
    /// use epos4::protocol::objects::VelocityActualValue;
    ///
    /// let mut epos = epos4::Epos4::load("lib/EposCmd64.dll", epos4::Settings::default())?;
    /// epos.open()?;
    /// let velocity = epos.read_object::<VelocityActualValue>()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_object<O: Object>(&mut self) -> Result<O::Value, Error> {
        let mut buf = vec![0u8; O::SIZE];
        let read = self.call("VCS_GetObject", |d, h, n| {
            d.get_object(h, n, O::INDEX, O::SUB_INDEX, &mut buf)
        })?;
        let data = &buf[..read.min(O::SIZE)];
        log::trace!(
            "object {:#06x}:{:02x} = {}",
            O::INDEX,
            O::SUB_INDEX,
            hex::encode(data)
        );
        O::decode(data)
    }

    /// Reads the position actual value (`0x6064`) in increments.
    pub fn position(&mut self) -> Result<i32, Error> {
        let position = self.read_object::<PositionActualValue>()?;
        log::info!("Position Actual Value: {position} [inc]");
        Ok(position)
    }

    /// Reads the position actual value in increments through `VCS_GetPositionIs`.
    pub fn position_is(&mut self) -> Result<i32, Error> {
        let position = self.call("VCS_GetPositionIs", |d, h, n| d.position_is(h, n))?;
        log::info!("Position Actual Value: {position} [inc]");
        Ok(position)
    }

    /// Reads the velocity actual value through `VCS_GetVelocityIs`.
    pub fn velocity_is(&mut self) -> Result<i32, Error> {
        self.call("VCS_GetVelocityIs", |d, h, n| d.velocity_is(h, n))
    }

    /// Reads the statusword (`0x6041`).
    pub fn statusword(&mut self) -> Result<Statusword, Error> {
        self.read_object::<Status>()
    }

    /// Waits for the drive to start the last profile sent.
    ///
    /// Polls the statusword while the setpoint acknowledge bit is set, sleeping
    /// [`PollPolicy::interval`] between reads, at most [`PollPolicy::max_polls`] times.
    pub fn wait_acknowledged(&mut self) -> Result<(), Error> {
        let PollPolicy {
            interval,
            max_polls,
        } = self.settings.poll;
        let mut polls = 0;
        loop {
            let status = self.statusword()?;
            polls += 1;
            // bit 12 cleared: new profile started
            if !status.setpoint_acknowledged() {
                log::debug!("setpoint acknowledged after {polls} polls ({status})");
                return Ok(());
            }
            if polls > max_polls {
                log::warn!("setpoint not acknowledged ({status})");
                return Err(Error::AcknowledgeTimeout { polls });
            }
            std::thread::sleep(interval);
        }
    }

    /// Waits until the drive reports the target position reached.
    pub fn wait_target_reached(&mut self) -> Result<(), Error> {
        let PollPolicy {
            interval,
            max_polls,
        } = self.settings.poll;
        let mut polls = 0;
        loop {
            let reached = self.call("VCS_GetMovementState", |d, h, n| d.movement_state(h, n))?;
            polls += 1;
            if reached {
                log::debug!("target reached after {polls} polls");
                return Ok(());
            }
            if polls > max_polls {
                return Err(Error::TargetTimeout { polls });
            }
            std::thread::sleep(interval);
        }
    }

    fn send_move(&mut self, m: Move) -> Result<(), Error> {
        log::debug!("move {} ({:?}, {:?})", m.target, m.positioning, m.start);
        self.call("VCS_MoveToPosition", |d, h, n| {
            d.move_to_position(h, n, m.target, m.is_absolute(), m.is_immediate())
        })?;
        self.wait_acknowledged()
    }

    /// Sends a profile position move and waits for the drive to acknowledge it.
    ///
    /// Returns once the profile has started, not when the target is reached.
    /// See [`Epos4::wait_target_reached`].
    pub fn move_to(&mut self, m: Move) -> Result<(), Error> {
        self.send_move(m)?;
        log::info!("Move to {} started", m.target);
        Ok(())
    }

    /// Queues a move relative to the previous target.
    pub fn move_relative(&mut self, target: i32) -> Result<(), Error> {
        self.move_to(Move::relative(target))
    }

    /// Queues a move to an absolute position.
    pub fn move_absolute(&mut self, target: i32) -> Result<(), Error> {
        self.move_to(Move::absolute(target))
    }

    /// Stops the profile position move in progress.
    pub fn halt(&mut self) -> Result<(), Error> {
        self.call("VCS_HaltPositionMovement", |d, h, n| {
            d.halt_position_movement(h, n)
        })
    }

    /// Moves back and forth by `amplitude` increments, `cycles` times.
    ///
    /// Each move is queued while the previous one is still executing.
    pub fn cyclic(&mut self, cycles: u32, amplitude: i32) -> Result<(), Error> {
        log::info!("Wait finishing positioning...");
        for cycle in 1..=cycles {
            log::info!("Loop: {cycle}");
            self.send_move(Move::relative(amplitude))?;
            self.send_move(Move::relative(amplitude.saturating_neg()))?;
        }
        log::info!("Cyclic movement finished");
        Ok(())
    }

    /// Starts a profile velocity move. Requires profile velocity mode.
    pub fn move_with_velocity(&mut self, velocity: i32) -> Result<(), Error> {
        self.call("VCS_MoveWithVelocity", |d, h, n| {
            d.move_with_velocity(h, n, velocity)
        })
    }

    /// Stops the profile velocity move in progress.
    pub fn halt_velocity(&mut self) -> Result<(), Error> {
        self.call("VCS_HaltVelocityMovement", |d, h, n| {
            d.halt_velocity_movement(h, n)
        })
    }
}

impl<D> Drop for Epos4<D>
where
    D: Driver,
{
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.close() {
                log::warn!("failed to close device: {e}");
            }
        }
    }
}
