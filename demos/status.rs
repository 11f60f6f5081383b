//! Prints the state of node 1 without moving it: statusword, operation mode,
//! position, velocity, the error register and the device error history.
//!
//! Pass `--clear` to reset a fault after printing it.
mod _logging;

use epos4::protocol::objects::{ErrorRegister, LastErrorCode};
use epos4::{Epos4, Settings};

fn main() -> Result<(), epos4::Error> {
    _logging::init("status", 0);
    let clear = std::env::args().any(|a| a == "--clear");

    let mut epos = Epos4::new(epos4::EposCmd::load_default()?, Settings::default());
    epos.open()?;

    let status = epos.statusword()?;
    log::info!("Statusword: {status}");
    log::info!("Operation mode: {:?}", epos.operation_mode()?);
    epos.position_is()?;
    log::info!("Velocity Actual Value: {} [rpm]", epos.velocity_is()?);

    log::info!("Error register: {:#04x}", epos.read_object::<ErrorRegister>()?);
    let errors = epos.device_errors()?;
    if errors.is_empty() {
        log::info!("No device errors");
    } else {
        log::info!(
            "Last error code: {:#06x}",
            epos.read_object::<LastErrorCode>()?
        );
    }
    if clear && (status.fault() || epos.fault_state()?) {
        epos.clear_fault()?;
        log::info!("Fault cleared");
    }
    epos.close()
}
