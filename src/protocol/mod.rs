//! CiA 402 / EPOS4 object dictionary entries read through `VCS_GetObject`, and the types decoded from them.
//!
//! The full object dictionary is described in the EPOS4 Firmware Specification.

mod mode;
pub mod objects;
mod statusword;

pub use mode::OperationMode;
pub use statusword::{DriveState, Statusword};

use crate::Error;

/// An entry of the device object dictionary.
///
/// Implementors describe where the entry lives (`INDEX`, `SUB_INDEX`), how many bytes it occupies,
/// and how those bytes (little-endian, as transferred by the device) decode into a value.
pub trait Object {
    /// Object dictionary index.
    const INDEX: u16;
    /// Object dictionary sub-index.
    const SUB_INDEX: u8;
    /// Size of the object in bytes.
    const SIZE: usize;
    /// The decoded type.
    type Value;

    /// Decodes the raw bytes read from the device.
    fn decode(bytes: &[u8]) -> Result<Self::Value, Error>;
}
