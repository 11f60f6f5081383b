//! Object dictionary entries used by this crate.

use byteorder::{ReadBytesExt, LE};

use super::{Object, Statusword};
use crate::Error;

/// Used to define a read-only object dictionary entry
macro_rules! object {
    ($(#[$meta:meta])* $name:ident : $index:literal : $sub:literal, $size:literal => $type:ty, $decode:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl Object for $name {
            const INDEX: u16 = $index;
            const SUB_INDEX: u8 = $sub;
            const SIZE: usize = $size;
            type Value = $type;

            fn decode(bytes: &[u8]) -> Result<$type, Error> {
                let decode: fn(&[u8]) -> std::io::Result<$type> = $decode;
                decode(bytes).map_err(|_| Error::ShortRead {
                    index: $index,
                    expected: $size,
                    actual: bytes.len(),
                })
            }
        }
    };
}

object!(
    /// Error Register (`0x1001`). Bit 0 is set while any error is pending.
    ErrorRegister: 0x1001:0x00, 1 => u8,
    |mut b| b.read_u8()
);
object!(
    /// Error code (`0x603F`) of the last error that occurred in the drive.
    LastErrorCode: 0x603F:0x00, 2 => u16,
    |mut b| b.read_u16::<LE>()
);
object!(
    /// Statusword (`0x6041`).
    Status: 0x6041:0x00, 2 => Statusword,
    |mut b| b.read_u16::<LE>().map(Statusword)
);
object!(
    /// Modes of operation display (`0x6061`). The raw value, see [`super::OperationMode`].
    ModesOfOperationDisplay: 0x6061:0x00, 1 => i8,
    |mut b| b.read_i8()
);
object!(
    /// Position actual value (`0x6064`) in increments.
    PositionActualValue: 0x6064:0x00, 4 => i32,
    |mut b| b.read_i32::<LE>()
);
object!(
    /// Velocity actual value (`0x606C`) in velocity units (rpm by default).
    VelocityActualValue: 0x606C:0x00, 4 => i32,
    |mut b| b.read_i32::<LE>()
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn addresses() {
        assert_eq!(PositionActualValue::INDEX, 0x6064);
        assert_eq!(PositionActualValue::SIZE, 4);
        assert_eq!(Status::INDEX, 0x6041);
        assert_eq!(Status::SUB_INDEX, 0x00);
        assert_eq!(Status::SIZE, 2);
    }

    #[test]
    fn decode_little_endian() {
        assert_eq!(
            PositionActualValue::decode(&[0x20, 0x4e, 0x00, 0x00]).unwrap(),
            20000
        );
        assert_eq!(
            PositionActualValue::decode(&[0xe0, 0xb1, 0xff, 0xff]).unwrap(),
            -20000
        );
        assert_eq!(
            Status::decode(&[0x37, 0x14]).unwrap(),
            Statusword(0x1437)
        );
        assert_eq!(ModesOfOperationDisplay::decode(&[0xff]).unwrap(), -1);
        assert_eq!(ErrorRegister::decode(&[0x01]).unwrap(), 0x01);
        assert_eq!(LastErrorCode::decode(&[0x11, 0x86]).unwrap(), 0x8611);
    }

    #[test]
    fn decode_short_buffer() {
        let err = PositionActualValue::decode(&[0x01, 0x02]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead {
                index: 0x6064,
                expected: 4,
                actual: 2
            }
        ));
    }
}
