//! A rust library for driving maxon [EPOS4](https://www.maxongroup.com/epos) positioning controllers through the
//! vendor EposCmd library.
//!
//! The [`Epos4`] facade opens a port, checks the device error state, switches operation modes, enables and disables the
//! drive, sends profile position moves and polls the status of a single node. Every vendor call goes through the
//! [`driver::Driver`] trait; [`EposCmd`] implements it over the shared library loaded at runtime.
//!
//! ```no_run
//! # fn main() -> Result<(), epos4::Error> {
//! let mut epos = epos4::Epos4::load("lib/EposCmd64.dll", epos4::Settings::default())?;
//! epos.open()?;
//! epos.enable()?;
//! epos.move_relative(20_000)?;
//! epos.wait_target_reached()?;
//! epos.disable()?;
//! epos.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true
)]
#![deny(
// missing_debug_implementations,
missing_docs,
trivial_casts,
trivial_numeric_casts,
unused_extern_crates,
unused_import_braces,
unused_qualifications,
// unused_results
)]
#![warn(clippy::unwrap_used)]

pub mod command;
mod config;
mod device;
pub mod driver;
mod error;
pub mod protocol;

pub use config::{PollPolicy, Settings};
pub use device::Epos4;
#[cfg(feature = "eposcmd")]
pub use driver::EposCmd;
pub use error::*;
