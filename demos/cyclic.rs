//! Opens an EPOS4 on USB0, enables it in profile position mode and moves back and forth
//! ten times by 20000 increments.
//!
//! ```text
//! cargo run --example cyclic -- [path to EposCmd library] [-v|-vv]
//! ```
mod _logging;

use epos4::{Epos4, Settings};

fn main() -> Result<(), epos4::Error> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbosity = args
        .iter()
        .find(|a| a.starts_with("-v"))
        .map_or(0, |a| (a.len() - 1) as u8);
    _logging::init("cyclic", verbosity);

    let mut epos = match args.iter().find(|a| !a.starts_with('-')) {
        Some(path) => Epos4::load(path, Settings::default())?,
        None => Epos4::new(epos4::EposCmd::load_default()?, Settings::default()),
    };

    log::info!("Starting...");
    epos.open()?;
    epos.enable()?;

    log::info!("Moving...");
    epos.position()?;
    epos.cyclic(10, 20_000)?;
    epos.wait_target_reached()?;
    epos.position_is()?;

    log::info!("Closing...");
    epos.disable()?;
    epos.close()
}
