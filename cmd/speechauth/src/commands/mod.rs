//! CLI commands module.

mod cli_config;
mod config;
mod enroll;
mod identify;
mod session;
mod util;
mod verify;

pub use config::ConfigCommand;
pub use enroll::EnrollCommand;
pub use identify::IdentifyCommand;
pub use verify::VerifyCommand;

pub(crate) use util::*;
