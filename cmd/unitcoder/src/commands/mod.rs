//! CLI commands module.

mod config;
mod encode;
mod slice;
mod util;

pub use config::ConfigCommand;
pub use encode::EncodeCommand;
pub use slice::SliceCommand;

pub(crate) use util::*;
