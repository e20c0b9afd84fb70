//! CLI Commands

mod init;
mod simulate;

pub use init::InitCommand;
pub use simulate::SimulateCommand;
