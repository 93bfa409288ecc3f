//! Console frontend for the Conch agent.

pub mod cli;
mod input;
pub mod render;

pub use cli::CliChannel;
