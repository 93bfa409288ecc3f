//! Agent loop, command selection, channel abstraction and configuration.

pub mod agent;
pub mod channel;
pub mod config;

pub use agent::{Agent, AgentError, TaskOutcome};
pub use channel::{AgentEvent, Channel, ChannelError};
pub use config::Config;
