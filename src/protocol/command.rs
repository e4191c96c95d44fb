//! Command definitions
//!
//! Represents commands from clients.

use crate::container::Container;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    Create = 0x02,
    Update = 0x03,
    Delete = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List every container in a namespace
    List { namespace: String },

    /// Create a container
    Create {
        namespace: String,
        container: Container,
    },

    /// Replace a container's data
    Update {
        namespace: String,
        container: Container,
    },

    /// Delete a container by exact name
    Delete { namespace: String, name: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List { .. } => CommandType::List,
            Command::Create { .. } => CommandType::Create,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
