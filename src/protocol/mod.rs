//! Protocol Module
//!
//! Defines the wire protocol between `kvsecrets` clients and the container
//! store server.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LIST    - Payload: namespace
//! - 0x02: CREATE  - Payload: namespace + container
//! - 0x03: UPDATE  - Payload: namespace + container
//! - 0x04: DELETE  - Payload: namespace + name
//! - 0x05: PING    - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        (bincode containers for LIST/CREATE/UPDATE)
//! - 0x01: NOT_FOUND (container name)
//! - 0x02: ERROR     (message)
//! - 0x03: CONFLICT  (container name)

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, write_response_or_error, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
