//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - LIST:   ns_len (4) + namespace
//! - CREATE: ns_len (4) + namespace + bincode(container)
//! - UPDATE: ns_len (4) + namespace + bincode(container)
//! - DELETE: ns_len (4) + namespace + name
//! - PING:   empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut};

use super::{Command, Response, Status};
use crate::container::Container;
use crate::error::{Error, Result};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let cmd_type = command.command_type() as u8;

    let mut payload = Vec::new();
    match command {
        Command::List { namespace } => {
            put_str(&mut payload, namespace);
        }
        Command::Create {
            namespace,
            container,
        }
        | Command::Update {
            namespace,
            container,
        } => {
            put_str(&mut payload, namespace);
            payload.put_slice(&bincode::serialize(container)?);
        }
        Command::Delete { namespace, name } => {
            put_str(&mut payload, namespace);
            payload.put_slice(name.as_bytes());
        }
        Command::Ping => {}
    }

    frame(cmd_type, &payload, "Command")
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    match cmd_type {
        0x01 => {
            let mut payload = payload;
            let namespace = take_str(&mut payload, "LIST")?;
            expect_empty(payload, "LIST")?;
            Ok(Command::List { namespace })
        }
        0x02 => {
            let (namespace, container) = decode_container_payload(payload, "CREATE")?;
            Ok(Command::Create {
                namespace,
                container,
            })
        }
        0x03 => {
            let (namespace, container) = decode_container_payload(payload, "UPDATE")?;
            Ok(Command::Update {
                namespace,
                container,
            })
        }
        0x04 => {
            let mut payload = payload;
            let namespace = take_str(&mut payload, "DELETE")?;
            let name = utf8(payload.to_vec(), "DELETE")?;
            Ok(Command::Delete { namespace, name })
        }
        0x05 => {
            expect_empty(payload, "PING")?;
            Ok(Command::Ping)
        }
        _ => Err(Error::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

fn decode_container_payload(mut payload: &[u8], what: &str) -> Result<(String, Container)> {
    let namespace = take_str(&mut payload, what)?;
    let container = bincode::deserialize(payload)
        .map_err(|e| Error::Protocol(format!("{} command: bad container: {}", what, e)))?;
    Ok((namespace, container))
}

/// Take a length-prefixed UTF-8 string off the front of `payload`
fn take_str(payload: &mut &[u8], what: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(Error::Protocol(format!(
            "{} command: missing namespace length",
            what
        )));
    }
    let len = payload.get_u32() as usize;
    if payload.remaining() < len {
        return Err(Error::Protocol(format!(
            "{} command: incomplete namespace (expected {}, got {})",
            what,
            len,
            payload.remaining()
        )));
    }
    let bytes = payload[..len].to_vec();
    payload.advance(len);
    utf8(bytes, what)
}

fn put_str(payload: &mut Vec<u8>, s: &str) {
    payload.put_u32(s.len() as u32);
    payload.put_slice(s.as_bytes());
}

fn utf8(bytes: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| Error::Protocol(format!("{} command: invalid UTF-8", what)))
}

fn expect_empty(payload: &[u8], what: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(Error::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload, "Response")
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        0x03 => Status::Conflict,
        _ => {
            return Err(Error::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8], what: &str) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(Error::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what,
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    Ok(message)
}

/// Validate the header and return (kind byte, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let kind = bytes[0];
    let payload_len = payload_len(&bytes[..HEADER_SIZE], what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(Error::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

fn payload_len(header: &[u8], what: &str) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(Error::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one full frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = payload_len(&header, what)?;

    let mut message = vec![0u8; HEADER_SIZE + len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a response, or an ERROR response in its place if it cannot be framed
///
/// Nothing reaches `writer` before framing succeeds, so the peer always
/// gets exactly one response.
pub fn write_response_or_error<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    match encode_response(response) {
        Ok(bytes) => {
            writer.write_all(&bytes)?;
            writer.flush()?;
            Ok(())
        }
        Err(Error::Protocol(reason)) => {
            tracing::warn!("Replacing unframeable response: {}", reason);
            write_response(writer, &Response::error(&reason))
        }
        Err(e) => Err(e),
    }
}
