//! Caller-supplied value decoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::Result;

/// How a value given on the command line is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueEncoding {
    /// The string's UTF-8 bytes
    #[default]
    Raw,

    /// Standard-alphabet base64
    Base64,
}

/// Decode `value` to bytes; malformed base64 is a `Decode` error
pub fn decode_value(value: &str, encoding: ValueEncoding) -> Result<Vec<u8>> {
    match encoding {
        ValueEncoding::Raw => Ok(value.as_bytes().to_vec()),
        ValueEncoding::Base64 => Ok(STANDARD.decode(value)?),
    }
}
