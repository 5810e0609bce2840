//! Exact numeric codec.
//!
//! Doubles cross the wire as the hex spelling of their big-endian IEEE-754
//! bytes, so every bit (sign of zero, NaN payload, infinities) survives:
//!
//! ```text
//! 2.5   -> 4004000000000000
//! -0.0  -> 8000000000000000
//! ```

use crate::error::{Result, WireError};

/// Number of bytes in one encoded double.
pub const DOUBLE_BYTES: usize = 8;

/// Encode a double as 16 lowercase hex digits.
pub fn encode_double(x: f64) -> String {
    hex::encode(x.to_be_bytes())
}

/// Decode the output of [`encode_double`] back to the identical double.
pub fn decode_double(text: &str) -> Result<f64> {
    let bytes = hex::decode(text).map_err(|e| WireError::MalformedHex(format!("{text:?}: {e}")))?;
    let bytes: [u8; DOUBLE_BYTES] = bytes.try_into().map_err(|bytes: Vec<u8>| {
        WireError::MalformedHex(format!(
            "{text:?}: expected {DOUBLE_BYTES} bytes, found {}",
            bytes.len()
        ))
    })?;
    Ok(f64::from_be_bytes(bytes))
}

/// Encode a complex number as its real and imaginary hex fields.
pub fn encode_complex(re: f64, im: f64) -> [String; 2] {
    [encode_double(re), encode_double(im)]
}

/// Decode a pair of complex fields.
pub fn decode_complex(re: &str, im: &str) -> Result<(f64, f64)> {
    Ok((decode_double(re)?, decode_double(im)?))
}
