//! Hex Command
//!
//! Converts between doubles and their exact hex wire form.

use starbase::AppResult;
use symwire_core::codec::{decode_double, encode_double};

/// The value and its raw bits, so NaN payloads stay visible.
fn describe(value: f64) -> String {
    format!("{value:?} (bits 0x{:016x})", value.to_bits())
}

pub fn run_hex_encode(value: f64) -> AppResult {
    println!("{}", encode_double(value));
    Ok(None)
}

pub fn run_hex_decode(text: String) -> AppResult {
    match decode_double(&text) {
        Ok(value) => {
            println!("{}", describe(value));
            Ok(None)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(Some(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_shows_bits() {
        assert_eq!(describe(2.5), "2.5 (bits 0x4004000000000000)");
        assert_eq!(describe(-0.0), "-0.0 (bits 0x8000000000000000)");
    }

    #[test]
    fn test_describe_keeps_nan_payload() {
        let nan = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(describe(nan), "NaN (bits 0x7ff8000000000001)");
    }
}
