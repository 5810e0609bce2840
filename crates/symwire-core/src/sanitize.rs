//! Text escaping.
//!
//! Two unrelated escapers live here:
//!
//! - [`escape_markup`] is the bare minimum needed to put text inside an
//!   element. The startup fallback uses it because nothing else may be
//!   available at that point.
//! - [`escape_text`] / [`unescape_text`] make arbitrary Unicode (multi-line
//!   pretty output, control characters, quotes) travel as a single printable
//!   ASCII field. Escaping works on the UTF-8 bytes:
//!
//! | byte                      | escaped  |
//! |---------------------------|----------|
//! | `\`                       | `\\`     |
//! | `'`                       | `\'`     |
//! | tab, newline, return      | `\t` `\n` `\r` |
//! | other `< 0x20` or `>= 0x7f` | `\xhh` |

use crate::error::{Result, WireError};

/// Escape `&`, `<` and `>` for embedding raw text inside markup.
pub fn escape_markup(s: &str) -> String {
    // `&` goes first so its own replacement is not escaped twice
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape arbitrary text into printable ASCII.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &byte in s.as_bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                out.push_str("\\x");
                out.push_str(&hex::encode([byte]));
            }
        }
    }
    out
}

/// Invert [`escape_text`].
pub fn unescape_text(s: &str) -> Result<String> {
    let mut bytes = Vec::with_capacity(s.len());
    let mut iter = s.bytes().enumerate();
    while let Some((pos, byte)) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let (_, code) = iter
            .next()
            .ok_or_else(|| WireError::MalformedEscape(format!("trailing backslash at {pos}")))?;
        match code {
            b'\\' => bytes.push(b'\\'),
            b'\'' => bytes.push(b'\''),
            b't' => bytes.push(b'\t'),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b'x' => {
                let digits = s.get(pos + 2..pos + 4).ok_or_else(|| {
                    WireError::MalformedEscape(format!("truncated \\x escape at {pos}"))
                })?;
                let decoded = hex::decode(digits).map_err(|e| {
                    WireError::MalformedEscape(format!("bad \\x escape at {pos}: {e}"))
                })?;
                bytes.extend_from_slice(&decoded);
                iter.nth(1);
            }
            other => {
                return Err(WireError::MalformedEscape(format!(
                    "unknown escape \\{} at {pos}",
                    char::from(other)
                )));
            }
        }
    }
    String::from_utf8(bytes)
        .map_err(|e| WireError::MalformedEscape(format!("escaped bytes are not UTF-8: {e}")))
}
