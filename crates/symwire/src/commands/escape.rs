//! Escape Commands
//!
//! Apply or reverse the text escaping used for STRING fields and pretty
//! renderings.

use starbase::AppResult;
use symwire_core::sanitize::{escape_text, unescape_text};

pub fn run_escape(text: String) -> AppResult {
    println!("{}", escape_text(&text));
    Ok(None)
}

pub fn run_unescape(text: String) -> AppResult {
    match unescape_text(&text) {
        Ok(raw) => {
            println!("{raw}");
            Ok(None)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(Some(1))
        }
    }
}
