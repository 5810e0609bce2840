//! Failure reporting when encoding cannot run or cannot finish.
//!
//! Two tiers:
//!
//! - [`startup_failure_envelope`] is for failures before the encoder exists
//!   (bad configuration, engine unavailable). It is a fixed string built with
//!   nothing but [`escape_markup`], so it works when everything else is broken.
//! - [`internal_error`] is for an encode that started and failed. The error
//!   becomes an `INTERNAL_ERROR` item rendered the normal way.

use crate::error::WireError;
use crate::render::{RenderOptions, render};
use crate::sanitize::escape_markup;
use crate::wire::WireValue;

/// First string of every startup failure envelope.
pub const STARTUP_SENTINEL: &str = "INTERNAL_STARTUP_ERROR";

/// Wire code of a STRING item.
const STRING_CODE: &str = "1003";

/// Tier-1 report: a list of two strings, the sentinel then `"{kind}: {message}"`.
pub fn startup_failure_envelope(kind: &str, message: &str) -> String {
    let detail = escape_markup(&format!("{kind}: {message}"));
    format!(
        "<output_block>\n<list>\n\
         <item>\n<f>{STRING_CODE}</f>\n<f>{STARTUP_SENTINEL}</f>\n</item>\n\
         <item>\n<f>{STRING_CODE}</f>\n<f>{detail}</f>\n</item>\n\
         </list>\n</output_block>\n"
    )
}

/// Tier-2 report, rendered.
pub fn internal_error(err: &WireError, options: &RenderOptions) -> String {
    render(&WireValue::internal_error(err), options)
}
