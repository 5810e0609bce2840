//! Expression engine seam.
//!
//! The encoder never inspects symbolic payloads itself. It asks an
//! [`ExpressionEngine`] for an exact re-parseable representation, a default
//! string and pretty renderings. What the engine can do is described once by
//! its [`EngineCapabilities`], read when the encoder is built.

pub mod overrides;
mod pretty;
pub mod tree;

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::symbolic::Symbolic;

pub use overrides::{RenderOverrides, Rewrite};
pub use tree::TreeEngine;

/// Character set used for pretty output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrettyStyle {
    Ascii,
    Unicode,
}

/// Loose dotted version, e.g. `1.5.1` or `1.6.dev`.
///
/// Components are compared numerically; a `.dev` marker is ignored and any
/// component that does not start with a digit ends the version.
#[derive(Debug, Clone)]
pub struct EngineVersion {
    text: String,
    parts: Vec<u64>,
}

impl EngineVersion {
    pub fn parse(text: &str) -> Self {
        let parts = text
            .split('.')
            .map_while(|component| {
                let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<u64>().ok()
            })
            .collect();
        EngineVersion {
            text: text.to_string(),
            parts,
        }
    }

}

impl PartialEq for EngineVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EngineVersion {}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Missing trailing components count as zero, so `1.5 == 1.5.0`.
impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        let padded = |parts: &[u64], i: usize| parts.get(i).copied().unwrap_or(0);
        (0..len)
            .map(|i| padded(&self.parts, i).cmp(&padded(&other.parts, i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What an engine supports, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCapabilities {
    pub name: String,
    pub version: EngineVersion,
    /// Whether [`PrettyStyle::Unicode`] output is available.
    pub unicode_pretty: bool,
}

/// The external numeric/symbolic engine.
pub trait ExpressionEngine {
    fn capabilities(&self) -> EngineCapabilities;

    /// Exact representation from which the value can be rebuilt, assumptions
    /// included.
    fn srepr(&self, value: &Symbolic) -> Result<String>;

    /// Default one-line rendering.
    fn to_str(&self, value: &Symbolic) -> String;

    /// Two-dimensional rendering. May fail for shapes the layout cannot
    /// express; callers fall back to [`ExpressionEngine::to_str`].
    fn pretty(&self, value: &Symbolic, style: PrettyStyle) -> Result<String>;
}
