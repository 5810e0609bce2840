//! Symwire core
//!
//! Turns a runtime value into a self-describing text tree for a host process:
//! - **Numeric codec**: doubles and complex parts as exact hex
//! - **Sanitizer**: markup escaping and reversible byte-level text escaping
//! - **Classifier**: ordered dispatch from runtime value to wire category
//! - **Encoder**: builds the [`WireValue`] tree through an [`ExpressionEngine`]
//! - **Driver**: renders trees to text; failures degrade to error items
//!
//! ```rust,ignore
//! use symwire_core::{Encoder, RenderOptions, RuntimeValue, TreeEngine, encode_and_render};
//!
//! let engine = TreeEngine::new();
//! let encoder = Encoder::new(&engine);
//! let doc = encode_and_render(&encoder, &RuntimeValue::Int(5), &RenderOptions::default());
//! ```

pub mod classify;
pub mod codec;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod render;
pub mod sanitize;
pub mod symbolic;
pub mod value;
pub mod wire;

pub use encoder::Encoder;
pub use engine::{EngineCapabilities, EngineVersion, ExpressionEngine, RenderOverrides, TreeEngine};
pub use error::{Result, WireError};
pub use fallback::startup_failure_envelope;
pub use render::{RenderOptions, encode_and_render, render, render_to, write_output};
pub use value::{MapKey, Mapping, RuntimeValue};
pub use wire::{Item, TypeTag, WireValue};
