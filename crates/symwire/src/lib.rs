//! Symwire CLI Library
//!
//! Configuration, process startup and the command implementations behind the
//! `symwire` binary.

pub mod commands;
pub mod config;
pub mod error;
pub mod startup;

pub use config::SymwireConfig;
pub use error::StartupError;
