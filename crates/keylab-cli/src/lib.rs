//! Keylab CLI library.
//!
//! This crate provides the command implementations behind the `keylab`
//! binary, the session configuration lookup and the offline timeline used to
//! perform key sequences.

pub mod commands;
pub mod settings;
pub mod timeline;
