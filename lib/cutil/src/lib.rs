//! # CUtil - Common Utilities Library
//!
//! Small helpers shared by the editor crates.
//!
//! ## Features
//!
//! - `fs`: Human readable byte sizes
//! - `time`: Timestamps for generated file names

#[cfg(feature = "fs")]
pub mod fs;

#[cfg(feature = "time")]
pub mod time;
