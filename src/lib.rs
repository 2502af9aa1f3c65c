//! Parsing and translation core of a markdown trading-plan editor.
//!
//! The editor itself (windows, autosave, clipboard) lives elsewhere; this
//! crate owns the two subsystems with actual grammar in them:
//!
//! - [`notation`] parses the trader shorthand dialects and compiles them
//!   into readable sentences;
//! - [`plan`] and [`entries`] parse and serialize the canonical
//!   three-section plan document and its image-anchored entries.

pub mod config;
pub mod entries;
pub mod error;
pub mod notation;
pub mod plan;

pub use config::Config;
pub use error::{PlanError, Result};
