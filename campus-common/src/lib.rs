//! Common utilities for the campus-route toolkit

pub mod error;

pub use error::{suggest_correction, Error, Result};
