//! Foundation types shared by every other module.
//!
//! This module has no dependencies on any other module in the crate.

mod span;

pub use span::{Span, TextRange, TextSize};
