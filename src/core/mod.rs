//! Small, dependency-free helpers shared by the lexer, parser, and walker.

mod interner;
mod ident;

pub use interner::{IStr, Interner};
pub use ident::{is_ident_continue, is_ident_start};
