//! Byte-offset source positions.
//!
//! The PHPDoc parser and lexer work over a single doc-comment fragment's
//! text, so positions are plain byte offsets into that fragment — there is
//! no line/column tracking here (the host tokenizer already carries
//! line/column for the file as a whole; see spec §6).

pub use text_size::{TextRange, TextSize};

/// A `{startPos, endPos}` pair, as used by `Token` and `Fix` (spec §3).
///
/// Distinct from [`TextRange`] only in name — kept as its own type alias so
/// call sites read the way the spec's data model reads.
pub type Span = TextRange;
