//! # phpdoc-typecheck
//!
//! A static analyzer that checks PHPDoc type annotations (`@param`,
//! `@return`, `@var`) against a PHP declaration's native type, reporting
//! mismatches, style deviations, and PHP-FIG conformance.
//!
//! ## Module structure (dependency order)
//!
//! ```text
//! walker     → DeclarationWalker: two-pass traversal, the 7-row check table
//!   ↓
//! comparator → compareTypes: wide/narrow type-compatibility
//! parser     → TypeParser: text fragment → CanonicalType
//!   ↓
//! hierarchy  → HierarchyOracle: class/interface supertype closure
//! scope      → Scope: namespace/uses/templates/self/parent context
//! shim       → ReportingShim: the host diagnostic bridge
//! config     → Config: which checks run
//!   ↓
//! types      → CanonicalType, Atom, Fix, ParseResult
//! lexer      → TypeLexer: hand-rolled cursor over a type-expression fragment
//! base, core → primitives (TextSize/Span, identifier classification)
//! ```

/// Foundation types: `Span`/`TextSize`.
pub mod base;

/// Identifier classification and small interning helpers shared by the
/// lexer, parser, and walker.
pub mod core;

/// Sniff configuration: which checks run, and the strict/default presets.
pub mod config;

/// Crate-level error type: host-contract violations only.
pub mod error;

/// The canonical type data model: `Atom`, `CanonicalType`, `Fix`,
/// `PassSplat`, `ParseResult`.
pub mod types;

/// Hand-rolled lexer over a PHPDoc type-expression fragment.
pub mod lexer;

/// Per-declaration resolution context: namespace, `use` imports,
/// templates, `self`/`parent` identity.
pub mod scope;

/// Class/interface supertype closure, built-in and user-declared.
pub mod hierarchy;

/// `compareTypes`: wide/narrow type-compatibility.
pub mod comparator;

/// Recursive-descent parser and canonicalizer for a type-expression
/// fragment.
pub mod parser;

/// The host diagnostic bridge (`ReportingShim`) and stable diagnostic
/// codes.
pub mod shim;

/// `DeclarationWalker`: the two-pass host-token traversal that drives
/// everything above it, plus the host tokenizer/file contract it consumes.
pub mod walker;

/// In-memory test doubles for `HostTokens`/`HostFile`/`ReportingShim`,
/// for use by this crate's own tests and by embedders exercising the
/// walker without a live host.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use comparator::compare_types;
pub use config::Config;
pub use hierarchy::Artifacts;
pub use parser::{parse_template, parse_type_and_name, Want};
pub use scope::Scope;
pub use shim::{codes, ReportingShim};
pub use types::{Atom, CanonicalType, Fix, ParseResult, PassSplat};
pub use walker::DeclarationWalker;
