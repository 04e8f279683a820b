//! The canonical type data model (spec §3): `Atom`, `CanonicalType`,
//! `Fix`, `PassSplat`, and `ParseResult`.
//!
//! A canonical type is a union-of-intersections (DNF). Internally we keep
//! each intersection as a sorted, deduplicated `Vec<Atom>` rather than a
//! string, so the comparator and canonicalizer can manipulate components
//! directly; [`CanonicalType::render`] (and its `Display` impl) produce the
//! spec's string grammar (`union := intersection ('|' intersection)*`).

use std::fmt;

use smol_str::SmolStr;

use crate::base::{Span, TextSize};

/// One of the fixed lowercase keywords from spec §3, or a qualified class
/// name, or the synthetic `static(FQ)` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Int,
    Float,
    Bool,
    String,
    Array,
    Iterable,
    Object,
    Callable,
    Resource,
    Mixed,
    Never,
    Null,
    Void,
    SelfTy,
    Parent,
    ArrayKey,
    Scalar,
    CallableString,
    /// A namespace-qualified class name, including its leading `\`.
    Class(SmolStr),
    /// `static(FQ)` — late static binding resolved against a known class.
    Static(SmolStr),
}

impl Atom {
    pub fn class(fq: impl Into<SmolStr>) -> Atom {
        Atom::Class(fq.into())
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Atom::Mixed)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Atom::Never)
    }

    /// Intersection is permitted only between `object`, `iterable`,
    /// `callable`, or user class names (spec §4.2).
    pub fn can_intersect(&self) -> bool {
        matches!(self, Atom::Object | Atom::Iterable | Atom::Callable | Atom::Class(_))
    }

    /// `{int, string}`/`{bool, float, array-key}`/`{Traversable, array}`
    /// union-absorption rules key off these three predicates.
    pub fn is_int_or_string(&self) -> bool {
        matches!(self, Atom::Int | Atom::String)
    }

    pub fn is_bool_float_or_array_key(&self) -> bool {
        matches!(self, Atom::Bool | Atom::Float | Atom::ArrayKey)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Int => write!(f, "int"),
            Atom::Float => write!(f, "float"),
            Atom::Bool => write!(f, "bool"),
            Atom::String => write!(f, "string"),
            Atom::Array => write!(f, "array"),
            Atom::Iterable => write!(f, "iterable"),
            Atom::Object => write!(f, "object"),
            Atom::Callable => write!(f, "callable"),
            Atom::Resource => write!(f, "resource"),
            Atom::Mixed => write!(f, "mixed"),
            Atom::Never => write!(f, "never"),
            Atom::Null => write!(f, "null"),
            Atom::Void => write!(f, "void"),
            Atom::SelfTy => write!(f, "self"),
            Atom::Parent => write!(f, "parent"),
            Atom::ArrayKey => write!(f, "array-key"),
            Atom::Scalar => write!(f, "scalar"),
            Atom::CallableString => write!(f, "callable-string"),
            Atom::Class(name) => write!(f, "{name}"),
            Atom::Static(fq) => write!(f, "static({fq})"),
        }
    }
}

/// An intersection of atoms (`A&B&C`), kept sorted and deduplicated so two
/// structurally equal intersections always render identically — needed for
/// canonicalization idempotence even though spec §3 only states the sort
/// requirement for unions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Intersection(pub Vec<Atom>);

impl Intersection {
    pub fn single(atom: Atom) -> Self {
        Intersection(vec![atom])
    }

    pub fn sort_dedup(&mut self) {
        self.0.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        self.0.dedup_by(|a, b| a == b);
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join("&"))
    }
}

/// A canonical type: a union of intersections, sorted and deduplicated
/// lexicographically by rendered intersection text (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalType {
    pub unions: Vec<Intersection>,
}

impl CanonicalType {
    pub fn atom(atom: Atom) -> Self {
        CanonicalType {
            unions: vec![Intersection::single(atom)],
        }
    }

    pub fn mixed() -> Self {
        CanonicalType::atom(Atom::Mixed)
    }

    pub fn never() -> Self {
        CanonicalType::atom(Atom::Never)
    }

    pub fn null() -> Self {
        CanonicalType::atom(Atom::Null)
    }

    pub fn is_mixed(&self) -> bool {
        self.unions.len() == 1 && self.unions[0].0.len() == 1 && self.unions[0].0[0].is_mixed()
    }

    pub fn is_never(&self) -> bool {
        self.unions.len() == 1 && self.unions[0].0.len() == 1 && self.unions[0].0[0].is_never()
    }

    pub fn contains_null(&self) -> bool {
        self.unions
            .iter()
            .any(|i| i.0.len() == 1 && matches!(i.0[0], Atom::Null))
    }

    /// Append `|null`, matching the literal-concatenation `|null` append the
    /// source does for an implicit-nullable default (spec §9: preserved as
    /// written, no re-canonicalization on this path).
    pub fn append_null_literal(&self) -> SmolStr {
        SmolStr::new(format!("{self}|null"))
    }

    pub fn sort_dedup(&mut self) {
        for i in &mut self.unions {
            i.sort_dedup();
        }
        self.unions.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        self.unions.dedup_by(|a, b| a == b);
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.unions.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

/// `&`/`...` (or their concatenation) on a parameter, per spec §3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSplat {
    pub by_ref: bool,
    pub variadic: bool,
}

impl PassSplat {
    pub fn as_str(&self) -> &'static str {
        match (self.by_ref, self.variadic) {
            (true, true) => "&...",
            (true, false) => "&",
            (false, true) => "...",
            (false, false) => "",
        }
    }
}

impl fmt::Display for PassSplat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source-span replacement proposed by the parser for a style correction
/// (spec §3). Replacements are applied right-to-left over the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub pos: TextSize,
    pub len: TextSize,
    pub replacement: SmolStr,
}

impl Fix {
    pub fn new(pos: TextSize, len: TextSize, replacement: impl Into<SmolStr>) -> Self {
        Fix {
            pos,
            len,
            replacement: replacement.into(),
        }
    }

    pub fn range(&self) -> Span {
        Span::new(self.pos, self.pos + self.len)
    }
}

/// Apply a set of fixes to `src`, right-to-left, and return the corrected
/// text (spec §3, §8 "Fix round-trip").
pub fn apply_fixes(src: &str, fixes: &[Fix]) -> String {
    let mut out = src.to_string();
    let mut sorted: Vec<&Fix> = fixes.iter().collect();
    sorted.sort_by_key(|f| std::cmp::Reverse(u32::from(f.pos)));
    for fix in sorted {
        let start = u32::from(fix.pos) as usize;
        let end = start + u32::from(fix.len) as usize;
        out.replace_range(start..end, &fix.replacement);
    }
    out
}

/// The result of one `parse_type_and_name`/`parse_template` invocation
/// (spec §3).
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub ty: Option<CanonicalType>,
    pub pass_splat: PassSplat,
    pub name: Option<SmolStr>,
    pub rem: SmolStr,
    pub fixed: Option<SmolStr>,
    pub phpfig: bool,
    /// Set when an implicit-nullable default (`= null` on a non-nullable
    /// native type) applied. The appended `|null` is *not* folded into
    /// `ty` — spec §9 preserves that append as literal concatenation, not
    /// a re-canonicalized union member. Callers that need the literal
    /// rendered form call [`CanonicalType::append_null_literal`] on `ty`.
    pub implicit_nullable_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_sorts_lexicographically() {
        let mut i = Intersection(vec![Atom::class("\\Zeta"), Atom::class("\\Alpha")]);
        i.sort_dedup();
        assert_eq!(i.to_string(), "\\Alpha&\\Zeta");
    }

    #[test]
    fn union_sorts_and_dedupes() {
        let mut t = CanonicalType {
            unions: vec![
                Intersection::single(Atom::String),
                Intersection::single(Atom::Int),
                Intersection::single(Atom::Int),
            ],
        };
        t.sort_dedup();
        assert_eq!(t.to_string(), "int|string");
    }

    #[test]
    fn apply_fixes_handles_overlap_free_right_to_left() {
        let src = "integer|boolean";
        let fixes = vec![
            Fix::new(TextSize::new(0), TextSize::new(7), "int"),
            Fix::new(TextSize::new(8), TextSize::new(7), "bool"),
        ];
        assert_eq!(apply_fixes(src, &fixes), "int|bool");
    }

    #[test]
    fn append_null_literal_is_plain_concatenation() {
        let t = CanonicalType::atom(Atom::class("\\Foo"));
        assert_eq!(t.append_null_literal(), "\\Foo|null");
    }
}
