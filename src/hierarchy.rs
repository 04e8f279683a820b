//! `HierarchyOracle`: supertype lookup across the fixed built-in table and
//! the walker-populated table of user-declared classish artifacts (spec
//! §4.3).
//!
//! Two tables back class-name lookups:
//!
//! - [`Library`] — a static, built-in table of well-known PHP SPL/core
//!   interfaces and classes and their direct supertypes. Populated once,
//!   lazily, via [`std::sync::LazyLock`] (no reason to pull in `once_cell`
//!   as a main dependency just for this).
//! - [`Artifacts`] — the per-run table the walker's first pass builds from
//!   the target program's own `class`/`interface`/`trait`/`enum`
//!   declarations.
//!
//! [`super_types`] walks both tables together with a worklist, so a
//! diamond or even a cyclic `extends`/`implements` graph (malformed input,
//! but the walker must never loop forever on it) terminates.
//! [`super_types_of_atom`] layers the primitive-coercion rules (`int`,
//! `array-key`, …) and `static(X)`'s expansion on top.

use std::sync::LazyLock;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::types::Atom;

/// Direct-supertype table for names the target program declares itself.
/// Keyed and valued by fully-qualified name (leading `\`).
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    direct_supertypes: FxHashMap<SmolStr, Vec<SmolStr>>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` directly extends/implements `supertype`. Called
    /// once per `extends`/`implements` clause during the walker's
    /// artifact-collection pass.
    pub fn add_direct_supertype(&mut self, name: impl Into<SmolStr>, supertype: impl Into<SmolStr>) {
        self.direct_supertypes
            .entry(name.into())
            .or_default()
            .push(supertype.into());
    }

    pub fn declares(&self, name: &str) -> bool {
        self.direct_supertypes.contains_key(name)
    }

    fn direct(&self, name: &str) -> &[SmolStr] {
        self.direct_supertypes
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The fixed built-in table: every name here is reachable by `\`-qualified
/// name and lists its direct supertypes only — `super_types` takes the
/// transitive closure.
static LIBRARY: LazyLock<FxHashMap<&'static str, &'static [&'static str]>> = LazyLock::new(|| {
    let mut m: FxHashMap<&'static str, &'static [&'static str]> = FxHashMap::default();
    m.insert("\\Traversable", &[]);
    m.insert("\\Iterator", &["\\Traversable"]);
    m.insert("\\IteratorAggregate", &["\\Traversable"]);
    m.insert("\\ArrayAccess", &[]);
    m.insert("\\Countable", &[]);
    m.insert("\\Stringable", &[]);
    m.insert("\\Throwable", &[]);
    m.insert("\\JsonSerializable", &[]);
    m.insert("\\Exception", &["\\Throwable"]);
    m.insert("\\Error", &["\\Throwable"]);
    m.insert("\\TypeError", &["\\Error"]);
    m.insert("\\ValueError", &["\\Error"]);
    m.insert("\\ArgumentCountError", &["\\TypeError"]);
    m.insert("\\RuntimeException", &["\\Exception"]);
    m.insert("\\LogicException", &["\\Exception"]);
    m.insert("\\InvalidArgumentException", &["\\LogicException"]);
    m.insert("\\OutOfRangeException", &["\\LogicException"]);
    m.insert("\\OutOfBoundsException", &["\\RuntimeException"]);
    m.insert("\\ArrayObject", &["\\IteratorAggregate", "\\ArrayAccess", "\\Countable"]);
    m.insert("\\ArrayIterator", &["\\Iterator", "\\ArrayAccess", "\\Countable"]);
    m.insert("\\Generator", &["\\Iterator"]);
    m.insert("\\Closure", &[]);
    m.insert("\\stdClass", &[]);
    m.insert("\\DateTimeInterface", &[]);
    m.insert("\\DateTime", &["\\DateTimeInterface"]);
    m.insert("\\DateTimeImmutable", &["\\DateTimeInterface"]);
    m
});

fn library_direct(name: &str) -> &'static [&'static str] {
    LIBRARY.get(name).copied().unwrap_or(&[])
}

/// Every ancestor of `base_type` in `Artifacts` union `Library`, excluding
/// `base_type` itself and duplicates (spec §4.3). Cycle-safe: a worklist
/// with a `visited` set never revisits a name.
pub fn super_types(base_type: &str, artifacts: &Artifacts) -> Vec<SmolStr> {
    let mut visited: FxHashSet<SmolStr> = FxHashSet::default();
    let mut worklist: Vec<SmolStr> = Vec::new();
    let mut result: Vec<SmolStr> = Vec::new();

    visited.insert(SmolStr::new(base_type));
    for direct in artifacts.direct(base_type) {
        worklist.push(direct.clone());
    }
    for direct in library_direct(base_type) {
        worklist.push(SmolStr::new(*direct));
    }

    while let Some(name) = worklist.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        result.push(name.clone());
        for direct in artifacts.direct(&name) {
            if !visited.contains(direct) {
                worklist.push(direct.clone());
            }
        }
        for direct in library_direct(&name) {
            if !visited.contains(*direct) {
                worklist.push(SmolStr::new(*direct));
            }
        }
    }

    result
}

/// Whether `sub` has `maybe_super` anywhere in its transitive supertype set,
/// or is itself `maybe_super` (reflexive).
pub fn is_subtype_or_same(sub: &str, maybe_super: &str, artifacts: &Artifacts) -> bool {
    if sub == maybe_super {
        return true;
    }
    super_types(sub, artifacts).iter().any(|s| s.as_str() == maybe_super)
}

/// Atom-level supertype expansion (spec §4.3): layers the primitive
/// coercion rules and `static(X)`'s expansion on top of the class-name
/// table walk. `self`/`parent` are expected to already have been resolved
/// to concrete class/`static(X)` atoms by the parser — this function
/// treats an unresolved `self`/`parent` (no enclosing class known) as
/// having no further supertypes.
pub fn super_types_of_atom(atom: &Atom, artifacts: &Artifacts) -> Vec<Atom> {
    match atom {
        Atom::Int | Atom::String => vec![Atom::ArrayKey, Atom::Scalar],
        Atom::ArrayKey | Atom::Float | Atom::Bool => vec![Atom::Scalar],
        Atom::CallableString => vec![Atom::Callable, Atom::String, Atom::ArrayKey, Atom::Scalar],
        Atom::Array => vec![Atom::Iterable],
        Atom::Class(name) => {
            let class_supers = super_types(name, artifacts);
            let mut out: Vec<Atom> = class_supers.iter().cloned().map(Atom::Class).collect();
            out.push(Atom::Object);
            if name.as_str() == "\\Closure" {
                out.push(Atom::Callable);
            }
            if class_supers.iter().any(|s| s == "\\Traversable") {
                out.push(Atom::Iterable);
            }
            out
        }
        Atom::Static(fq) => {
            let mut out = vec![Atom::Static(fq.clone()), Atom::SelfTy, Atom::Parent, Atom::Object];
            out.extend(super_types(fq, artifacts).into_iter().map(Atom::Class));
            out
        }
        _ => Vec::new(),
    }
}
