//! `TypeComparator` (spec §4.4): is a value of type `narrow` assignable
//! where a value of type `wide` is expected?
//!
//! Both sides are canonical union-of-intersections types. The rules
//! compose bottom-up:
//!
//! - an atom `narrow` satisfies an atom `wide` if they're equal, `wide` is
//!   `mixed`, `narrow` is `never`, or the class hierarchy / built-in
//!   coercion table says so ([`atom_is_subtype`]);
//! - an intersection `narrow` satisfies an intersection `wide` if every
//!   atom of `wide` is satisfied by some atom of `narrow` (an intersection
//!   is narrower than any one of its components, so it can satisfy more);
//! - a union `narrow` satisfies a union `wide` if every disjunct of
//!   `narrow` satisfies at least one disjunct of `wide` — narrow's union
//!   describes a value that could be any of its disjuncts, so each must
//!   independently fit somewhere in wide.

use crate::hierarchy::{super_types_of_atom, Artifacts};
use crate::types::{Atom, CanonicalType, Intersection};

/// `true` iff a value whose PHPDoc type is `narrow` may be passed where
/// `wide` is expected (spec §4.4 rules 1–3: an absent `narrow` — a failed
/// parse — is never assignable; an absent `wide` is the "unknown, don't
/// check" native-type case and accepts anything).
pub fn compare_types(wide: Option<&CanonicalType>, narrow: Option<&CanonicalType>, artifacts: &Artifacts) -> bool {
    let Some(narrow) = narrow else {
        return false;
    };
    let Some(wide) = wide else {
        return true;
    };
    if wide.is_mixed() || narrow.is_never() {
        return true;
    }
    narrow
        .unions
        .iter()
        .all(|narrow_i| union_accepts(wide, narrow_i, artifacts))
}

fn union_accepts(wide: &CanonicalType, narrow_i: &Intersection, artifacts: &Artifacts) -> bool {
    wide.unions
        .iter()
        .any(|wide_i| intersection_is_subtype(narrow_i, wide_i, artifacts))
}

/// `narrow_i` (an AND of atoms) is a subtype of `wide_i` if every
/// component of `wide_i` is satisfied by some component of `narrow_i`.
fn intersection_is_subtype(narrow_i: &Intersection, wide_i: &Intersection, artifacts: &Artifacts) -> bool {
    wide_i
        .0
        .iter()
        .all(|w| narrow_i.0.iter().any(|n| atom_is_subtype(n, w, artifacts)))
}

/// Atom-level assignability: reflexive, plus whatever
/// [`super_types_of_atom`] reaches (class hierarchy, and the built-in
/// coercions spec §4.3 names — scalar/array-key widening, `iterable`,
/// `callable`).
pub fn atom_is_subtype(narrow: &Atom, wide: &Atom, artifacts: &Artifacts) -> bool {
    if wide.is_mixed() || narrow.is_never() {
        return true;
    }
    if narrow == wide {
        return true;
    }
    super_types_of_atom(narrow, artifacts).contains(wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn atom(a: Atom) -> CanonicalType {
        CanonicalType::atom(a)
    }

    /// Table-driven atom-widening cases (spec §8): `(wide, narrow,
    /// expected)` — whether `narrow` is assignable to `wide`.
    #[rstest]
    #[case(Atom::Mixed, Atom::Int, true)]
    #[case(Atom::Int, Atom::Never, true)]
    #[case(Atom::Int, Atom::Int, true)]
    #[case(Atom::Int, Atom::String, false)]
    #[case(Atom::Iterable, Atom::Array, true)]
    #[case(Atom::Array, Atom::Iterable, false)]
    #[case(Atom::Callable, Atom::CallableString, true)]
    #[case(Atom::String, Atom::CallableString, true)]
    fn atom_widening_table(#[case] wide: Atom, #[case] narrow: Atom, #[case] expected: bool) {
        let artifacts = Artifacts::new();
        assert_eq!(compare_types(Some(&atom(wide)), Some(&atom(narrow)), &artifacts), expected);
    }

    #[test]
    fn absent_narrow_is_never_assignable() {
        let artifacts = Artifacts::new();
        assert!(!compare_types(Some(&atom(Atom::Int)), None, &artifacts));
    }

    #[test]
    fn absent_wide_accepts_anything() {
        let artifacts = Artifacts::new();
        assert!(compare_types(None, Some(&atom(Atom::Int)), &artifacts));
    }

    #[test]
    fn class_hierarchy_widens_through_interfaces() {
        let mut artifacts = Artifacts::new();
        artifacts.add_direct_supertype("\\App\\MyException", "\\RuntimeException");
        assert!(compare_types(
            Some(&atom(Atom::class("\\Throwable"))),
            Some(&atom(Atom::class("\\App\\MyException"))),
            &artifacts,
        ));
    }

    #[test]
    fn union_narrow_requires_every_disjunct_to_fit() {
        let artifacts = Artifacts::new();
        let wide = CanonicalType {
            unions: vec![Intersection::single(Atom::Int), Intersection::single(Atom::String)],
        };
        let narrow_ok = CanonicalType {
            unions: vec![Intersection::single(Atom::Int)],
        };
        let narrow_bad = CanonicalType {
            unions: vec![Intersection::single(Atom::Int), Intersection::single(Atom::Bool)],
        };
        assert!(compare_types(Some(&wide), Some(&narrow_ok), &artifacts));
        assert!(!compare_types(Some(&wide), Some(&narrow_bad), &artifacts));
    }

    #[test]
    fn intersection_narrow_satisfies_any_single_wide_component() {
        let artifacts = Artifacts::new();
        let narrow = CanonicalType {
            unions: vec![Intersection(vec![
                Atom::class("\\Countable"),
                Atom::class("\\Traversable"),
            ])],
        };
        assert!(compare_types(Some(&atom(Atom::class("\\Countable"))), Some(&narrow), &artifacts));
    }
}
