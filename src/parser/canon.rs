//! Union/intersection canonicalization rules (spec §3, §4.2).
//!
//! Split out from the grammar driver in `mod.rs` because these rules are
//! pure functions of an already-parsed atom/intersection list — no lexer,
//! no fix bookkeeping, easy to test in isolation against the literal
//! scenarios in spec §8.

use crate::comparator::compare_types;
use crate::hierarchy::{super_types_of_atom, Artifacts};
use crate::types::{Atom, CanonicalType, Intersection};

/// Build one intersection (`A&B&C`) from its parsed atoms.
///
/// - A single atom never triggers the "intersection participants must be
///   `object`/`iterable`/`callable`/class" restriction — that only applies
///   once there's an actual `&`.
/// - `never` absorbs everything else in the same intersection.
/// - `mixed` is removed once another component is present.
/// - Each component's known supertypes are removed (spec §3): if `B` is a
///   supertype of `A` in `A&B`, `B` is redundant and dropped.
pub fn canonicalize_intersection(mut atoms: Vec<Atom>, artifacts: &Artifacts) -> Result<Intersection, ()> {
    if atoms.len() > 1 && !atoms.iter().all(Atom::can_intersect) {
        return Err(());
    }

    if atoms.iter().any(Atom::is_never) {
        return Ok(Intersection::single(Atom::Never));
    }

    if atoms.len() > 1 {
        atoms.retain(|a| !a.is_mixed());
        if atoms.is_empty() {
            atoms.push(Atom::Mixed);
        }
    }

    let retained: Vec<Atom> = atoms
        .iter()
        .filter(|&a| {
            !atoms.iter().any(|b| {
                b != a && super_types_of_atom(b, artifacts).iter().any(|s| s == a)
            })
        })
        .cloned()
        .collect();

    let mut result = Intersection(retained);
    result.sort_dedup();
    Ok(result)
}

/// Build a union (`A|B|C`) from its parsed intersections, applying the
/// array-key/scalar/iterable augmentation, absorption, `mixed`-collapse,
/// and `never`-elision rules.
///
/// Augmentation additions are appended *after* the absorption pass over
/// the originally-parsed members, and are never themselves candidates for
/// being absorbed or for absorbing another original member — this matches
/// the literal scenario spec §8#4 (`Traversable|array` augments to
/// `\Traversable|array|iterable` with nothing elided, even though
/// `iterable` would otherwise widen over `array`).
pub fn canonicalize_union(members: Vec<Intersection>, artifacts: &Artifacts) -> CanonicalType {
    if members.iter().any(|i| i.0.len() == 1 && i.0[0].is_mixed()) {
        return CanonicalType::mixed();
    }

    let mut kept = drop_narrower_absorbed(&members, artifacts);
    kept.extend(detect_augmentations(&members));

    if kept.len() > 1 {
        kept.retain(|i| !(i.0.len() == 1 && i.0[0].is_never()));
    }
    if kept.is_empty() {
        kept.push(Intersection::single(Atom::Never));
    }

    let mut result = CanonicalType { unions: kept };
    result.sort_dedup();
    result
}

fn is_single(i: &Intersection, atom: &Atom) -> bool {
    i.0.len() == 1 && &i.0[0] == atom
}

fn detect_augmentations(members: &[Intersection]) -> Vec<Intersection> {
    let present = |extra: &[Atom], a: &Atom| members.iter().any(|i| is_single(i, a)) || extra.contains(a);

    let mut extra: Vec<Atom> = Vec::new();
    if present(&extra, &Atom::Int) && present(&extra, &Atom::String) {
        extra.push(Atom::ArrayKey);
    }
    if present(&extra, &Atom::Bool) && present(&extra, &Atom::Float) && present(&extra, &Atom::ArrayKey) {
        extra.push(Atom::Scalar);
    }
    let has_traversable = members
        .iter()
        .any(|i| i.0.len() == 1 && matches!(&i.0[0], Atom::Class(n) if n == "\\Traversable"));
    if has_traversable && present(&extra, &Atom::Array) {
        extra.push(Atom::Iterable);
    }

    extra.into_iter().map(Intersection::single).collect()
}

/// Drop any member of `members` for which a *different* member is wider
/// (`compare_types(wider, this) == true`), per spec §4.2 "wider absorbs
/// narrower". Equal members are left to `CanonicalType::sort_dedup`.
fn drop_narrower_absorbed(members: &[Intersection], artifacts: &Artifacts) -> Vec<Intersection> {
    let as_types: Vec<CanonicalType> = members
        .iter()
        .map(|i| CanonicalType { unions: vec![i.clone()] })
        .collect();

    let mut keep = vec![true; members.len()];
    for i in 0..members.len() {
        if !keep[i] {
            continue;
        }
        for j in 0..members.len() {
            if i == j || !keep[j] || members[i] == members[j] {
                continue;
            }
            if compare_types(Some(&as_types[j]), Some(&as_types[i]), artifacts) {
                keep[i] = false;
                break;
            }
        }
    }

    members
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(m, _)| m.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn atoms_of(s: &[Atom]) -> Vec<Intersection> {
        s.iter().cloned().map(Intersection::single).collect()
    }

    #[test]
    fn scenario_1_integer_boolean() {
        let artifacts = Artifacts::new();
        let t = canonicalize_union(atoms_of(&[Atom::Int, Atom::Bool]), &artifacts);
        assert_eq!(t.to_string(), "bool|int");
    }

    #[test]
    fn scenario_4_traversable_array_augments_without_absorption() {
        let artifacts = Artifacts::new();
        let t = canonicalize_union(
            atoms_of(&[Atom::class("\\Traversable"), Atom::Array]),
            &artifacts,
        );
        assert_eq!(t.to_string(), "\\Traversable|array|iterable");
    }

    /// Table-driven union-canonicalization cases (spec §8): each row is an
    /// input atom set and the exact canonical rendering it must collapse to.
    #[rstest]
    #[case(&[Atom::Int, Atom::String], "array-key|int|string")]
    #[case(&[Atom::Int, Atom::Mixed, Atom::String], "mixed")]
    #[case(&[Atom::Int, Atom::Never], "int")]
    #[case(&[Atom::Never], "never")]
    #[case(&[Atom::Bool, Atom::Bool], "bool")]
    fn union_canonicalization_table(#[case] atoms: &[Atom], #[case] expected: &str) {
        let artifacts = Artifacts::new();
        let t = canonicalize_union(atoms_of(atoms), &artifacts);
        assert_eq!(t.to_string(), expected);
    }

    #[test]
    fn intersection_elides_known_supertype() {
        let mut artifacts = Artifacts::new();
        artifacts.add_direct_supertype("\\App\\Widget", "\\App\\Base");
        let i = canonicalize_intersection(
            vec![Atom::class("\\App\\Widget"), Atom::class("\\App\\Base")],
            &artifacts,
        )
        .unwrap();
        assert_eq!(i.to_string(), "\\App\\Widget");
    }

    #[test]
    fn intersection_rejects_non_intersectable_atoms() {
        let artifacts = Artifacts::new();
        assert!(canonicalize_intersection(vec![Atom::Int, Atom::String], &artifacts).is_err());
    }

    #[test]
    fn intersection_never_absorbs() {
        let artifacts = Artifacts::new();
        let i = canonicalize_intersection(vec![Atom::class("\\Foo"), Atom::Never], &artifacts).unwrap();
        assert_eq!(i.to_string(), "never");
    }
}
