//! `Artifact` (spec §3, §4.5): a classish declaration observed in pass 1,
//! and the pass-1 traversal that builds the [`Artifacts`] table
//! `hierarchy::super_types` consumes.

use smol_str::SmolStr;

use crate::base::TextSize;
use crate::hierarchy::Artifacts;
use crate::scope::Scope;
use crate::walker::host::{HostFile, HostTokens, TokenCode};

/// One classish declaration: its fully-qualified name plus its declared
/// supertypes, fully qualified against the `uses`/`namespace` in effect at
/// the declaration site.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: SmolStr,
    pub extends: Option<SmolStr>,
    pub implements: Vec<SmolStr>,
}

fn is_classish(code: TokenCode) -> bool {
    matches!(code, TokenCode::Class | TokenCode::Interface | TokenCode::Trait | TokenCode::Enum)
}

/// Walk the file once, visiting only classish declarations, fully
/// qualifying `extends`/`implements` against the `uses`/`namespace`
/// accumulated so far, and folding the result into an [`Artifacts`] table.
///
/// Namespace/`use` bookkeeping here is a simplified shadow of pass 2's
/// scope descent: pass 1 only needs enough of `Scope` to qualify names,
/// not the full nested-scope stack (no classish/function/parameter
/// descent is needed since only top-level `extends`/`implements` references
/// matter for the hierarchy).
pub fn collect_artifacts(host: &dyn HostFile) -> (Artifacts, Vec<Artifact>) {
    let tokens = host.tokens();
    let mut scope = Scope::root();
    let mut artifacts = Artifacts::new();
    let mut found = Vec::new();

    let mut ptr = 0usize;
    while ptr < tokens.len() {
        match tokens.code(ptr) {
            TokenCode::Namespace => {
                if let Some(name) = host.declaration_name(ptr) {
                    let fq = if name.starts_with('\\') { name } else { SmolStr::new(format!("\\{name}")) };
                    scope = scope.descend_namespace(fq, TextSize::new(0));
                }
            }
            TokenCode::Use => {
                if let Some(alias_and_target) = host.declaration_name(ptr) {
                    // `declaration_name` on a `use` token yields
                    // `"Alias=FullyQualifiedName"`; the host is responsible
                    // for resolving the optional `as` clause before handing
                    // it back (spec §6 treats `use` resolution as the
                    // host's job, since only it sees the raw tokens).
                    if let Some((alias, fq)) = alias_and_target.split_once('=') {
                        scope.add_use(alias, fq);
                    }
                }
            }
            code if is_classish(code) => {
                if let Some(name) = host.declaration_name(ptr) {
                    let fq_name = scope.resolve_name(&name);
                    let extends = host.find_extended_class_name(ptr).map(|n| scope.resolve_name(&n));
                    let implements: Vec<SmolStr> = host
                        .find_implemented_interface_names(ptr)
                        .into_iter()
                        .map(|n| scope.resolve_name(&n))
                        .collect();

                    if let Some(sup) = &extends {
                        artifacts.add_direct_supertype(fq_name.as_str(), sup.as_str());
                    }
                    for iface in &implements {
                        artifacts.add_direct_supertype(fq_name.as_str(), iface.as_str());
                    }

                    found.push(Artifact {
                        name: fq_name,
                        extends,
                        implements,
                    });
                }
            }
            _ => {}
        }
        ptr += 1;
    }

    (artifacts, found)
}
