//! `Scope` (spec §3): the per-declaration-nesting-level context the parser
//! consults to resolve bare and `self`/`parent`/`static` type references,
//! and the walker threads through its traversal.
//!
//! Scopes are immutable after creation except `uses`/`templates`/
//! `namespace`, which may be extended monotonically within their declaring
//! scope. A nested scope is a structural clone of its parent plus the
//! nested level's own deltas — there is no back-pointer (spec §9).

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::TextSize;
use crate::types::CanonicalType;

/// What kind of declaration introduced this scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Namespace,
    Classish,
    Function,
    Parameters,
}

#[derive(Debug, Clone)]
pub struct Scope {
    /// Fully-qualified namespace prefix: leading `\`, never trailing.
    pub namespace: SmolStr,
    /// Local alias (the part after `use ... as`, or the final segment of a
    /// plain `use`) to fully-qualified name. Keys are unique.
    pub uses: IndexMap<SmolStr, SmolStr>,
    /// Template (generic) name to its upper-bound canonical type.
    pub templates: IndexMap<SmolStr, CanonicalType>,
    pub classname: Option<SmolStr>,
    pub parentname: Option<SmolStr>,
    pub kind: ScopeKind,
    /// Position at which this scope ends, for the walker's bookkeeping.
    pub closer: TextSize,
}

impl Scope {
    pub fn root() -> Self {
        Scope {
            namespace: SmolStr::new("\\"),
            uses: IndexMap::new(),
            templates: IndexMap::new(),
            classname: None,
            parentname: None,
            kind: ScopeKind::Root,
            closer: TextSize::new(0),
        }
    }

    fn cloned_into(&self, kind: ScopeKind, closer: TextSize) -> Scope {
        Scope {
            namespace: self.namespace.clone(),
            uses: self.uses.clone(),
            templates: self.templates.clone(),
            classname: self.classname.clone(),
            parentname: self.parentname.clone(),
            kind,
            closer,
        }
    }

    /// Descend into a `namespace Foo\Bar { ... }` (or semicolon-form)
    /// block. `uses` reset: PHP namespaces don't inherit imports.
    pub fn descend_namespace(&self, fq_namespace: impl Into<SmolStr>, closer: TextSize) -> Scope {
        let mut s = self.cloned_into(ScopeKind::Namespace, closer);
        s.namespace = fq_namespace.into();
        s.uses = IndexMap::new();
        s
    }

    /// Descend into a classish body, recording `self`/`parent` identity.
    pub fn descend_classish(
        &self,
        classname: impl Into<SmolStr>,
        parentname: Option<SmolStr>,
        closer: TextSize,
    ) -> Scope {
        let mut s = self.cloned_into(ScopeKind::Classish, closer);
        s.classname = Some(classname.into());
        s.parentname = parentname;
        s
    }

    pub fn descend_function(&self, closer: TextSize) -> Scope {
        self.cloned_into(ScopeKind::Function, closer)
    }

    pub fn descend_parameters(&self, closer: TextSize) -> Scope {
        self.cloned_into(ScopeKind::Parameters, closer)
    }

    /// Record a `use Foo\Bar [as Baz]` import. The local alias (`Baz`, or
    /// `Bar` for a plain `use`) must be unique within this scope.
    pub fn add_use(&mut self, alias: impl Into<SmolStr>, fully_qualified: impl Into<SmolStr>) {
        self.uses.insert(alias.into(), fully_qualified.into());
    }

    pub fn add_template(&mut self, name: impl Into<SmolStr>, upper_bound: CanonicalType) {
        self.templates.insert(name.into(), upper_bound);
    }

    /// Resolve a bare (non-backslash-prefixed) identifier to a
    /// fully-qualified class name, per spec §4.2: `uses`, then
    /// `templates`, then the current namespace prefix.
    ///
    /// A name that resolves through `templates` is returned as-is (bare,
    /// unqualified) — callers distinguish a template reference by checking
    /// `self.templates` directly before calling this, since a resolved
    /// template name is a type-variable reference, not a class name.
    pub fn resolve_name(&self, name: &str) -> SmolStr {
        if let Some(first_segment_end) = name.find('\\') {
            let head = &name[..first_segment_end];
            if let Some(fq) = self.uses.get(head) {
                return SmolStr::new(format!("{fq}{}", &name[first_segment_end..]));
            }
            return self.qualify(name);
        }
        if let Some(fq) = self.uses.get(name) {
            return fq.clone();
        }
        if self.templates.contains_key(name) {
            return SmolStr::new(name);
        }
        self.qualify(name)
    }

    fn qualify(&self, name: &str) -> SmolStr {
        if self.namespace.as_str() == "\\" {
            SmolStr::new(format!("\\{name}"))
        } else {
            SmolStr::new(format!("{}\\{name}", self.namespace))
        }
    }
}
