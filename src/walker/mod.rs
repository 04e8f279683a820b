//! `DeclarationWalker` (spec §4.5): drives a host-tokenized file through
//! the two-pass artifact-collection-then-check traversal and applies the
//! 7-row check table through a [`ReportingShim`].

pub mod artifact;
pub mod comment;
pub mod host;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::comparator::compare_types;
use crate::config::Config;
use crate::hierarchy::Artifacts;
use crate::parser::{parse_type_and_name, Want};
use crate::scope::Scope;
use crate::shim::{codes, ReportingShim, TokenPtr};
use crate::types::{Atom, CanonicalType, Intersection};

use artifact::collect_artifacts;
use comment::{parse_comment, Comment, TagKind, TagOccurrence};
use host::{HostFile, HostTokens, MemberProperty, ParamInfo, TokenCode};

/// A pushed scope-stack frame: the scope to restore, and the token at
/// which the frame ends (spec §4.5, §9 "scope nesting via clone").
struct Frame {
    closer: TokenPtr,
    restore: Scope,
}

pub struct DeclarationWalker<'a> {
    config: Config,
    host: &'a dyn HostFile,
    shim: &'a mut dyn ReportingShim,
    artifacts: Artifacts,
    scope: Scope,
    stack: Vec<Frame>,
    pending_comment: Option<Comment>,
    /// Member properties of the classish body currently being walked,
    /// keyed by the token pointer of the property's `$name` declaration,
    /// populated once on entering the class and consulted per `Variable`
    /// token inside it.
    current_members: FxHashMap<TokenPtr, MemberProperty>,
}

impl<'a> DeclarationWalker<'a> {
    /// Run both passes over `host` and report findings through `shim`,
    /// per `config`'s enabled checks.
    pub fn run(host: &'a dyn HostFile, shim: &'a mut dyn ReportingShim, config: Config) {
        let (artifacts, _artifacts_list) = collect_artifacts(host);
        let mut walker = DeclarationWalker {
            config,
            host,
            shim,
            artifacts,
            scope: Scope::root(),
            stack: Vec::new(),
            pending_comment: None,
            current_members: FxHashMap::default(),
        };
        walker.run_pass2();
    }

    fn run_pass2(&mut self) {
        let tokens = self.host.tokens();
        let mut ptr: TokenPtr = 0;
        while ptr < tokens.len() {
            self.pop_closed_frames(ptr);
            self.dispatch(tokens, ptr);
            ptr += 1;
        }
        // End-of-file is the end of every remaining open scope; flush the
        // pending-comment invariant one last time (spec §5).
        self.flush_pending();
    }

    fn pop_closed_frames(&mut self, ptr: TokenPtr) {
        while let Some(top) = self.stack.last() {
            if top.closer != ptr {
                break;
            }
            self.flush_pending();
            let frame = self.stack.pop().expect("checked Some above");
            tracing::trace!("scope pop at token {ptr}, {} frame(s) remain", self.stack.len());
            self.scope = frame.restore;
        }
    }

    /// The walker's per-construct error boundary (spec §7, §9 "give up
    /// and resume"): a `ContractError` from a declaration handler is
    /// swallowed and pass 2 resumes at the next token, except in debug
    /// mode, where it is surfaced once as a single diagnostic.
    fn dispatch(&mut self, tokens: &dyn HostTokens, ptr: TokenPtr) {
        if let Err(err) = self.dispatch_inner(tokens, ptr) {
            tracing::debug!("dispatch at token {ptr} failed, resuming at next token: {err}");
            if self.config.debug_mode {
                self.shim.add_error(ptr, codes::PARSE_FAILURE, "PHPDoc type sniff failed to parse the file");
            }
        }
    }

    fn dispatch_inner(&mut self, tokens: &dyn HostTokens, ptr: TokenPtr) -> crate::error::Result<()> {
        match tokens.code(ptr) {
            TokenCode::DocCommentOpen => self.process_doc_comment(tokens, ptr),
            TokenCode::Namespace => self.process_namespace(ptr),
            TokenCode::Use => self.process_use(ptr),
            TokenCode::Class | TokenCode::Interface | TokenCode::Trait | TokenCode::Enum => {
                self.process_classish(tokens, ptr)
            }
            TokenCode::Function | TokenCode::Closure | TokenCode::ArrowFunction => {
                self.process_function(tokens, ptr)
            }
            TokenCode::Variable => self.process_variable(ptr),
            // Attribute groups, `readonly`, visibility, `static`-as-modifier
            // vs late-static-binding, and trait-use blocks carry no type
            // information the walker tracks (spec §4.5 point 2) and trait
            // bodies are never classish-descended into, so they fall
            // through here untouched.
            _ => Ok(()),
        }
    }

    /// A doc comment becomes the single "pending comment" (spec §5's
    /// one-at-a-time invariant): a comment not claimed by the very next
    /// declaration is flushed, unclaimed, when its scope ends.
    fn process_doc_comment(&mut self, tokens: &dyn HostTokens, ptr: TokenPtr) -> crate::error::Result<()> {
        self.flush_pending();
        self.pending_comment = Some(parse_comment(tokens, ptr));
        Ok(())
    }

    fn flush_pending(&mut self) {
        if let Some(comment) = self.pending_comment.take() {
            self.process_poss_var_comment(&comment);
        }
    }

    /// An orphaned doc comment: only its `@var` tags, if any, get a
    /// syntax-only check (spec §4.5 point 1) — there is no native
    /// declaration to compare against.
    fn process_poss_var_comment(&mut self, comment: &Comment) {
        if !self.config.check_has_tags {
            return;
        }
        for tag in comment.tags.iter().filter(|t| matches!(t.kind, TagKind::Var)) {
            let (type_text, _) = tag.split_type_and_rest();
            let parsed = parse_type_and_name(&self.scope, &self.artifacts, type_text, Want::Type, false);
            if parsed.ty.is_none() {
                self.shim.add_warning(tag.ptr, codes::MISSING_TAG, "orphan @var tag has an unparseable type");
            }
        }
    }

    fn process_namespace(&mut self, ptr: TokenPtr) -> crate::error::Result<()> {
        let tokens = self.host.tokens();
        let name = self.host.declaration_name(ptr).unwrap_or_default();
        let fq = if name.starts_with('\\') {
            name
        } else {
            SmolStr::new(format!("\\{name}"))
        };

        match tokens.scope_closer(ptr) {
            Some(closer) => {
                tracing::trace!("scope push: namespace {fq} at token {ptr}, closes at {closer}");
                let restore = self.scope.clone();
                self.scope = self.scope.descend_namespace(fq, crate::base::TextSize::new(closer as u32));
                self.stack.push(Frame { closer, restore });
            }
            // Semicolon form: extends to the next namespace declaration or
            // end of file, so it simply replaces the current scope with no
            // frame to pop.
            None => {
                tracing::trace!("namespace {fq} at token {ptr} (semicolon form, no frame)");
                self.scope = self.scope.descend_namespace(fq, crate::base::TextSize::new(0));
            }
        }
        Ok(())
    }

    fn process_use(&mut self, ptr: TokenPtr) -> crate::error::Result<()> {
        if let Some(spec) = self.host.declaration_name(ptr) {
            if let Some((alias, fq)) = spec.split_once('=') {
                self.scope.add_use(alias, fq);
            }
        }
        Ok(())
    }

    fn process_classish(&mut self, tokens: &dyn HostTokens, ptr: TokenPtr) -> crate::error::Result<()> {
        let comment = self.pending_comment.take();
        let Some(name) = self.host.declaration_name(ptr) else {
            return Err(crate::error::ContractError::TokenOutOfRange(ptr));
        };
        let fq_name = self.scope.resolve_name(&name);
        let parentname = self.host.find_extended_class_name(ptr).map(|n| self.scope.resolve_name(&n));

        let members = self.host.get_member_properties(ptr);
        self.current_members = members.into_iter().map(|m| (m.ptr, m)).collect();

        if self.config.check_has_doc_blocks && comment.is_none() && !self.current_members.is_empty() {
            self.shim.add_warning(ptr, codes::MISSING_DOC_BLOCK, "classish declaration is missing a doc block");
        }
        if let Some(comment) = &comment {
            self.check_misplaced(comment, &[TagKind::Param, TagKind::Return]);
        }

        if let Some(closer) = tokens.scope_closer(ptr) {
            tracing::trace!("scope push: classish {fq_name} at token {ptr}, closes at {closer}");
            let restore = self.scope.clone();
            self.scope = self.scope.descend_classish(fq_name, parentname, crate::base::TextSize::new(closer as u32));
            self.stack.push(Frame { closer, restore });
        }
        Ok(())
    }

    fn process_function(&mut self, tokens: &dyn HostTokens, ptr: TokenPtr) -> crate::error::Result<()> {
        let comment = self.pending_comment.take();
        let params = self.host.get_method_parameters(ptr);
        let props = self.host.get_method_properties(ptr);

        let param_tags: Vec<&TagOccurrence> =
            comment.as_ref().map(|c| c.tags.iter().filter(|t| matches!(t.kind, TagKind::Param)).collect()).unwrap_or_default();
        let return_tags: Vec<&TagOccurrence> =
            comment.as_ref().map(|c| c.tags.iter().filter(|t| matches!(t.kind, TagKind::Return)).collect()).unwrap_or_default();

        let is_void_return = props.native_return_type_text.as_deref().is_some_and(|t| t.trim_start_matches('?') == "void");
        let needs_doc = props.is_public && (!params.is_empty() || !is_void_return);

        if self.config.check_has_doc_blocks && needs_doc && comment.is_none() {
            self.shim.add_warning(ptr, codes::MISSING_DOC_BLOCK, "function is missing a doc block");
        }

        if let Some(comment) = &comment {
            self.check_misplaced(comment, &[TagKind::Var]);

            if self.config.check_has_tags {
                if !params.is_empty() && param_tags.is_empty() {
                    self.shim.add_warning(ptr, codes::MISSING_TAG, "missing @param tag(s)");
                }
                if !is_void_return && return_tags.is_empty() {
                    self.shim.add_warning(ptr, codes::MISSING_TAG, "missing @return tag");
                }
            }

            if self.config.check_no_misplaced {
                self.check_param_tag_order(&params, &param_tags);
                if return_tags.len() > 1 {
                    self.shim.add_error(return_tags[1].ptr, codes::MULTIPLE_RETURN_TAGS, "multiple @return tags");
                }
            }

            for param in &params {
                let tag = param_tags.iter().copied().find(|t| t.var_name().as_deref() == Some(param.name.as_str()));
                self.check_param(param, tag);
            }
            if let Some(tag) = return_tags.first().copied() {
                self.check_return(&props, tag);
            }
        }

        if let Some(closer) = tokens.scope_closer(ptr) {
            tracing::trace!("scope push: function at token {ptr}, closes at {closer}");
            let restore = self.scope.clone();
            self.scope = self.scope.descend_function(crate::base::TextSize::new(closer as u32));
            self.stack.push(Frame { closer, restore });
        }
        Ok(())
    }

    fn check_param_tag_order(&mut self, params: &[ParamInfo], param_tags: &[&TagOccurrence]) {
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for tag in param_tags {
            if let Some(name) = tag.var_name() {
                if !seen.insert(name.clone()) {
                    self.shim.add_error(tag.ptr, codes::DUPLICATE_PARAM_TAG, &format!("duplicate @param for {name}"));
                }
            }
        }

        let native_order: Vec<&SmolStr> = params.iter().map(|p| &p.name).collect();
        let doc_order: Vec<SmolStr> = param_tags.iter().filter_map(|t| t.var_name()).collect();
        let native_matching: Vec<&str> = native_order
            .iter()
            .map(|n| n.as_str())
            .filter(|n| doc_order.iter().any(|d| d.as_str() == *n))
            .collect();
        let doc_as_str: Vec<&str> = doc_order.iter().map(|s| s.as_str()).collect();
        if native_matching != doc_as_str {
            if let Some(first) = param_tags.first() {
                self.shim.add_warning(first.ptr, codes::PARAM_ORDER_MISMATCH, "@param order does not match parameter order");
            }
        }
    }

    /// Tags of any kind in `disallowed` found in `comment` are reported as
    /// misplaced for the declaration kind they were attached to.
    fn check_misplaced(&mut self, comment: &Comment, disallowed: &[TagKind]) {
        if !self.config.check_no_misplaced {
            tracing::trace!("skipping noMisplaced check: check_no_misplaced is disabled");
            return;
        }
        for tag in &comment.tags {
            if disallowed.contains(&tag.kind) {
                self.shim.add_error(tag.ptr, codes::TAG_MISPLACED, "tag is misplaced for this declaration kind");
            }
        }
    }

    fn native_effective_type(&self, type_text: &str, default_text: Option<&str>) -> CanonicalType {
        let parsed = parse_type_and_name(&self.scope, &self.artifacts, type_text, Want::Type, true);
        let mut ty = parsed.ty.unwrap_or_else(CanonicalType::mixed);
        if default_text.is_some_and(|d| d.trim().eq_ignore_ascii_case("null")) && !ty.contains_null() {
            ty.unions.push(Intersection::single(Atom::Null));
            ty.sort_dedup();
        }
        ty
    }

    fn check_param(&mut self, param: &ParamInfo, tag: Option<&TagOccurrence>) {
        let Some(tag) = tag else { return };
        let doc = parse_type_and_name(&self.scope, &self.artifacts, &tag.rest, Want::PlusPassSplat, false);
        let native_text = param.native_type_text.as_deref().unwrap_or("");
        let native_ty = self.native_effective_type(native_text, param.default_text.as_deref());

        if self.config.check_style {
            self.apply_style_fix(tag.ptr, &doc.fixed);
        }
        if self.config.check_phpfig && !doc.phpfig {
            self.shim.add_warning(tag.ptr, codes::CLASS_PROP_TYPE_PHPFIG, "PHPDoc type is outside PHP-FIG's common subset");
        }
        if self.config.check_type_match && !compare_types(Some(&native_ty), doc.ty.as_ref(), &self.artifacts) {
            let doc_str = doc.ty.as_ref().map(|t| t.to_string()).unwrap_or_default();
            self.shim.add_error(
                tag.ptr,
                codes::FUN_PARAM_TYPE_MISMATCH,
                &format!("@param type `{doc_str}` does not match native type `{native_ty}`"),
            );
        }
        if self.config.check_pass_splat {
            let native_matches = param.by_ref == doc.pass_splat.by_ref && param.variadic == doc.pass_splat.variadic;
            if !native_matches {
                self.shim.add_error(
                    tag.ptr,
                    codes::FUN_PARAM_PASS_SPLAT_MISMATCH,
                    "@param reference/variadic marker does not match the native parameter",
                );
            }
        }
    }

    fn check_return(&mut self, props: &host::MethodProperties, tag: &TagOccurrence) {
        let (type_text, _) = tag.split_type_and_rest();
        let doc = parse_type_and_name(&self.scope, &self.artifacts, type_text, Want::Type, false);
        let native_text = props.native_return_type_text.as_deref().unwrap_or("");
        let native_ty = self.native_effective_type(native_text, None);

        if self.config.check_style {
            self.apply_style_fix(tag.ptr, &doc.fixed);
        }
        if self.config.check_phpfig && !doc.phpfig {
            self.shim.add_warning(tag.ptr, codes::CLASS_PROP_TYPE_PHPFIG, "PHPDoc type is outside PHP-FIG's common subset");
        }
        if self.config.check_type_match && !compare_types(doc.ty.as_ref(), Some(&native_ty), &self.artifacts) {
            let doc_str = doc.ty.as_ref().map(|t| t.to_string()).unwrap_or_default();
            self.shim.add_error(
                tag.ptr,
                codes::FUN_RET_TYPE_MISMATCH,
                &format!("@return type `{doc_str}` does not match native return type `{native_ty}`"),
            );
        }
    }

    fn apply_style_fix(&mut self, ptr: TokenPtr, fixed: &Option<SmolStr>) {
        if let Some(fixed) = fixed {
            if self.shim.add_fixable_warning(ptr, codes::VAR_TYPE_STYLE, "non-canonical PHPDoc type spelling") {
                self.shim.begin_changeset();
                self.shim.replace_token(ptr, fixed);
                self.shim.end_changeset();
            }
        }
    }

    fn process_variable(&mut self, ptr: TokenPtr) -> crate::error::Result<()> {
        let Some(member) = self.current_members.get(&ptr).cloned() else {
            return Ok(());
        };
        let comment = self.pending_comment.take();

        if self.config.check_has_doc_blocks && member.is_public && comment.is_none() {
            self.shim.add_warning(ptr, codes::MISSING_DOC_BLOCK, "property is missing a doc block");
        }
        let Some(comment) = comment else { return Ok(()) };
        self.check_misplaced(&comment, &[TagKind::Param, TagKind::Return]);

        let var_tag = comment.tags.iter().find(|t| matches!(t.kind, TagKind::Var));
        if self.config.check_has_tags && var_tag.is_none() {
            self.shim.add_warning(ptr, codes::MISSING_TAG, "missing @var tag");
        }
        let Some(tag) = var_tag else { return Ok(()) };

        let (type_text, _) = tag.split_type_and_rest();
        let doc = parse_type_and_name(&self.scope, &self.artifacts, type_text, Want::Type, false);
        let native_text = member.native_type_text.as_deref().unwrap_or("");
        let native_ty = self.native_effective_type(native_text, None);

        if self.config.check_style {
            self.apply_style_fix(tag.ptr, &doc.fixed);
        }
        if self.config.check_phpfig && !doc.phpfig {
            self.shim.add_warning(tag.ptr, codes::CLASS_PROP_TYPE_PHPFIG, "PHPDoc type is outside PHP-FIG's common subset");
        }
        if self.config.check_type_match && !compare_types(Some(&native_ty), doc.ty.as_ref(), &self.artifacts) {
            let doc_str = doc.ty.as_ref().map(|t| t.to_string()).unwrap_or_default();
            self.shim.add_error(
                tag.ptr,
                codes::VAR_TYPE_MISMATCH,
                &format!("@var type `{doc_str}` does not match native type `{native_ty}`"),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shim::RecordingShim;
    use host::{HostFile, HostTokens, MethodProperties};

    struct ScenarioTokens {
        codes: Vec<TokenCode>,
        content: Vec<&'static str>,
    }

    impl HostTokens for ScenarioTokens {
        fn len(&self) -> usize {
            self.codes.len()
        }
        fn code(&self, ptr: usize) -> TokenCode {
            self.codes[ptr]
        }
        fn content(&self, ptr: usize) -> &str {
            self.content[ptr]
        }
        fn scope_opener(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn scope_closer(&self, ptr: usize) -> Option<usize> {
            if self.codes[ptr] == TokenCode::Function {
                Some(self.codes.len() - 1)
            } else {
                None
            }
        }
        fn parenthesis_opener(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn parenthesis_closer(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn bracket_opener(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn bracket_closer(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn attribute_closer(&self, _ptr: usize) -> Option<usize> {
            None
        }
        fn comment_tags(&self, comment_opener: usize) -> Vec<usize> {
            let mut out = Vec::new();
            let mut ptr = comment_opener;
            while ptr < self.codes.len() && self.codes[ptr] != TokenCode::DocCommentClose {
                if self.codes[ptr] == TokenCode::DocCommentTag {
                    out.push(ptr);
                }
                ptr += 1;
            }
            out
        }
        fn comment_closer(&self, comment_opener: usize) -> Option<usize> {
            let mut ptr = comment_opener;
            while ptr < self.codes.len() {
                if self.codes[ptr] == TokenCode::DocCommentClose {
                    return Some(ptr);
                }
                ptr += 1;
            }
            None
        }
        fn line(&self, _ptr: usize) -> usize {
            1
        }
    }

    struct ScenarioFile {
        tokens: ScenarioTokens,
        function_ptr: usize,
    }

    impl HostFile for ScenarioFile {
        fn tokens(&self) -> &dyn HostTokens {
            &self.tokens
        }
        fn declaration_name(&self, _ptr: usize) -> Option<SmolStr> {
            None
        }
        fn find_extended_class_name(&self, _ptr: usize) -> Option<SmolStr> {
            None
        }
        fn find_implemented_interface_names(&self, _ptr: usize) -> Vec<SmolStr> {
            Vec::new()
        }
        fn get_method_parameters(&self, ptr: usize) -> Vec<ParamInfo> {
            if ptr == self.function_ptr {
                vec![ParamInfo {
                    name: SmolStr::new("$x"),
                    native_type_text: Some(SmolStr::new("int")),
                    by_ref: false,
                    variadic: false,
                    default_text: None,
                    ptr,
                }]
            } else {
                Vec::new()
            }
        }
        fn get_method_properties(&self, _ptr: usize) -> MethodProperties {
            MethodProperties {
                native_return_type_text: Some(SmolStr::new("string")),
                is_public: true,
                is_closure: false,
                by_ref_return: false,
            }
        }
        fn get_member_properties(&self, _ptr: usize) -> Vec<MemberProperty> {
            Vec::new()
        }
    }

    /// Spec §8 scenario 6: `function f(int $x): string {}` documented as
    /// `@param string $x @return int` — both directions mismatch.
    #[test]
    fn scenario_6_param_and_return_mismatch() {
        let codes = vec![
            TokenCode::DocCommentOpen,  // 0
            TokenCode::DocCommentTag,   // 1 @param
            TokenCode::DocCommentWhitespace, // 2
            TokenCode::DocCommentString, // 3 "string $x"
            TokenCode::DocCommentTag,   // 4 @return
            TokenCode::DocCommentWhitespace, // 5
            TokenCode::DocCommentString, // 6 "int"
            TokenCode::DocCommentClose, // 7
            TokenCode::Function,        // 8
            TokenCode::CloseCurly,      // 9 (function scope closer)
        ];
        let content = vec!["/**", "@param", " ", "string $x", "@return", " ", "int", "*/", "function", "}"];
        let file = ScenarioFile {
            tokens: ScenarioTokens { codes, content },
            function_ptr: 8,
        };
        let mut shim = RecordingShim::new();
        DeclarationWalker::run(&file, &mut shim, Config::strict());

        assert!(shim.has_code(codes::FUN_PARAM_TYPE_MISMATCH));
        assert!(shim.has_code(codes::FUN_RET_TYPE_MISMATCH));
    }
}
