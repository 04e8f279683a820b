//! Ambient test surface (spec §9's fixture pattern, generalized from the
//! ad hoc fixtures in `walker`'s own unit tests): in-memory
//! [`HostTokens`]/[`HostFile`] fixtures, built incrementally, for
//! exercising [`crate::walker::DeclarationWalker`] without a live host.
//!
//! [`crate::shim::RecordingShim`] is the matching [`ReportingShim`]
//! double; it lives in `shim` since it is also useful outside tests (an
//! embedder collecting diagnostics in memory), but is re-exported here for
//! convenience.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::shim::TokenPtr;
use crate::walker::host::{HostFile, HostTokens, MemberProperty, MethodProperties, ParamInfo, TokenCode};

pub use crate::shim::RecordingShim;

#[derive(Debug, Clone, Default)]
struct TokenRow {
    code: TokenCode,
    content: String,
    scope_closer: Option<TokenPtr>,
    parenthesis_closer: Option<TokenPtr>,
    comment_tags: Vec<TokenPtr>,
    comment_closer: Option<TokenPtr>,
}

impl Default for TokenCode {
    fn default() -> Self {
        TokenCode::Other
    }
}

/// Builds a flat, in-memory token array one token at a time, with the
/// scope/parenthesis/comment relationships a real host tokenizer would
/// supply alongside it.
#[derive(Debug, Clone, Default)]
pub struct FakeTokenStream {
    rows: Vec<TokenRow>,
}

impl FakeTokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token and return its pointer.
    pub fn push(&mut self, code: TokenCode, content: impl Into<String>) -> TokenPtr {
        self.rows.push(TokenRow {
            code,
            content: content.into(),
            ..Default::default()
        });
        self.rows.len() - 1
    }

    /// Record that the scope opened by `opener` (a `namespace`/classish/
    /// `function` token) closes at `closer`.
    pub fn set_scope(&mut self, opener: TokenPtr, closer: TokenPtr) -> &mut Self {
        self.rows[opener].scope_closer = Some(closer);
        self
    }

    pub fn set_parenthesis(&mut self, opener: TokenPtr, closer: TokenPtr) -> &mut Self {
        self.rows[opener].parenthesis_closer = Some(closer);
        self
    }

    /// Record that the doc comment opened at `opener` contains the tag
    /// tokens at `tags` (in order) and closes at `closer`.
    pub fn set_comment(&mut self, opener: TokenPtr, tags: Vec<TokenPtr>, closer: TokenPtr) -> &mut Self {
        self.rows[opener].comment_tags = tags;
        self.rows[opener].comment_closer = Some(closer);
        self
    }
}

impl HostTokens for FakeTokenStream {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn code(&self, ptr: TokenPtr) -> TokenCode {
        self.rows[ptr].code
    }

    fn content(&self, ptr: TokenPtr) -> &str {
        &self.rows[ptr].content
    }

    fn scope_opener(&self, _ptr: TokenPtr) -> Option<TokenPtr> {
        None
    }

    fn scope_closer(&self, ptr: TokenPtr) -> Option<TokenPtr> {
        self.rows[ptr].scope_closer
    }

    fn parenthesis_opener(&self, _ptr: TokenPtr) -> Option<TokenPtr> {
        None
    }

    fn parenthesis_closer(&self, ptr: TokenPtr) -> Option<TokenPtr> {
        self.rows[ptr].parenthesis_closer
    }

    fn bracket_opener(&self, _ptr: TokenPtr) -> Option<TokenPtr> {
        None
    }

    fn bracket_closer(&self, _ptr: TokenPtr) -> Option<TokenPtr> {
        None
    }

    fn attribute_closer(&self, _ptr: TokenPtr) -> Option<TokenPtr> {
        None
    }

    fn comment_tags(&self, comment_opener: TokenPtr) -> Vec<TokenPtr> {
        self.rows[comment_opener].comment_tags.clone()
    }

    fn comment_closer(&self, comment_opener: TokenPtr) -> Option<TokenPtr> {
        self.rows[comment_opener].comment_closer
    }

    fn line(&self, _ptr: TokenPtr) -> usize {
        1
    }
}

/// A [`HostFile`] fixture pairing a [`FakeTokenStream`] with the
/// declaration-shaped facts (`declaration_name`, `extends`, parameters,
/// properties) a real host would derive from its AST.
#[derive(Debug, Clone, Default)]
pub struct FakeFile {
    pub tokens: FakeTokenStream,
    names: FxHashMap<TokenPtr, SmolStr>,
    extends: FxHashMap<TokenPtr, SmolStr>,
    implements: FxHashMap<TokenPtr, Vec<SmolStr>>,
    params: FxHashMap<TokenPtr, Vec<ParamInfo>>,
    method_props: FxHashMap<TokenPtr, MethodProperties>,
    member_props: FxHashMap<TokenPtr, Vec<MemberProperty>>,
}

impl FakeFile {
    pub fn new(tokens: FakeTokenStream) -> Self {
        FakeFile {
            tokens,
            ..Default::default()
        }
    }

    pub fn declaration_name(&mut self, ptr: TokenPtr, name: impl Into<SmolStr>) -> &mut Self {
        self.names.insert(ptr, name.into());
        self
    }

    pub fn extends(&mut self, ptr: TokenPtr, name: impl Into<SmolStr>) -> &mut Self {
        self.extends.insert(ptr, name.into());
        self
    }

    pub fn implements(&mut self, ptr: TokenPtr, names: Vec<SmolStr>) -> &mut Self {
        self.implements.insert(ptr, names);
        self
    }

    pub fn params(&mut self, ptr: TokenPtr, params: Vec<ParamInfo>) -> &mut Self {
        self.params.insert(ptr, params);
        self
    }

    pub fn method_props(&mut self, ptr: TokenPtr, props: MethodProperties) -> &mut Self {
        self.method_props.insert(ptr, props);
        self
    }

    pub fn member_props(&mut self, ptr: TokenPtr, props: Vec<MemberProperty>) -> &mut Self {
        self.member_props.insert(ptr, props);
        self
    }
}

impl HostFile for FakeFile {
    fn tokens(&self) -> &dyn HostTokens {
        &self.tokens
    }

    fn declaration_name(&self, ptr: TokenPtr) -> Option<SmolStr> {
        self.names.get(&ptr).cloned()
    }

    fn find_extended_class_name(&self, ptr: TokenPtr) -> Option<SmolStr> {
        self.extends.get(&ptr).cloned()
    }

    fn find_implemented_interface_names(&self, ptr: TokenPtr) -> Vec<SmolStr> {
        self.implements.get(&ptr).cloned().unwrap_or_default()
    }

    fn get_method_parameters(&self, ptr: TokenPtr) -> Vec<ParamInfo> {
        self.params.get(&ptr).cloned().unwrap_or_default()
    }

    fn get_method_properties(&self, ptr: TokenPtr) -> MethodProperties {
        self.method_props.get(&ptr).cloned().unwrap_or(MethodProperties {
            native_return_type_text: None,
            is_public: true,
            is_closure: false,
            by_ref_return: false,
        })
    }

    fn get_member_properties(&self, ptr: TokenPtr) -> Vec<MemberProperty> {
        self.member_props.get(&ptr).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::walker::DeclarationWalker;

    #[test]
    fn fixture_drives_a_minimal_function_mismatch() {
        let mut tokens = FakeTokenStream::new();
        let doc_open = tokens.push(TokenCode::DocCommentOpen, "/**");
        let param_tag = tokens.push(TokenCode::DocCommentTag, "@param");
        tokens.push(TokenCode::DocCommentWhitespace, " ");
        tokens.push(TokenCode::DocCommentString, "string $x");
        let doc_close = tokens.push(TokenCode::DocCommentClose, "*/");
        let function_ptr = tokens.push(TokenCode::Function, "function");
        let closer = tokens.push(TokenCode::CloseCurly, "}");
        tokens.set_comment(doc_open, vec![param_tag], doc_close);
        tokens.set_scope(function_ptr, closer);

        let mut file = FakeFile::new(tokens);
        file.params(
            function_ptr,
            vec![ParamInfo {
                name: SmolStr::new("$x"),
                native_type_text: Some(SmolStr::new("int")),
                by_ref: false,
                variadic: false,
                default_text: None,
                ptr: function_ptr,
            }],
        );
        file.method_props(
            function_ptr,
            MethodProperties {
                native_return_type_text: None,
                is_public: true,
                is_closure: false,
                by_ref_return: false,
            },
        );

        let mut shim = RecordingShim::new();
        DeclarationWalker::run(&file, &mut shim, Config::strict());
        assert!(shim.has_code(crate::shim::codes::FUN_PARAM_TYPE_MISMATCH));
    }
}
