//! Host tokenizer/file contract (spec §6): the surface this crate consumes
//! from the embedding sniff framework. Token codes are symbolic — concrete
//! values are host-defined, the walker only ever compares against this
//! enum.

use smol_str::SmolStr;

use crate::shim::TokenPtr;

/// Symbolic token classes the walker recognizes (spec §6). A host's
/// concrete token kind maps onto one of these, or [`TokenCode::Other`] for
/// everything the walker doesn't need to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCode {
    OpenTag,
    DocCommentOpen,
    DocCommentTag,
    DocCommentStar,
    DocCommentWhitespace,
    DocCommentString,
    DocCommentClose,
    Namespace,
    Use,
    Function,
    Closure,
    ArrowFunction,
    Class,
    Interface,
    Trait,
    Enum,
    Static,
    Const,
    Var,
    Variable,
    Name,
    TypeUnion,
    TypeIntersection,
    TypeNullable,
    Equal,
    Comma,
    Semicolon,
    OpenCurly,
    CloseCurly,
    OpenParenthesis,
    CloseParenthesis,
    Attribute,
    Readonly,
    DoubleColon,
    New,
    As,
    StringLiteral,
    Comment,
    Other,
}

/// One parameter of a `function`/closure/arrow-function, as reported by
/// the host (spec §6 `getMethodParameters`).
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: SmolStr,
    /// The native type-declaration text exactly as written (e.g.
    /// `"?int"`, `"array"`), or `None` if untyped. Fed to the parser with
    /// `gowide = true`.
    pub native_type_text: Option<SmolStr>,
    pub by_ref: bool,
    pub variadic: bool,
    /// `= <default>` text, if present; used to detect the implicit
    /// nullable default.
    pub default_text: Option<SmolStr>,
    /// Token to anchor diagnostics about this parameter to.
    pub ptr: TokenPtr,
}

/// Return-type and visibility facts about a function/method (spec §6
/// `getMethodProperties`).
#[derive(Debug, Clone)]
pub struct MethodProperties {
    pub native_return_type_text: Option<SmolStr>,
    pub is_public: bool,
    pub is_closure: bool,
    pub by_ref_return: bool,
}

/// A classish member property (spec §6 `getMemberProperties`).
#[derive(Debug, Clone)]
pub struct MemberProperty {
    pub name: SmolStr,
    pub native_type_text: Option<SmolStr>,
    pub is_public: bool,
    pub ptr: TokenPtr,
}

/// The host tokenizer's flat token array (spec §6). All indices are
/// `TokenPtr`s into this same array.
pub trait HostTokens {
    fn len(&self) -> usize;
    fn code(&self, ptr: TokenPtr) -> TokenCode;
    fn content(&self, ptr: TokenPtr) -> &str;

    fn scope_opener(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn scope_closer(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn parenthesis_opener(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn parenthesis_closer(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn bracket_opener(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn bracket_closer(&self, ptr: TokenPtr) -> Option<TokenPtr>;
    fn attribute_closer(&self, ptr: TokenPtr) -> Option<TokenPtr>;

    /// Tag tokens (`@param`, `@return`, `@var`, ...) inside the doc
    /// comment opened at `comment_opener`.
    fn comment_tags(&self, comment_opener: TokenPtr) -> Vec<TokenPtr>;
    fn comment_closer(&self, comment_opener: TokenPtr) -> Option<TokenPtr>;

    /// Line number for a token, used only to anchor diagnostics readably;
    /// the walker never reasons about line structure itself.
    fn line(&self, ptr: TokenPtr) -> usize;
}

/// Declaration-shaped queries the host answers about a pointer into its
/// token stream (spec §6).
pub trait HostFile {
    fn tokens(&self) -> &dyn HostTokens;

    fn declaration_name(&self, ptr: TokenPtr) -> Option<SmolStr>;
    fn find_extended_class_name(&self, ptr: TokenPtr) -> Option<SmolStr>;
    fn find_implemented_interface_names(&self, ptr: TokenPtr) -> Vec<SmolStr>;
    fn get_method_parameters(&self, ptr: TokenPtr) -> Vec<ParamInfo>;
    fn get_method_properties(&self, ptr: TokenPtr) -> MethodProperties;
    fn get_member_properties(&self, ptr: TokenPtr) -> Vec<MemberProperty>;
}
