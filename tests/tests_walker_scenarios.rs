//! End-to-end scenarios driving `DeclarationWalker` through the public
//! `testing` fixture builder (spec §8).

use phpdoc_typecheck::testing::{FakeFile, FakeTokenStream, RecordingShim};
use phpdoc_typecheck::walker::host::{MemberProperty, MethodProperties, ParamInfo, TokenCode};
use phpdoc_typecheck::walker::DeclarationWalker;
use phpdoc_typecheck::{codes, Config};
use smol_str::SmolStr;

/// A function with no doc block at all is flagged missing, not crashed on.
#[test]
fn missing_doc_block_on_public_function_is_reported() {
    let mut tokens = FakeTokenStream::new();
    let function_ptr = tokens.push(TokenCode::Function, "function");
    let closer = tokens.push(TokenCode::CloseCurly, "}");
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
            native_return_type_text: Some(SmolStr::new("void")),
            is_public: true,
            is_closure: false,
            by_ref_return: false,
        },
    );

    let mut shim = RecordingShim::new();
    DeclarationWalker::run(&file, &mut shim, Config::strict());
    assert!(shim.has_code(codes::MISSING_DOC_BLOCK));
}

/// A matching `@param`/`@return` doc block produces no diagnostics.
#[test]
fn matching_doc_block_produces_no_findings() {
    let mut tokens = FakeTokenStream::new();
    let doc_open = tokens.push(TokenCode::DocCommentOpen, "/**");
    let param_tag = tokens.push(TokenCode::DocCommentTag, "@param");
    tokens.push(TokenCode::DocCommentWhitespace, " ");
    tokens.push(TokenCode::DocCommentString, "int $x");
    let return_tag = tokens.push(TokenCode::DocCommentTag, "@return");
    tokens.push(TokenCode::DocCommentWhitespace, " ");
    tokens.push(TokenCode::DocCommentString, "string");
    let doc_close = tokens.push(TokenCode::DocCommentClose, "*/");
    let function_ptr = tokens.push(TokenCode::Function, "function");
    let closer = tokens.push(TokenCode::CloseCurly, "}");
    tokens.set_comment(doc_open, vec![param_tag, return_tag], doc_close);
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
            native_return_type_text: Some(SmolStr::new("string")),
            is_public: true,
            is_closure: false,
            by_ref_return: false,
        },
    );

    let mut shim = RecordingShim::new();
    DeclarationWalker::run(&file, &mut shim, Config::strict());
    assert!(shim.errors().is_empty());
    assert!(shim.warnings().is_empty());
}

/// A `@param` tag on a classish declaration (rather than a function) is
/// reported as misplaced.
#[test]
fn misplaced_param_tag_on_class_is_reported() {
    let mut tokens = FakeTokenStream::new();
    let doc_open = tokens.push(TokenCode::DocCommentOpen, "/**");
    let param_tag = tokens.push(TokenCode::DocCommentTag, "@param");
    tokens.push(TokenCode::DocCommentWhitespace, " ");
    tokens.push(TokenCode::DocCommentString, "int $x");
    let doc_close = tokens.push(TokenCode::DocCommentClose, "*/");
    let class_ptr = tokens.push(TokenCode::Class, "class");
    let closer = tokens.push(TokenCode::CloseCurly, "}");
    tokens.set_comment(doc_open, vec![param_tag], doc_close);
    tokens.set_scope(class_ptr, closer);

    let mut file = FakeFile::new(tokens);
    file.declaration_name(class_ptr, "Widget");

    let mut shim = RecordingShim::new();
    DeclarationWalker::run(&file, &mut shim, Config::strict());
    assert!(shim.has_code(codes::TAG_MISPLACED));
}

/// A non-canonical `@var` spelling (e.g. `integer`) produces a fixable
/// style warning, and applying the fix replaces the tag's type token.
#[test]
fn non_canonical_var_type_is_fixable() {
    let mut tokens = FakeTokenStream::new();
    let class_ptr = tokens.push(TokenCode::Class, "class");
    let doc_open = tokens.push(TokenCode::DocCommentOpen, "/**");
    let var_tag = tokens.push(TokenCode::DocCommentTag, "@var");
    tokens.push(TokenCode::DocCommentWhitespace, " ");
    tokens.push(TokenCode::DocCommentString, "integer");
    let doc_close = tokens.push(TokenCode::DocCommentClose, "*/");
    let prop_ptr = tokens.push(TokenCode::Variable, "$count");
    let closer = tokens.push(TokenCode::CloseCurly, "}");
    tokens.set_comment(doc_open, vec![var_tag], doc_close);
    tokens.set_scope(class_ptr, closer);

    let mut file = FakeFile::new(tokens);
    file.declaration_name(class_ptr, "Widget");
    file.member_props(
        class_ptr,
        vec![MemberProperty {
            name: SmolStr::new("$count"),
            native_type_text: Some(SmolStr::new("int")),
            is_public: true,
            ptr: prop_ptr,
        }],
    );

    let mut shim = RecordingShim::new();
    shim.apply_fixes = true;
    DeclarationWalker::run(&file, &mut shim, Config::strict());
    assert!(shim.has_code(codes::VAR_TYPE_STYLE));
}
