//! `TypeParser` (spec §4.2): recursive-descent parse and normalization of
//! a PHPDoc (or native) type-expression fragment.
//!
//! Each public entry point ([`parse_type_and_name`], [`parse_template`])
//! constructs a fresh [`Parser`], runs it to completion or failure, and
//! discards it — there is no parser state that survives past one call
//! (spec §9: "a single parser struct passed by mutable reference; each
//! public entry point constructs and discards it").

mod canon;

use smol_str::SmolStr;

use crate::base::TextSize;
use crate::hierarchy::Artifacts;
use crate::lexer::{Token, TypeLexer};
use crate::scope::Scope;
use crate::types::{Atom, CanonicalType, Fix, Intersection, ParseResult, PassSplat};

/// How much of the grammar a `parse_type_and_name` call should consume,
/// beyond the type itself (spec §4.2: `want ∈ {0,1,2,3}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Want {
    Type = 0,
    PlusName = 1,
    PlusPassSplat = 2,
    PlusDefaultValue = 3,
}

impl Want {
    fn wants_name(self) -> bool {
        self >= Want::PlusName
    }

    fn wants_pass_splat(self) -> bool {
        self >= Want::PlusPassSplat
    }

    fn wants_default_value(self) -> bool {
        self >= Want::PlusDefaultValue
    }
}

/// A recoverable parse failure, local to one speculative production.
/// Carries nothing: the caller always already holds the pre-attempt
/// snapshot and just restores it (spec §7: parse failures never escape
/// the parser boundary).
struct ParseFail;

type PResult<T> = Result<T, ParseFail>;

struct Parser<'a> {
    lexer: TypeLexer<'a>,
    scope: &'a Scope,
    artifacts: &'a Artifacts,
    fixes: Vec<Fix>,
    phpfig: bool,
    gowide: bool,
}

/// Fallback atom for an unrecognized construct: `mixed` for native
/// (`gowide`) annotations, `never` for PHPDoc text (spec §4.2).
fn fallback_atom(gowide: bool) -> Atom {
    if gowide {
        Atom::Mixed
    } else {
        Atom::Never
    }
}

impl<'a> Parser<'a> {
    fn new(scope: &'a Scope, artifacts: &'a Artifacts, text: &'a str, gowide: bool) -> Self {
        Parser {
            lexer: TypeLexer::new(text),
            scope,
            artifacts,
            fixes: Vec::new(),
            phpfig: true,
            gowide,
        }
    }

    fn mark_beyond_phpfig(&mut self) {
        self.phpfig = false;
    }

    fn cur(&mut self) -> Token {
        self.lexer.peek(0).clone()
    }

    fn at(&mut self, text: &str) -> bool {
        self.cur().as_str() == text
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.lexer.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> PResult<Token> {
        if self.at(text) {
            Ok(self.lexer.bump())
        } else {
            Err(ParseFail)
        }
    }

    /// Record a style-correction fix if `token`'s literal text differs
    /// from `canonical`.
    fn record_style_fix(&mut self, token: &Token, canonical: &str) {
        if token.as_str() != canonical {
            self.fixes.push(Fix::new(token.start(), token.end() - token.start(), canonical));
        }
    }

    // ---- anyType ----

    /// `anyType := '?' singleType | '$' IDENT 'is' TYPE '?' TYPE ':' TYPE
    ///           | intersection ('|' intersection)*`
    fn parse_any_type(&mut self) -> PResult<CanonicalType> {
        if self.at("?") {
            self.mark_beyond_phpfig();
            self.lexer.bump();
            let inner = self.parse_single_type()?;
            let mut members = inner.unions;
            members.push(Intersection::single(Atom::Null));
            return Ok(canon::canonicalize_union(members, self.artifacts));
        }

        if self.cur().as_str().starts_with('$') && self.peek_is("is", 1) {
            return self.parse_conditional_type();
        }

        let mut members = self.parse_intersection()?.unions;
        while self.eat("|") {
            members.extend(self.parse_intersection()?.unions);
        }
        Ok(canon::canonicalize_union(members, self.artifacts))
    }

    fn peek_is(&mut self, text: &str, k: usize) -> bool {
        self.lexer.peek(k).as_str() == text
    }

    /// `$IDENT is TYPE ? TYPE : TYPE` — canonicalized as the union of the
    /// `then` and `else` branches: at runtime the value is exactly one of
    /// the two, so their union is the safe static approximation.
    fn parse_conditional_type(&mut self) -> PResult<CanonicalType> {
        self.mark_beyond_phpfig();
        self.lexer.bump(); // $ident
        self.expect("is")?;
        self.parse_any_type()?; // condition type, consumed but not retained
        self.expect("?")?;
        let then_branch = self.parse_any_type()?;
        self.expect(":")?;
        let else_branch = self.parse_any_type()?;
        let mut members = then_branch.unions;
        members.extend(else_branch.unions);
        Ok(canon::canonicalize_union(members, self.artifacts))
    }

    /// `intersection := singleType ('&' singleType)*`, with the
    /// pass-by-reference disambiguation: `&` starts a new intersection
    /// member unless the token after it is `...`, `=`, `,`, `)`,
    /// end-of-stream, or a `$name` — those mark the trailing pass/splat
    /// marker and the variable name instead (spec §4.2).
    fn parse_intersection(&mut self) -> PResult<CanonicalType> {
        let mut atoms = self.parse_single_type_atoms()?;
        while self.at("&") && !self.amp_is_pass_by_ref() {
            self.lexer.bump();
            atoms.extend(self.parse_single_type_atoms()?);
        }
        let intersection = canon::canonicalize_intersection(atoms, self.artifacts).map_err(|_| ParseFail)?;
        Ok(CanonicalType {
            unions: vec![intersection],
        })
    }

    fn amp_is_pass_by_ref(&mut self) -> bool {
        let next = self.lexer.peek(1).as_str();
        next.is_empty() || next == "..." || next == "=" || next == "," || next == ")" || next.starts_with('$')
    }

    /// `singleType := '(' anyType ')' arraySuffix* | basicType arraySuffix*`
    fn parse_single_type_atoms(&mut self) -> PResult<Vec<Atom>> {
        let ty = self.parse_single_type()?;
        // "A parenthesized sub-union inside an intersection is an error
        // (non-DNF rejected)" — a singleType that expanded to more than
        // one top-level union member can only have come from `(A|B)`.
        let mut unions = ty.unions;
        if unions.len() != 1 {
            return Err(ParseFail);
        }
        Ok(unions.pop().expect("len checked == 1").0)
    }

    fn parse_single_type(&mut self) -> PResult<CanonicalType> {
        let base = if self.at("(") {
            self.lexer.bump();
            let inner = self.parse_any_type()?;
            self.expect(")")?;
            inner
        } else {
            CanonicalType::atom(self.parse_basic_type()?)
        };
        self.apply_array_suffixes(base)
    }

    fn apply_array_suffixes(&mut self, base: CanonicalType) -> PResult<CanonicalType> {
        let mut saw_suffix = false;
        while self.at("[") && self.peek_is("]", 1) {
            self.lexer.bump();
            self.lexer.bump();
            saw_suffix = true;
        }
        if saw_suffix {
            Ok(CanonicalType::atom(Atom::Array))
        } else {
            Ok(base)
        }
    }

    /// `basicType`: the closed keyword set, qualified names, `self`/
    /// `parent`/`static`/`$this`, and the generic/shape/range/mask/
    /// callable-signature/class-constant extensions (spec §4.2).
    fn parse_basic_type(&mut self) -> PResult<Atom> {
        let tok = self.cur();
        if tok.is_eof() {
            return Err(ParseFail);
        }
        let text = tok.as_str().to_string();

        if text.starts_with('$') {
            // `$this` is the only bare-variable form legal here.
            if text.eq_ignore_ascii_case("$this") {
                self.lexer.bump();
                return Ok(self.resolve_self());
            }
            return Err(ParseFail);
        }

        let lower = text.to_ascii_lowercase();
        if let Some(keyword) = keyword_atom(&lower) {
            if matches!(keyword, Atom::ArrayKey | Atom::Scalar) {
                self.mark_beyond_phpfig();
            }
            self.lexer.bump();
            self.record_style_fix(&tok, &keyword.to_string());
            return self.apply_basic_type_tail(keyword);
        }

        if let Some(atom) = self.parse_generic_only_keyword(&lower)? {
            return Ok(atom);
        }

        if text == "self" {
            self.lexer.bump();
            return self.apply_basic_type_tail(self.resolve_self());
        }
        if text == "parent" {
            self.mark_beyond_phpfig();
            self.lexer.bump();
            return self.apply_basic_type_tail(self.resolve_parent());
        }
        if text == "static" {
            self.lexer.bump();
            let atom = match &self.scope.classname {
                Some(fq) => Atom::Static(fq.clone()),
                None => fallback_atom(self.gowide),
            };
            return self.apply_basic_type_tail(atom);
        }

        if is_qualified_name(&text) {
            self.lexer.bump();
            let atom = self.resolve_qualified_name(&text);
            return self.apply_basic_type_tail(atom);
        }

        Err(ParseFail)
    }

    fn resolve_self(&self) -> Atom {
        match &self.scope.classname {
            Some(fq) => Atom::Class(fq.clone()),
            None => Atom::SelfTy,
        }
    }

    fn resolve_parent(&self) -> Atom {
        match &self.scope.parentname {
            Some(fq) => Atom::Class(fq.clone()),
            None => Atom::Parent,
        }
    }

    fn resolve_qualified_name(&self, text: &str) -> Atom {
        if text.starts_with('\\') {
            return Atom::Class(SmolStr::new(text));
        }
        // `resolve_name` checks `uses`, then `templates` (returned bare),
        // then qualifies against the current namespace (spec §4.2).
        Atom::Class(self.scope.resolve_name(text))
    }

    /// Generics (`array<K,V>`), shapes (`array{...}`/`object{...}`),
    /// ranges/masks (`int<MIN,MAX>`, `int-mask<...>`), `class-string<T>`,
    /// `key-of`/`value-of`, and `callable(params): ret` all reduce to
    /// their base keyword once parsed — the canonical type grammar has no
    /// slot for the decoration, matching spec §8 scenario 3
    /// (`array<int, string>` → `array`).
    fn apply_basic_type_tail(&mut self, base: Atom) -> PResult<Atom> {
        if self.at("<") {
            self.mark_beyond_phpfig();
            self.skip_balanced("<", ">")?;
            return Ok(base);
        }
        if self.at("{") {
            self.mark_beyond_phpfig();
            self.skip_balanced("{", "}")?;
            return Ok(base);
        }
        if matches!(base, Atom::Callable) && self.at("(") {
            self.mark_beyond_phpfig();
            self.skip_balanced("(", ")")?;
            if self.eat(":") {
                self.parse_any_type()?;
            }
            return Ok(base);
        }
        if self.at("::") {
            self.lexer.bump();
            if self.eat("*") {
                // `::*` with no constant name — spec §9: accepted as-is.
            } else if !self.expect_identifier_like() {
                return Err(ParseFail);
            }
            return Ok(fallback_atom(self.gowide));
        }
        Ok(base)
    }

    /// `key-of<I>`, `value-of<I>`, `class-string<OBJ>`, `int-mask<...>`,
    /// `int-mask-of<...>` — generic-only forms with no bare-keyword
    /// meaning of their own. Consumed (including their `<...>` argument,
    /// when present) and reduced directly, bypassing the qualified-name
    /// fallback entirely.
    fn parse_generic_only_keyword(&mut self, lower: &str) -> PResult<Option<Atom>> {
        let atom = match lower {
            "key-of" => Atom::ArrayKey,
            "value-of" => Atom::Mixed,
            "class-string" => Atom::String,
            "int-mask" | "int-mask-of" => Atom::Int,
            _ => return Ok(None),
        };
        self.lexer.bump();
        self.mark_beyond_phpfig();
        if self.at("<") {
            self.skip_balanced("<", ">")?;
        }
        Ok(Some(atom))
    }

    fn expect_identifier_like(&mut self) -> bool {
        let tok = self.cur();
        if tok.is_eof() || tok.as_str().is_empty() {
            return false;
        }
        self.lexer.bump();
        true
    }

    /// Consume tokens from the already-unconsumed `open` token through its
    /// matching `close`, tracking nesting. Contents are discarded: the
    /// canonical type grammar never preserves generic/shape/range payload
    /// detail.
    fn skip_balanced(&mut self, open: &str, close: &str) -> PResult<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        loop {
            let tok = self.cur();
            if tok.is_eof() {
                return Err(ParseFail);
            }
            let text = tok.as_str();
            if text == open {
                depth += 1;
            } else if text == close {
                depth -= 1;
                if depth == 0 {
                    self.lexer.bump();
                    return Ok(());
                }
            }
            self.lexer.bump();
        }
    }

    // ---- trailing content / pass-splat / name / default value ----

    /// After the grammar production the caller asked for, the next token
    /// must be end-of-input, one of `, ; : .`, or preceded by whitespace
    /// in the original text — otherwise the whole production is invalid
    /// (spec §4.2).
    fn trailing_content_ok(&mut self) -> bool {
        let tok = self.cur();
        if tok.is_eof() {
            return true;
        }
        if matches!(tok.as_str(), "," | ";" | ":" | ".") {
            return true;
        }
        matches!(self.lexer.char_before(tok.start()), Some(c) if c.is_whitespace())
    }

    fn parse_pass_splat(&mut self) -> PassSplat {
        let mut splat = PassSplat::default();
        if self.eat("&") {
            splat.by_ref = true;
        }
        if self.eat("...") {
            splat.variadic = true;
        }
        splat
    }

    fn parse_name(&mut self) -> Option<SmolStr> {
        let tok = self.cur();
        if tok.as_str().starts_with('$') {
            self.lexer.bump();
            Some(SmolStr::new(tok.as_str()))
        } else {
            None
        }
    }

    /// `= <default-value>`, consumed up to the next `,`/`)`/`;`/EOF. Only
    /// the literal `null` default triggers the implicit-nullable-default
    /// append (spec §9).
    fn parse_default_value(&mut self) -> bool {
        if !self.eat("=") {
            return false;
        }
        let mut saw_null = false;
        let mut first = true;
        loop {
            let tok = self.cur();
            if tok.is_eof() || matches!(tok.as_str(), "," | ")" | ";") {
                break;
            }
            if first && tok.as_str().eq_ignore_ascii_case("null") {
                saw_null = true;
            }
            first = false;
            self.lexer.bump();
        }
        saw_null
    }

    fn remaining_text(&mut self) -> SmolStr {
        let tok = self.cur();
        SmolStr::new(self.lexer.source_from(tok.start()))
    }
}

fn is_qualified_name(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c == '\\' || c.is_alphabetic() || c == '_' || !c.is_ascii())
}

/// Maps every recognized keyword spelling — canonical or a known alias —
/// to its atom, per spec §4.2's canonicalization table.
fn keyword_atom(lower: &str) -> Option<Atom> {
    Some(match lower {
        "int" | "integer" => Atom::Int,
        "float" | "double" => Atom::Float,
        "bool" | "boolean" => Atom::Bool,
        "string" => Atom::String,
        "array" => Atom::Array,
        "iterable" => Atom::Iterable,
        "object" => Atom::Object,
        "callable" => Atom::Callable,
        "resource" => Atom::Resource,
        "mixed" => Atom::Mixed,
        "never" | "never-return" | "never-returns" | "no-return" => Atom::Never,
        "null" => Atom::Null,
        "void" => Atom::Void,
        "array-key" => Atom::ArrayKey,
        "scalar" => Atom::Scalar,
        "callable-string" => Atom::CallableString,
        "key-of" => return None, // generic-only forms: handled via apply_basic_type_tail, never a bare atom
        "value-of" => return None,
        "class-string" => return None,
        "int-mask" | "int-mask-of" => return None,
        _ => return None,
    })
}

/// Entry point 1 (spec §4.2): parse a type, optionally followed by a
/// pass/splat marker, a `$name`, and a default value, according to
/// `want`. Any failure restores the lexer to its pre-attempt position and
/// yields a `ParseResult` with `type = None` (and `name = None` if a name
/// was requested but unobtainable).
pub fn parse_type_and_name(scope: &Scope, artifacts: &Artifacts, text: &str, want: Want, gowide: bool) -> ParseResult {
    let mut parser = Parser::new(scope, artifacts, text, gowide);
    let snapshot = parser.lexer.snapshot();

    let outcome = parse_type_and_name_inner(&mut parser, want);
    match outcome {
        Ok(mut result) => {
            result.fixed = render_fixed(text, &parser.fixes);
            result.phpfig = parser.phpfig;
            result
        }
        Err(ParseFail) => {
            tracing::trace!("type-and-name parse failed, rolling back: {text:?}");
            parser.lexer.restore(snapshot);
            ParseResult {
                ty: None,
                pass_splat: PassSplat::default(),
                name: None,
                rem: SmolStr::new(text),
                fixed: None,
                phpfig: true,
                implicit_nullable_default: false,
            }
        }
    }
}

fn parse_type_and_name_inner(parser: &mut Parser<'_>, want: Want) -> PResult<ParseResult> {
    let ty_snapshot = parser.lexer.snapshot();
    let ty = match parser.parse_any_type() {
        Ok(ty) => Some(ty),
        Err(ParseFail) => {
            parser.lexer.restore(ty_snapshot);
            parser.fixes.clear();
            parser.phpfig = true;
            None
        }
    };

    let pass_splat = if want.wants_pass_splat() {
        parser.parse_pass_splat()
    } else {
        PassSplat::default()
    };

    let name = if want.wants_name() { parser.parse_name() } else { None };

    let implicit_nullable_default = if want.wants_default_value() {
        let saw_null = parser.parse_default_value();
        saw_null && !ty.as_ref().is_some_and(CanonicalType::contains_null)
    } else {
        false
    };

    if !parser.trailing_content_ok() {
        return Err(ParseFail);
    }

    let rem = parser.remaining_text();
    Ok(ParseResult {
        ty,
        pass_splat,
        name,
        rem,
        fixed: None,
        phpfig: parser.phpfig,
        implicit_nullable_default,
    })
}

/// Entry point 2 (spec §4.2): `NAME ('of'|'as' TYPE)?`, defaulting the
/// upper bound to `mixed`.
pub fn parse_template(scope: &Scope, artifacts: &Artifacts, text: &str) -> ParseResult {
    let mut parser = Parser::new(scope, artifacts, text, false);
    let snapshot = parser.lexer.snapshot();

    match parse_template_inner(&mut parser) {
        Ok(mut result) => {
            result.fixed = render_fixed(text, &parser.fixes);
            result.phpfig = parser.phpfig;
            result
        }
        Err(ParseFail) => {
            tracing::trace!("template parse failed, rolling back: {text:?}");
            parser.lexer.restore(snapshot);
            ParseResult {
                ty: None,
                pass_splat: PassSplat::default(),
                name: None,
                rem: SmolStr::new(text),
                fixed: None,
                phpfig: true,
                implicit_nullable_default: false,
            }
        }
    }
}

fn parse_template_inner(parser: &mut Parser<'_>) -> PResult<ParseResult> {
    let name_tok = parser.cur();
    if name_tok.is_eof() || !is_qualified_name(name_tok.as_str()) {
        return Err(ParseFail);
    }
    parser.lexer.bump();
    let name = SmolStr::new(name_tok.as_str());

    let ty = if parser.eat("of") || parser.eat("as") {
        Some(parser.parse_any_type()?)
    } else {
        Some(CanonicalType::mixed())
    };

    if !parser.trailing_content_ok() {
        return Err(ParseFail);
    }

    let rem = parser.remaining_text();
    Ok(ParseResult {
        ty,
        pass_splat: PassSplat::default(),
        name: Some(name),
        rem,
        fixed: None,
        phpfig: parser.phpfig,
        implicit_nullable_default: false,
    })
}

/// Apply accumulated fix records right-to-left to produce the "fixed"
/// rendering, or `None` when there's nothing to fix (spec §3).
fn render_fixed(text: &str, fixes: &[Fix]) -> Option<SmolStr> {
    if fixes.is_empty() {
        None
    } else {
        Some(SmolStr::new(crate::types::apply_fixes(text, fixes)))
    }
}
