//! `TypeLexer` — a hand-rolled, lookahead-capable cursor over a PHPDoc type
//! expression (spec §4.1).
//!
//! This lexes the *doc-comment fragment text* that the walker hands to the
//! parser; it has no relationship to, and does not reuse, a host source
//! tokenizer. The grammar is small and irregular enough that a real
//! token-class enum buys little — callers inspect `Token::text` directly,
//! the way the spec's grammar is written.

use std::collections::VecDeque;

use smol_str::SmolStr;

use crate::base::{Span, TextSize};
use crate::core::{is_ident_continue, is_ident_start};

/// A single lexical token: a `(start, end)` span over the original text,
/// plus its text. `text` is `None` to mark end-of-input or an unterminated
/// string literal (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub text: Option<SmolStr>,
}

impl Token {
    fn eof(at: usize) -> Self {
        let pos = TextSize::new(at as u32);
        Token {
            span: Span::empty(pos),
            text: None,
        }
    }

    pub fn start(&self) -> TextSize {
        self.span.start()
    }

    pub fn end(&self) -> TextSize {
        self.span.end()
    }

    /// Borrow the token's text, or `""` for end-of-stream — convenient for
    /// `matches!`/equality checks against literal punctuation.
    pub fn as_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn is_eof(&self) -> bool {
        self.text.is_none()
    }
}

/// A copy of the lexer's internal position, used to roll back a speculative
/// parse (spec §4.2, §9: "snapshot/restore is by copying the lookahead
/// queue and the next-token pointer").
#[derive(Debug, Clone)]
pub struct LexerSnapshot {
    queue: VecDeque<Token>,
    cursor: usize,
}

/// Single-threaded cursor over a type-expression fragment, with a growable
/// lookahead queue (spec §4.1, §5).
pub struct TypeLexer<'a> {
    src: &'a str,
    /// Byte offset of the next character not yet tokenized.
    cursor: usize,
    queue: VecDeque<Token>,
}

impl<'a> TypeLexer<'a> {
    pub fn new(src: &'a str) -> Self {
        TypeLexer {
            src,
            cursor: 0,
            queue: VecDeque::new(),
        }
    }

    /// Text of the `k`-th upcoming token (0 = current, not-yet-consumed).
    pub fn peek(&mut self, k: usize) -> &Token {
        while self.queue.len() <= k {
            let tok = self.lex_one();
            self.queue.push_back(tok);
        }
        &self.queue[k]
    }

    /// Consume and return the current token, advancing the queue.
    pub fn bump(&mut self) -> Token {
        self.peek(0);
        self.queue
            .pop_front()
            .expect("peek(0) above guarantees a queued token")
    }

    /// The raw character immediately preceding `pos` in the original
    /// fragment, used to detect "no space before `&`" style smells (spec
    /// §4.1).
    pub fn char_before(&self, pos: TextSize) -> Option<char> {
        let pos = u32::from(pos) as usize;
        self.src[..pos].chars().next_back()
    }

    /// The original source text from `pos` to the end of the fragment —
    /// used to populate `ParseResult.rem` with whatever trailing text a
    /// parse attempt left unconsumed.
    pub fn source_from(&self, pos: TextSize) -> &'a str {
        &self.src[u32::from(pos) as usize..]
    }

    pub fn snapshot(&self) -> LexerSnapshot {
        LexerSnapshot {
            queue: self.queue.clone(),
            cursor: self.cursor,
        }
    }

    pub fn restore(&mut self, snap: LexerSnapshot) {
        self.queue = snap.queue;
        self.cursor = snap.cursor;
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.cursor..];
        let skip: usize = rest
            .char_indices()
            .take_while(|(_, c)| c.is_whitespace())
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        self.cursor += skip;
    }

    fn lex_one(&mut self) -> Token {
        self.skip_whitespace();
        if self.cursor >= self.src.len() {
            return Token::eof(self.cursor);
        }

        let rest = &self.src[self.cursor..];
        let start = self.cursor;
        let mut chars = rest.char_indices();
        let (_, first) = chars.next().expect("cursor < src.len()");

        if is_ident_start(first) {
            return self.lex_identifier(start, first);
        }
        if first == '-' || first.is_ascii_digit() {
            if first == '-' {
                if let Some((_, next)) = chars.next() {
                    if next.is_ascii_digit() {
                        return self.lex_number(start);
                    }
                }
            } else {
                return self.lex_number(start);
            }
        }
        if first == '\'' || first == '"' {
            return self.lex_string(start, first);
        }
        if rest.starts_with("...") {
            return self.make_token(start, 3);
        }
        if rest.starts_with("::") {
            return self.make_token(start, 2);
        }
        self.make_token(start, first.len_utf8())
    }

    fn lex_identifier(&mut self, start: usize, first: char) -> Token {
        let allow_dash_backslash = first != '$';
        let mut end = start + first.len_utf8();
        for c in self.src[end..].chars() {
            if is_ident_continue(c) || (allow_dash_backslash && (c == '-' || c == '\\')) {
                end += c.len_utf8();
            } else {
                break;
            }
        }
        self.finish(start, end)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let mut end = start;
        let mut chars = self.src[start..].char_indices().peekable();
        if self.src[start..].starts_with('-') {
            end += 1;
            chars.next();
        }
        let mut seen_dot = false;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_digit() || c == '_' {
                end = start + i + c.len_utf8();
                chars.next();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                end = start + i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        self.finish(start, end)
    }

    fn lex_string(&mut self, start: usize, quote: char) -> Token {
        let unterminated = |this: &mut Self| {
            this.cursor = this.src.len();
            Token {
                span: this.span_of(start, this.src.len()),
                text: None,
            }
        };

        let body_start = start + quote.len_utf8();
        let mut chars = self.src[body_start..].char_indices();
        loop {
            match chars.next() {
                None => return unterminated(self),
                Some((_, '\\')) => {
                    // Escape one following character, if there is one.
                    if chars.next().is_none() {
                        return unterminated(self);
                    }
                }
                Some((i, c)) if c == quote => {
                    let end = body_start + i + c.len_utf8();
                    return self.finish(start, end);
                }
                Some(_) => continue,
            }
        }
    }

    fn make_token(&mut self, start: usize, len: usize) -> Token {
        self.finish(start, start + len)
    }

    fn finish(&mut self, start: usize, end: usize) -> Token {
        self.cursor = end;
        Token {
            span: self.span_of(start, end),
            text: Some(SmolStr::new(&self.src[start..end])),
        }
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        Span::new(TextSize::new(start as u32), TextSize::new(end as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        let mut lexer = TypeLexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.bump();
            if tok.is_eof() {
                break;
            }
            out.push(tok.as_str().to_string());
        }
        out
    }

    #[test]
    fn lexes_union_of_keywords() {
        assert_eq!(texts("int|string"), vec!["int", "|", "string"]);
    }

    #[test]
    fn lexes_qualified_name() {
        assert_eq!(texts("\\Foo\\Bar"), vec!["\\Foo\\Bar"]);
    }

    #[test]
    fn lexes_generic_brackets_and_comma() {
        assert_eq!(
            texts("array<int, string>"),
            vec!["array", "<", "int", ",", "string", ">"]
        );
    }

    #[test]
    fn lexes_class_constant_suffix() {
        assert_eq!(texts("Foo::BAR"), vec!["Foo", "::", "BAR"]);
    }

    #[test]
    fn lexes_splat() {
        assert_eq!(texts("...$rest"), vec!["...", "$rest"]);
    }

    #[test]
    fn lexes_negative_int_range() {
        assert_eq!(
            texts("int<-5,5>"),
            vec!["int", "<", "-5", ",", "5", ">"]
        );
    }

    #[test]
    fn lexes_string_literal_with_escape() {
        assert_eq!(texts(r#"'it\'s'"#), vec![r#"'it\'s'"#]);
    }

    #[test]
    fn unterminated_string_is_end_of_stream() {
        let mut lexer = TypeLexer::new("'unterminated");
        let tok = lexer.bump();
        assert!(tok.is_eof());
        let next = lexer.bump();
        assert!(next.is_eof());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = TypeLexer::new("int|string");
        assert_eq!(lexer.peek(0).as_str(), "int");
        assert_eq!(lexer.peek(1).as_str(), "|");
        assert_eq!(lexer.bump().as_str(), "int");
        assert_eq!(lexer.peek(0).as_str(), "|");
    }

    #[test]
    fn snapshot_restores_position() {
        let mut lexer = TypeLexer::new("int|string");
        lexer.bump();
        let snap = lexer.snapshot();
        lexer.bump();
        lexer.bump();
        lexer.restore(snap);
        assert_eq!(lexer.peek(0).as_str(), "|");
    }

    #[test]
    fn char_before_inspects_raw_source() {
        let mut lexer = TypeLexer::new("int&string");
        let first = lexer.bump();
        let amp = lexer.peek(0);
        assert_eq!(lexer.char_before(amp.start()), Some('t'));
        let _ = first;
    }

    #[test]
    fn char_before_detects_preceding_space() {
        let mut lexer = TypeLexer::new("int &string");
        lexer.bump();
        let amp = lexer.peek(0);
        assert_eq!(lexer.char_before(amp.start()), Some(' '));
    }
}
