//! `Comment`/`TagOccurrence` (spec §3, §4.5): a parsed doc-comment block
//! and its individual `@param`/`@return`/`@var` tags, as read off the host
//! token stream.

use smol_str::SmolStr;

use crate::shim::TokenPtr;
use crate::walker::host::{HostTokens, TokenCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Param,
    Return,
    Var,
    /// Any other recognized-but-irrelevant tag (`@throws`, `@deprecated`,
    /// ...) — kept only so misplacement/duplication checks can see the
    /// full tag list, never type-checked itself.
    Other,
}

fn classify(tag_text: &str) -> TagKind {
    match tag_text {
        "@param" => TagKind::Param,
        "@return" => TagKind::Return,
        "@var" => TagKind::Var,
        _ => TagKind::Other,
    }
}

/// One `@tag ...` line. `type_text` and `var_name` are the raw, unparsed
/// substrings the walker slices off the tag's trailing text — the actual
/// type parse happens later, against a `Scope`, not here.
#[derive(Debug, Clone)]
pub struct TagOccurrence {
    pub kind: TagKind,
    pub ptr: TokenPtr,
    /// Text following the tag name, up to the next tag or the comment
    /// close, whitespace-trimmed (e.g. `"string $x description"`).
    pub rest: SmolStr,
}

impl TagOccurrence {
    /// Split `rest` into the leading type-expression text and everything
    /// after it (the `$name` plus any trailing description), by cutting at
    /// the first run of whitespace. `@return` tags have no name component;
    /// callers of this helper for `@return` simply ignore the second half.
    pub fn split_type_and_rest(&self) -> (&str, &str) {
        match self.rest.find(char::is_whitespace) {
            Some(i) => (&self.rest[..i], self.rest[i..].trim_start()),
            None => (&self.rest, ""),
        }
    }

    /// For `@param`/`@var`: the `$name` token inside `rest`, wherever it
    /// falls (PHPDoc allows `@param string $x` and the less common
    /// `@param $x string`, so this scans both halves rather than assuming
    /// type-then-name order).
    pub fn var_name(&self) -> Option<SmolStr> {
        self.rest
            .split_whitespace()
            .find(|w| w.starts_with('$'))
            .map(SmolStr::new)
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub opener: TokenPtr,
    pub closer: TokenPtr,
    pub tags: Vec<TagOccurrence>,
}

/// Read every tag inside the doc comment opened at `opener` off the host
/// token stream. The text of a tag is everything between it and the next
/// tag (or the comment's close), with doc-comment star/whitespace noise
/// joined and trimmed.
pub fn parse_comment(tokens: &dyn HostTokens, opener: TokenPtr) -> Comment {
    let closer = tokens.comment_closer(opener).unwrap_or(opener);
    let tag_ptrs = tokens.comment_tags(opener);

    let mut tags = Vec::with_capacity(tag_ptrs.len());
    for (i, &tag_ptr) in tag_ptrs.iter().enumerate() {
        let end = tag_ptrs.get(i + 1).copied().unwrap_or(closer);
        let rest = collect_text_between(tokens, tag_ptr + 1, end);
        tags.push(TagOccurrence {
            kind: classify(tokens.content(tag_ptr)),
            ptr: tag_ptr,
            rest: SmolStr::new(rest.trim()),
        });
    }

    Comment { opener, closer, tags }
}

/// Join token content from `start` (inclusive) to `end` (exclusive),
/// skipping pure decoration tokens (`*`, leading whitespace) so the
/// resulting text reads as a normal sentence.
fn collect_text_between(tokens: &dyn HostTokens, start: TokenPtr, end: TokenPtr) -> String {
    let mut out = String::new();
    let mut ptr = start;
    while ptr < end && ptr < tokens.len() {
        match tokens.code(ptr) {
            TokenCode::DocCommentStar | TokenCode::DocCommentOpen | TokenCode::DocCommentClose => {}
            TokenCode::DocCommentWhitespace => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push_str(tokens.content(ptr)),
        }
        ptr += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureTokens {
        codes: Vec<TokenCode>,
        content: Vec<&'static str>,
    }

    impl HostTokens for FixtureTokens {
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
        fn scope_closer(&self, _ptr: usize) -> Option<usize> {
            None
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
        fn comment_tags(&self, _comment_opener: usize) -> Vec<usize> {
            self.codes
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == TokenCode::DocCommentTag)
                .map(|(i, _)| i)
                .collect()
        }
        fn comment_closer(&self, _comment_opener: usize) -> Option<usize> {
            Some(self.codes.len() - 1)
        }
        fn line(&self, _ptr: usize) -> usize {
            1
        }
    }

    #[test]
    fn parses_param_tag_type_and_name() {
        let tokens = FixtureTokens {
            codes: vec![
                TokenCode::DocCommentOpen,
                TokenCode::DocCommentTag,
                TokenCode::DocCommentWhitespace,
                TokenCode::DocCommentString,
                TokenCode::DocCommentWhitespace,
                TokenCode::DocCommentString,
                TokenCode::DocCommentClose,
            ],
            content: vec!["/**", "@param", " ", "string", " ", "$x", "*/"],
        };
        let comment = parse_comment(&tokens, 0);
        assert_eq!(comment.tags.len(), 1);
        let tag = &comment.tags[0];
        assert!(matches!(tag.kind, TagKind::Param));
        let (ty, _rest) = tag.split_type_and_rest();
        assert_eq!(ty, "string");
        assert_eq!(tag.var_name().as_deref(), Some("$x"));
    }

    #[test]
    fn separates_multiple_tags() {
        let tokens = FixtureTokens {
            codes: vec![
                TokenCode::DocCommentOpen,
                TokenCode::DocCommentTag,
                TokenCode::DocCommentWhitespace,
                TokenCode::DocCommentString,
                TokenCode::DocCommentTag,
                TokenCode::DocCommentWhitespace,
                TokenCode::DocCommentString,
                TokenCode::DocCommentClose,
            ],
            content: vec!["/**", "@param", " ", "int", "@return", " ", "string", "*/"],
        };
        let comment = parse_comment(&tokens, 0);
        assert_eq!(comment.tags.len(), 2);
        assert_eq!(comment.tags[0].split_type_and_rest().0, "int");
        assert_eq!(comment.tags[1].split_type_and_rest().0, "string");
        assert!(matches!(comment.tags[1].kind, TagKind::Return));
    }
}
