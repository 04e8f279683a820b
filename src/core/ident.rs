//! Identifier character classification for the type lexer (spec §4.1).

/// First character of an identifier: letter, `_`, `$`, `\`, or any byte
/// that isn't ASCII (spec §4.1: "or any byte ≥ 0x7F").
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c == '\\' || !c.is_ascii() || c.is_ascii_alphabetic()
}

/// Identifier continuation: alphanumeric, `_`, high-byte, and also `-`/`\`
/// when the identifier didn't start with `$` (the caller tracks that last
/// condition; this only covers the character-class part).
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || !c.is_ascii() || c.is_ascii_alphanumeric() || unicode_ident::is_xid_continue(c)
}
