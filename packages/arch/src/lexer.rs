//! Markup tokens using logos.
//!
//! Two small lexers: one splitting a document into tags and text, one
//! splitting the inside of a start tag into attribute names and values.

use crate::errors::MarkupError;
use logos::Logos;

/// Top-level markup tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    #[regex(r"<!--[^>]*-->")]
    Comment,

    #[regex(r"<![a-zA-Z][^>]*>")]
    Doctype,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim()
    })]
    EndTag(&'src str),

    /// Whole start tag, brackets included
    #[regex(r"<[a-zA-Z][^>]*>", |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens inside a start tag, after the tag name
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum AttrToken<'src> {
    #[regex(r#"[^ \t\r\n=/>"']+"#, |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    DoubleQuoted(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoted(&'src str),

    /// `=` followed by an unquoted value, which may contain slashes
    #[regex(r#"=[ \t\r\n]*[^ \t\r\n"'=][^ \t\r\n]*"#, |lex| lex.slice()[1..].trim_start())]
    Unquoted(&'src str),

    #[token("/")]
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub start: usize,
    pub end: usize,
}

/// Lex markup, reporting the byte offset of anything that is not a tag or text
pub fn lex(source: &str) -> impl Iterator<Item = Result<SpannedToken<'_>, MarkupError>> + '_ {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok(SpannedToken {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(_) => Err(MarkupError::Lexer { pos: span.start }),
        })
}

/// A parsed start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Split `<name attr="v" flag/>` into its parts
pub fn parse_start_tag(raw: &str) -> StartTag {
    let inner = &raw[1..raw.len() - 1];
    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_string();
    let rest = &inner[name_end..];

    let mut attributes = Vec::new();
    let mut self_closing = false;
    let mut pending: Option<String> = None;
    let mut expects_value = false;

    for (token, span) in AttrToken::lexer(rest).spanned() {
        let Ok(token) = token else {
            continue;
        };
        match token {
            AttrToken::Name(value) if expects_value => {
                if let Some(name) = pending.take() {
                    attributes.push((name, decode_entities(value)));
                }
                expects_value = false;
            }
            AttrToken::Name(name) => {
                if let Some(flag) = pending.replace(name.to_ascii_lowercase()) {
                    attributes.push((flag, String::new()));
                }
                self_closing = false;
            }
            AttrToken::Eq => expects_value = pending.is_some(),
            AttrToken::DoubleQuoted(value) | AttrToken::SingleQuoted(value) => {
                if let Some(name) = pending.take() {
                    attributes.push((name, decode_entities(value)));
                }
                expects_value = false;
            }
            AttrToken::Unquoted(value) => {
                // `/` right before `>` closes the tag
                let value = match value.strip_suffix('/') {
                    Some(stripped) if span.end == rest.len() && !stripped.is_empty() => {
                        self_closing = true;
                        stripped
                    }
                    _ => value,
                };
                if let Some(name) = pending.take() {
                    attributes.push((name, decode_entities(value)));
                }
                expects_value = false;
            }
            AttrToken::Slash => self_closing = true,
        }
    }
    if let Some(flag) = pending {
        attributes.push((flag, String::new()));
    }

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

/// Decode the character references an editor round-trips
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];
        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
