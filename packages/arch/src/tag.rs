//! Element tag names.
//!
//! Tags are compared as enum values instead of strings; the table below is
//! the single mapping between a variant and its serialized (lowercase) name.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! tags {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Known element tag, or `Other` for anything outside the table
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum Tag {
            $($variant,)*
            Other(Box<str>),
        }

        impl Tag {
            /// Parse a tag name (case-insensitive)
            pub fn from_name(name: &str) -> Self {
                let lower = name.trim().to_ascii_lowercase();
                match lower.as_str() {
                    $($name => Tag::$variant,)*
                    _ => Tag::Other(lower.into_boxed_str()),
                }
            }

            /// Serialized markup name
            pub fn as_str(&self) -> &str {
                match self {
                    $(Tag::$variant => $name,)*
                    Tag::Other(name) => name,
                }
            }
        }
    };
}

tags! {
    A => "a",
    Abbr => "abbr",
    Acronym => "acronym",
    Address => "address",
    Area => "area",
    Article => "article",
    Aside => "aside",
    Audio => "audio",
    B => "b",
    Base => "base",
    Bdi => "bdi",
    Bdo => "bdo",
    Big => "big",
    Blink => "blink",
    Blockquote => "blockquote",
    Br => "br",
    Button => "button",
    Canvas => "canvas",
    Caption => "caption",
    Cite => "cite",
    Code => "code",
    Col => "col",
    Data => "data",
    Datalist => "datalist",
    Dd => "dd",
    Del => "del",
    Details => "details",
    Dfn => "dfn",
    Dialog => "dialog",
    Div => "div",
    Dl => "dl",
    Dt => "dt",
    Em => "em",
    Embed => "embed",
    Fieldset => "fieldset",
    Figcaption => "figcaption",
    Figure => "figure",
    Font => "font",
    Footer => "footer",
    Form => "form",
    H1 => "h1",
    H2 => "h2",
    H3 => "h3",
    H4 => "h4",
    H5 => "h5",
    H6 => "h6",
    Header => "header",
    Hgroup => "hgroup",
    Hr => "hr",
    I => "i",
    Iframe => "iframe",
    Img => "img",
    Input => "input",
    Ins => "ins",
    Kbd => "kbd",
    Label => "label",
    Li => "li",
    Link => "link",
    Main => "main",
    Map => "map",
    Mark => "mark",
    Meta => "meta",
    Meter => "meter",
    Nav => "nav",
    Nobr => "nobr",
    Noscript => "noscript",
    Object => "object",
    Ol => "ol",
    Output => "output",
    P => "p",
    Param => "param",
    Picture => "picture",
    Pre => "pre",
    Progress => "progress",
    Q => "q",
    Ruby => "ruby",
    S => "s",
    Samp => "samp",
    Script => "script",
    Section => "section",
    Select => "select",
    Slot => "slot",
    Small => "small",
    Source => "source",
    Span => "span",
    Strike => "strike",
    Strong => "strong",
    Sub => "sub",
    Sup => "sup",
    Svg => "svg",
    Table => "table",
    Tbody => "tbody",
    Td => "td",
    Template => "template",
    Textarea => "textarea",
    Tfoot => "tfoot",
    Th => "th",
    Thead => "thead",
    Time => "time",
    Tr => "tr",
    Track => "track",
    Tt => "tt",
    U => "u",
    Ul => "ul",
    Var => "var",
    Video => "video",
    Wbr => "wbr",
}

impl Tag {
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6
        )
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::from_name(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::from_name(&name)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_are_case_insensitive() {
        assert_eq!(Tag::from_name("P"), Tag::P);
        assert_eq!(Tag::from_name("blockQuote"), Tag::Blockquote);
        assert_eq!(Tag::Td.as_str(), "td");
    }

    #[test]
    fn test_unknown_tags_are_kept_lowercase() {
        let tag = Tag::from_name("My-Widget");
        assert_eq!(tag, Tag::Other("my-widget".into()));
        assert_eq!(tag.to_string(), "my-widget");
    }

    #[test]
    fn test_tag_serializes_as_name() {
        let json = serde_json::to_string(&vec![Tag::Strong, Tag::from_name("x-y")]).unwrap();
        assert_eq!(json, r#"["strong","x-y"]"#);
        let back: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Tag::Strong, Tag::Other("x-y".into())]);
    }
}
