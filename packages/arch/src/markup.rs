//! Markup import.
//!
//! Builds detached subtrees from HTML-like markup. Import is structural
//! only: nodes are attached without editing policy so that non editable
//! regions and unbreakable tables come through intact.

use crate::errors::{MarkupError, MarkupResult};
use crate::lexer::{decode_entities, lex, parse_start_tag, Token};
use crate::node::NodeId;
use crate::{Arch, ArchConfig, Attributes, Tag};
use tracing::{debug, instrument};

struct OpenElement {
    id: NodeId,
    tag: Tag,
}

impl Arch {
    /// Parse markup into a detached fragment
    #[instrument(level = "debug", skip(self, markup), fields(len = markup.len()))]
    pub fn parse_fragment(&mut self, markup: &str) -> MarkupResult<NodeId> {
        let fragment = self.create_fragment();
        let mut open: Vec<OpenElement> = Vec::new();

        for spanned in lex(markup) {
            let spanned = spanned?;
            let parent = open.last().map_or(fragment, |element| element.id);

            match spanned.token {
                Token::Comment | Token::Doctype => {}
                Token::Text(raw) => {
                    let in_pre = open.iter().any(|element| element.tag == Tag::Pre);
                    let node = if !in_pre && raw.contains('\n') && raw.trim().is_empty() {
                        self.create_architectural_space(raw)
                    } else {
                        self.create_text(decode_entities(raw))
                    };
                    self.attach(parent, node)?;
                }
                Token::StartTag(raw) => {
                    let start = parse_start_tag(raw);
                    let tag = Tag::from_name(&start.name);
                    let node = self.create_element(tag.clone(), Attributes::from_pairs(start.attributes));
                    self.attach(parent, node)?;
                    if !start.self_closing && !self.config.is_void_tag(&tag) {
                        open.push(OpenElement { id: node, tag });
                    }
                }
                Token::EndTag(name) => {
                    let tag = Tag::from_name(name);
                    match open.iter().rposition(|element| element.tag == tag) {
                        // Elements left open inside are closed implicitly
                        Some(position) => open.truncate(position),
                        None if self.config.is_void_tag(&tag) => {}
                        None => {
                            return Err(MarkupError::UnexpectedClose {
                                name: name.to_string(),
                                pos: spanned.start,
                            })
                        }
                    }
                }
            }
        }

        debug!(unclosed = open.len(), "Parsed fragment");
        Ok(fragment)
    }

    /// New document holding `markup` under its root; the change log starts empty
    pub fn from_markup(config: ArchConfig, markup: &str) -> MarkupResult<Arch> {
        let mut arch = Arch::new(config);
        let fragment = arch.parse_fragment(markup)?;
        let root = arch.root();
        arch.append(root, fragment)?;
        arch.drain_changes();
        Ok(arch)
    }

    /// Parse `markup` and insert it at `offset` of `target`
    pub fn insert_markup(&mut self, target: NodeId, markup: &str, offset: usize) -> MarkupResult<()> {
        let fragment = self.parse_fragment(markup)?;
        self.insert(target, fragment, offset)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, SerializeOptions};

    #[test]
    fn test_parse_nested() {
        let arch = Arch::from_markup(
            ArchConfig::default(),
            r#"<div class="a b"><p>Hello <b>world</b></p><img src="x.png"></div>"#,
        )
        .unwrap();
        let div = arch.children(arch.root())[0];
        let node = arch.node(div).unwrap();
        assert_eq!(node.node_name(), Some("div"));
        assert!(node.attributes().has_class("b"));
        assert_eq!(arch.children(div).len(), 2);

        let p = arch.children(div)[0];
        assert_eq!(arch.node(p).unwrap().child_count(), 2);
        let img = arch.children(div)[1];
        assert_eq!(arch.node(img).unwrap().attributes().value("src").as_deref(), Some("x.png"));
        assert!(arch.changes().is_empty());
    }

    #[test]
    fn test_architectural_space() {
        let arch = Arch::from_markup(ArchConfig::default(), "<div>\n  <p>a b</p>\n</div><pre>\n</pre>").unwrap();
        let div = arch.children(arch.root())[0];
        let kinds: Vec<_> = arch
            .children(div)
            .iter()
            .map(|id| arch.data(*id).unwrap().kind().clone())
            .collect();
        assert!(matches!(kinds[0], NodeKind::ArchitecturalSpace(_)));
        assert!(matches!(kinds[1], NodeKind::Element(Tag::P)));
        assert!(matches!(kinds[2], NodeKind::ArchitecturalSpace(_)));

        let pre = arch.children(arch.root())[1];
        let newline = arch.children(pre)[0];
        assert_eq!(arch.data(newline).unwrap().kind(), &NodeKind::Text("\n".into()));
    }

    #[test]
    fn test_void_and_line_breaks() {
        let arch = Arch::from_markup(ArchConfig::default(), "<p>a<br>b<br/></br></p>").unwrap();
        let p = arch.children(arch.root())[0];
        assert_eq!(arch.children(p).len(), 4);
        assert_eq!(arch.data(arch.children(p)[1]).unwrap().kind(), &NodeKind::LineBreak);
        assert_eq!(
            arch.to_markup(arch.root(), SerializeOptions::default()).unwrap(),
            "<p>a<br/>b<br/></p>"
        );
    }

    #[test]
    fn test_unclosed_elements_close_implicitly() {
        let arch = Arch::from_markup(ArchConfig::default(), "<ul><li>a<li>b</ul>").unwrap();
        let ul = arch.children(arch.root())[0];
        assert_eq!(arch.children(ul).len(), 1);
        assert_eq!(
            arch.to_markup(arch.root(), SerializeOptions::default()).unwrap(),
            "<ul><li>a<li>b</li></li></ul>"
        );
    }

    #[test]
    fn test_errors() {
        let mut arch = Arch::default();
        assert!(matches!(
            arch.parse_fragment("<p>a</span></p>"),
            Err(MarkupError::UnexpectedClose { ref name, pos: 4 }) if name == "span"
        ));
        assert!(matches!(
            arch.parse_fragment("<p>1 < 2</p>"),
            Err(MarkupError::Lexer { pos: 5 })
        ));
    }

    #[test]
    fn test_entities_decoded() {
        let arch = Arch::from_markup(ArchConfig::default(), "<p>a&nbsp;&amp;&nbsp;b</p>").unwrap();
        let p = arch.children(arch.root())[0];
        let text = arch.children(p)[0];
        assert_eq!(arch.node(text).unwrap().text(), Some("a\u{a0}&\u{a0}b"));
    }

    #[test]
    fn test_insert_markup() {
        let mut arch = Arch::from_markup(ArchConfig::default(), "<p>ad</p>").unwrap();
        let p = arch.children(arch.root())[0];
        let text = arch.children(p)[0];
        arch.insert_markup(text, "<b>bc</b>", 1).unwrap();
        assert_eq!(
            arch.to_markup(arch.root(), SerializeOptions::default()).unwrap(),
            "<p>a<b>bc</b>d</p>"
        );
    }
}
