//! Capability predicates.
//!
//! [`NodeRef`] is a borrowed view over one node of an [`Arch`]. Every base
//! [`Capability`] is answered by a method of the same name; `is_in` and
//! `is_not` derive the ancestor variants from a capability value.
//! Predicates read the current tree and are never cached.

use crate::kind::{Capability, CustomKind};
use crate::node::{ArchNode, NodeId, NodeKind};
use crate::{Arch, Attributes, Tag};
use std::fmt;

const CONTENT_EDITABLE: &str = "contenteditable";

#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    arch: &'a Arch,
    id: NodeId,
    data: &'a ArchNode,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.data.kind)
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.arch, other.arch)
    }
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(arch: &'a Arch, id: NodeId, data: &'a ArchNode) -> Self {
        Self { arch, id, data }
    }

    pub(crate) fn at(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.arch.nodes.get(id).map(|data| NodeRef::new(self.arch, id, data))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn arch(&self) -> &'a Arch {
        self.arch
    }

    pub fn data(&self) -> &'a ArchNode {
        self.data
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.data.kind
    }

    pub fn tag(&self) -> Option<&'a Tag> {
        self.data.kind.tag()
    }

    pub fn node_name(&self) -> Option<&'a str> {
        self.data.node_name()
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.data.attributes
    }

    /// Text value; `""` for virtual text, `None` for containers
    pub fn text(&self) -> Option<&'a str> {
        self.data.kind.text()
    }

    pub fn length(&self) -> usize {
        self.data.length()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data.parent.and_then(|parent| self.at(parent))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let arch = self.arch;
        self.data
            .children
            .iter()
            .filter_map(move |id| arch.nodes.get(*id).map(|data| NodeRef::new(arch, *id, data)))
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.data.children.get(index).and_then(|id| self.at(*id))
    }

    pub fn child_count(&self) -> usize {
        self.data.children.len()
    }

    /// Nearest self-or-ancestor matching `pred`
    pub fn ancestor(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if pred(node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    pub fn custom_kind(&self) -> Option<&'a dyn CustomKind> {
        match &self.data.kind {
            NodeKind::Custom { kind, .. } => self.arch.kinds.get(*kind),
            _ => None,
        }
    }

    fn has_tag(&self, tag: &Tag) -> bool {
        self.tag() == Some(tag)
    }

    fn overridden(&self, capability: Capability, default: impl FnOnce() -> bool) -> bool {
        self.custom_kind()
            .and_then(|kind| kind.capability(capability))
            .unwrap_or_else(default)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub fn is(&self, capability: Capability) -> bool {
        match capability {
            Capability::Anchor => self.is_anchor(),
            Capability::ArchitecturalSpace => self.is_architectural_space(),
            Capability::BlankText => self.is_blank_text(),
            Capability::Block => self.is_block(),
            Capability::Blockquote => self.is_blockquote(),
            Capability::Br => self.is_br(),
            Capability::Cell => self.is_cell(),
            Capability::Clone => self.is_clone(),
            Capability::ContentEditable => self.is_content_editable(),
            Capability::Data => self.is_data(),
            Capability::DeepEmpty => self.is_deep_empty(),
            Capability::Editable => self.is_editable(),
            Capability::Element => self.is_element(),
            Capability::Empty => self.is_empty(),
            Capability::FormatNode => self.is_format_node(),
            Capability::Fragment => self.is_fragment(),
            Capability::Hr => self.is_hr(),
            Capability::Icon => self.is_icon(),
            Capability::Img => self.is_img(),
            Capability::Inline => self.is_inline(),
            Capability::InlineFormatNode => self.is_inline_format_node(),
            Capability::InvisibleBr => self.is_invisible_br(),
            Capability::Li => self.is_li(),
            Capability::List => self.is_list(),
            Capability::Media => self.is_media(),
            Capability::Para => self.is_para(),
            Capability::Pre => self.is_pre(),
            Capability::Root => self.is_root(),
            Capability::Span => self.is_span(),
            Capability::Table => self.is_table(),
            Capability::Text => self.is_text(),
            Capability::Textarea => self.is_textarea(),
            Capability::Unbreakable => self.is_unbreakable(),
            Capability::Virtual => self.is_virtual(),
            Capability::VisibleBr => self.is_visible_br(),
            Capability::VisibleText => self.is_visible_text(),
            Capability::Void => self.is_void(),
            Capability::VoidBlock => self.is_void_block(),
        }
    }

    /// Self or an ancestor has the capability
    pub fn is_in(&self, capability: Capability) -> bool {
        self.ancestor(|node| node.is(capability)).is_some()
    }

    /// Neither self nor any ancestor has the capability
    pub fn is_not(&self, capability: Capability) -> bool {
        !self.is_in(capability)
    }

    pub fn is_in_tag(&self, tag: &Tag) -> bool {
        self.ancestor(|node| node.has_tag(tag)).is_some()
    }

    // ------------------------------------------------------------------
    // Kinds
    // ------------------------------------------------------------------

    pub fn is_root(&self) -> bool {
        matches!(self.data.kind, NodeKind::Root)
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.data.kind, NodeKind::Fragment)
    }

    pub fn is_text(&self) -> bool {
        self.data.kind.is_text_like()
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.data.kind, NodeKind::VirtualText)
    }

    pub fn is_architectural_space(&self) -> bool {
        matches!(self.data.kind, NodeKind::ArchitecturalSpace(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(
            self.data.kind,
            NodeKind::Element(_) | NodeKind::LineBreak | NodeKind::Custom { .. }
        )
    }

    pub fn is_br(&self) -> bool {
        matches!(self.data.kind, NodeKind::LineBreak)
    }

    pub fn is_clone(&self) -> bool {
        self.data.clone_of.is_some()
    }

    /// Whitespace-only text, outside of `pre`
    pub fn is_blank_text(&self) -> bool {
        match &self.data.kind {
            NodeKind::Text(value) => {
                value.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) && !self.is_in(Capability::Pre)
            }
            _ => false,
        }
    }

    pub fn is_visible_text(&self) -> bool {
        matches!(self.data.kind, NodeKind::Text(_)) && !self.is_blank_text()
    }

    // ------------------------------------------------------------------
    // Tag tables
    // ------------------------------------------------------------------

    pub fn is_inline(&self) -> bool {
        match &self.data.kind {
            NodeKind::Root | NodeKind::Fragment => false,
            NodeKind::Text(_) | NodeKind::VirtualText | NodeKind::ArchitecturalSpace(_) => true,
            NodeKind::LineBreak => true,
            NodeKind::Element(tag) => self.arch.config.is_inline_tag(tag),
            NodeKind::Custom { tag, .. } => {
                self.overridden(Capability::Inline, || self.arch.config.is_inline_tag(tag))
            }
        }
    }

    pub fn is_block(&self) -> bool {
        self.overridden(Capability::Block, || !self.is_inline())
    }

    pub fn is_void(&self) -> bool {
        match &self.data.kind {
            NodeKind::LineBreak => true,
            NodeKind::Element(tag) => self.arch.config.is_void_tag(tag),
            NodeKind::Custom { tag, .. } => {
                self.overridden(Capability::Void, || self.arch.config.is_void_tag(tag))
            }
            _ => false,
        }
    }

    pub fn is_void_block(&self) -> bool {
        (self.is_void() && !self.is_br()) || self.arch.hooks.void_block(*self)
    }

    /// Paragraph-like blocks and inline formatting elements
    pub fn is_format_node(&self) -> bool {
        self.overridden(Capability::FormatNode, || {
            self.tag().is_some_and(|tag| {
                self.arch.config.is_style_tag(tag) || self.arch.config.is_format_tag(tag)
            })
        })
    }

    pub fn is_inline_format_node(&self) -> bool {
        self.overridden(Capability::InlineFormatNode, || {
            self.tag().is_some_and(|tag| self.arch.config.is_format_tag(tag))
        })
    }

    pub fn is_para(&self) -> bool {
        self.tag()
            .is_some_and(|tag| *tag == Tag::Div || self.arch.config.is_style_tag(tag))
    }

    pub fn is_anchor(&self) -> bool {
        let config = &self.arch.config;
        let attributes = self.attributes();
        let anchor_like = self.has_tag(&Tag::A)
            || self.has_tag(&Tag::Button)
            || config.anchor_classes.iter().any(|class| attributes.has_class(class));
        anchor_like
            && !config
                .non_anchor_classes
                .iter()
                .any(|class| attributes.has_class(class))
    }

    pub fn is_blockquote(&self) -> bool {
        self.has_tag(&Tag::Blockquote)
    }

    pub fn is_cell(&self) -> bool {
        self.has_tag(&Tag::Td) || self.has_tag(&Tag::Th)
    }

    pub fn is_data(&self) -> bool {
        self.has_tag(&Tag::Data)
    }

    pub fn is_hr(&self) -> bool {
        self.has_tag(&Tag::Hr)
    }

    pub fn is_img(&self) -> bool {
        self.has_tag(&Tag::Img)
    }

    pub fn is_li(&self) -> bool {
        self.has_tag(&Tag::Li)
    }

    pub fn is_list(&self) -> bool {
        self.has_tag(&Tag::Ul) || self.has_tag(&Tag::Ol)
    }

    pub fn is_pre(&self) -> bool {
        self.has_tag(&Tag::Pre)
    }

    pub fn is_span(&self) -> bool {
        self.has_tag(&Tag::Span)
    }

    pub fn is_table(&self) -> bool {
        self.has_tag(&Tag::Table)
    }

    pub fn is_textarea(&self) -> bool {
        self.has_tag(&Tag::Textarea)
    }

    pub fn is_icon(&self) -> bool {
        self.overridden(Capability::Icon, || false)
    }

    pub fn is_media(&self) -> bool {
        self.overridden(Capability::Media, || false)
    }

    pub fn is_invisible_br(&self) -> bool {
        self.is_br() && self.next_sibling().is_none()
    }

    pub fn is_visible_br(&self) -> bool {
        self.is_br() && !self.is_invisible_br()
    }

    // ------------------------------------------------------------------
    // Editability
    // ------------------------------------------------------------------

    pub fn is_content_editable(&self) -> bool {
        self.is_root()
            || self.attributes().value(CONTENT_EDITABLE).as_deref() == Some("true")
            || self.arch.hooks.editable_node(*self)
    }

    /// Decided by the nearest editing boundary; free fragments are editable
    pub fn is_editable(&self) -> bool {
        let boundary = self.ancestor(|node| {
            node.is_root()
                || node.is_content_editable()
                || node.attributes().value(CONTENT_EDITABLE).as_deref() == Some("false")
        });
        boundary.map_or(true, |node| node.is_content_editable())
    }

    pub fn is_unbreakable(&self) -> bool {
        self.tag().is_some_and(|tag| self.arch.config.is_unbreakable_tag(tag))
            || self.is_content_editable()
            || self.arch.hooks.unbreakable_node(*self)
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    pub fn is_empty(&self) -> bool {
        if self.is_text() {
            return self.length() == 0;
        }
        let mut children = self.children();
        match (children.next(), children.next()) {
            (None, _) => true,
            (Some(only), None) if only.is_br() || (only.is_text() && only.is_empty()) => true,
            _ => self.is_filled_with_only_blank(),
        }
    }

    pub fn is_filled_with_only_blank(&self) -> bool {
        self.children().all(|child| {
            child.is_virtual() || child.is_architectural_space() || child.is_blank_text()
        })
    }

    /// No visible descendant content. A lone line break counts as empty,
    /// other void elements (images, icons) never do.
    pub fn is_deep_empty(&self) -> bool {
        if self.is_br() {
            let lone_before = self.previous_sibling().map_or(true, |prev| !prev.is_br());
            let lone_after = self
                .next_sibling()
                .map_or(true, |next| !next.is_br() && !next.is_virtual());
            return lone_before && lone_after;
        }
        if self.is_void() {
            return false;
        }
        if self.is_text() {
            return self.is_empty() || self.is_architectural_space();
        }
        if self.child_count() == 0 {
            return self.is_empty();
        }
        self.children().all(|child| child.is_deep_empty())
    }

    /// Expects text content but holds none
    pub fn is_blank_node(&self) -> bool {
        if self.is_void() {
            return false;
        }
        if self.is_text() {
            return self.is_blank_text() || self.is_virtual() || self.is_architectural_space();
        }
        self.children().all(|child| child.is_blank_node())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// No visible sibling precedes this node
    pub fn is_left_edge(&self) -> bool {
        let (Some(parent), Some(index)) = (self.parent(), self.index()) else {
            return false;
        };
        parent.children().take(index).all(|sibling| sibling.is_architectural_space())
    }

    /// No visible sibling follows this node
    pub fn is_right_edge(&self) -> bool {
        let (Some(parent), Some(index)) = (self.parent(), self.index()) else {
            return false;
        };
        parent.children().skip(index + 1).all(|sibling| sibling.is_architectural_space())
    }

    pub fn is_left_edge_of(&self, ancestor: NodeId) -> bool {
        self.is_edge_of(ancestor, |node| node.is_left_edge())
    }

    pub fn is_right_edge_of(&self, ancestor: NodeId) -> bool {
        self.is_edge_of(ancestor, |node| node.is_right_edge())
    }

    fn is_edge_of(&self, ancestor: NodeId, is_edge: impl Fn(&NodeRef<'a>) -> bool) -> bool {
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.id == ancestor {
                break;
            }
            if !is_edge(&node) {
                return false;
            }
            current = node.parent();
        }
        true
    }

    pub fn is_left_edge_of_block(&self) -> bool {
        self.is_edge_of_block(|node| node.is_left_edge())
    }

    pub fn is_right_edge_of_block(&self) -> bool {
        self.is_edge_of_block(|node| node.is_right_edge())
    }

    fn is_edge_of_block(&self, is_edge: impl Fn(&NodeRef<'a>) -> bool) -> bool {
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.is_block() {
                break;
            }
            if !is_edge(&node) {
                return false;
            }
            current = node.parent();
        }
        true
    }

    pub fn is_inline_formatting_context(&self) -> bool {
        self.parent()
            .is_some_and(|parent| parent.children().all(|child| child.is_inline() || child.is_void()))
    }

    pub fn is_block_formatting_context(&self) -> bool {
        !self.is_inline_formatting_context()
    }

    /// Self or an ancestor is `ancestor`
    pub fn is_descendent_of(&self, ancestor: NodeId) -> bool {
        self.ancestor(|node| node.id == ancestor).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArchConfig, ArchHooks};

    fn build(arch: &mut Arch, markup: &str) -> NodeId {
        let fragment = arch.parse_fragment(markup).unwrap();
        let first = arch.children(fragment)[0];
        arch.append(arch.root(), fragment).unwrap();
        first
    }

    #[test]
    fn test_block_and_inline() {
        let mut arch = Arch::default();
        let p = build(&mut arch, "<p>a<b>b</b><font>c</font></p>");
        let node = arch.node(p).unwrap();
        assert!(node.is_block());
        assert!(node.is_para());
        assert!(node.is_format_node());
        assert!(!node.is_inline_format_node());

        let children: Vec<_> = node.children().collect();
        assert!(children.iter().all(|c| c.is_inline()));
        assert!(children[1].is_inline_format_node());
        assert!(children[0].is_inline_formatting_context());
    }

    #[test]
    fn test_derived_ancestor_predicates() {
        let mut arch = Arch::default();
        let ul = build(&mut arch, "<ul><li><p>x</p></li></ul>");
        let li = arch.children(ul)[0];
        let p = arch.children(li)[0];
        let text = arch.node(arch.children(p)[0]).unwrap();

        assert!(text.is_in(Capability::Li));
        assert!(text.is_in(Capability::List));
        assert!(text.is_in_tag(&Tag::Ul));
        assert!(text.is_not(Capability::Table));
        assert!(!text.is_not(Capability::Para));
        assert!(text.is_descendent_of(ul));
    }

    #[test]
    fn test_anchor_classes() {
        let mut arch = Arch::default();
        let div = build(
            &mut arch,
            r#"<div><a href="/">a</a><span class="btn">b</span><a class="o_image">c</a></div>"#,
        );
        let anchors: Vec<_> = arch.node(div).unwrap().children().map(|c| c.is_anchor()).collect();
        assert_eq!(anchors, vec![true, true, false]);
    }

    #[test]
    fn test_editable_boundaries() {
        let mut arch = Arch::default();
        let div = build(
            &mut arch,
            r#"<div contenteditable="false"><p>x</p><div contenteditable="true"><p>y</p></div></div>"#,
        );
        let node = arch.node(div).unwrap();
        let locked = node.child(0).unwrap();
        let island = node.child(1).unwrap();

        assert!(!node.is_editable());
        assert!(!locked.is_editable());
        assert!(island.is_editable());
        assert!(island.is_unbreakable());
        assert!(island.child(0).unwrap().is_editable());

        let free = arch.create_tag("p");
        assert!(arch.node(free).unwrap().is_editable());
    }

    #[test]
    fn test_deep_empty() {
        let mut arch = Arch::default();
        let div = build(
            &mut arch,
            "<div><p><br/></p><p><b></b></p><p><img/></p><p>x</p><p><br/><br/></p></div>",
        );
        let flags: Vec<_> = arch
            .node(div)
            .unwrap()
            .children()
            .map(|p| p.is_deep_empty())
            .collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_edges_skip_architectural_space() {
        let mut arch = Arch::default();
        let div = build(&mut arch, "<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        let paragraphs: Vec<_> = arch
            .node(div)
            .unwrap()
            .children()
            .filter(|c| !c.is_architectural_space())
            .collect();
        assert!(paragraphs[0].is_left_edge());
        assert!(!paragraphs[0].is_right_edge());
        assert!(paragraphs[1].is_right_edge());

        let text = paragraphs[0].child(0).unwrap();
        assert!(text.is_left_edge_of(div));
        assert!(!text.is_right_edge_of(div));
        assert!(text.is_left_edge_of_block());
    }

    #[test]
    fn test_host_hooks() {
        let hooks = ArchHooks::default()
            .with_unbreakable_node(|node| node.attributes().has_class("o_locked"))
            .with_void_block(|node| node.has_tag(&Tag::from_name("x-embed")));
        let mut arch = Arch::with_hooks(ArchConfig::default(), hooks);
        let div = build(&mut arch, r#"<div><p class="o_locked">a</p><x-embed></x-embed></div>"#);
        let node = arch.node(div).unwrap();

        assert!(node.child(0).unwrap().is_unbreakable());
        assert!(node.child(1).unwrap().is_void_block());
        assert!(!node.is_unbreakable());
    }

    #[test]
    fn test_icon_overrides() {
        let mut arch = Arch::default();
        let p = build(&mut arch, r#"<p><span class="fa fa-star"></span></p>"#);
        let icon = arch.node(p).unwrap().child(0).unwrap();

        assert!(icon.is_icon());
        assert!(icon.is_media());
        assert!(icon.is_void());
        assert!(icon.is_inline());
        assert!(!icon.is_format_node());
        assert!(!icon.is_anchor());
        assert!(icon.is(Capability::Icon));
    }

    #[test]
    fn test_visible_br() {
        let mut arch = Arch::default();
        let p = build(&mut arch, "<p>a<br/>b<br/></p>");
        let brs: Vec<_> = arch.node(p).unwrap().children().filter(|c| c.is_br()).collect();
        assert!(brs[0].is_visible_br());
        assert!(brs[1].is_invisible_br());
    }
}
