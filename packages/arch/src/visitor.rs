use crate::node::{NodeId, NodeKind};
use crate::predicates::NodeRef;
use crate::Arch;

/// Visitor pattern for walking an Arch subtree in document order
///
/// Default implementations walk the whole subtree. Override a `visit_*`
/// method to act on a node kind; call the matching `walk_*` to keep going
/// below it.
pub trait Visitor<'a>: Sized {
    fn visit_node(&mut self, node: NodeRef<'a>) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: NodeRef<'a>) {
        walk_children(self, element);
    }

    fn visit_text(&mut self, _text: NodeRef<'a>) {
        // Leaf node, no children to walk
    }

    fn visit_virtual(&mut self, _virtual_text: NodeRef<'a>) {
        // Leaf node, no children to walk
    }

    fn visit_architectural_space(&mut self, _space: NodeRef<'a>) {
        // Leaf node, no children to walk
    }
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeRef<'a>) {
    match node.kind() {
        NodeKind::Root | NodeKind::Fragment => walk_children(visitor, node),
        NodeKind::Text(_) => visitor.visit_text(node),
        NodeKind::VirtualText => visitor.visit_virtual(node),
        NodeKind::ArchitecturalSpace(_) => visitor.visit_architectural_space(node),
        NodeKind::Element(_) | NodeKind::LineBreak | NodeKind::Custom { .. } => {
            visitor.visit_element(node)
        }
    }
}

pub fn walk_children<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeRef<'a>) {
    for child in node.children() {
        visitor.visit_node(child);
    }
}

/// Collects the ids of every node matching a predicate
pub struct Collector<F> {
    pred: F,
    pub found: Vec<NodeId>,
}

impl<F> Collector<F> {
    pub fn new(pred: F) -> Self {
        Self {
            pred,
            found: Vec::new(),
        }
    }
}

impl<'a, F: Fn(NodeRef<'a>) -> bool> Visitor<'a> for Collector<F> {
    fn visit_node(&mut self, node: NodeRef<'a>) {
        if (self.pred)(node) {
            self.found.push(node.id());
        }
        walk_node(self, node);
    }
}

impl Arch {
    /// Ids of the nodes below `id` matching `pred`, in document order
    pub fn collect(&self, id: NodeId, pred: impl Fn(NodeRef<'_>) -> bool) -> Vec<NodeId> {
        let Ok(node) = self.node(id) else {
            return Vec::new();
        };
        let mut collector = Collector::new(pred);
        walk_node(&mut collector, node);
        collector.found
    }

    /// Visible text nodes below `id`, in document order
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.collect(id, |node| node.is_visible_text())
    }
}
