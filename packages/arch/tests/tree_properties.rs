//! Structural properties that must hold after any sequence of edits
//!
//! This tests:
//! - Parent/child symmetry
//! - Id stability across moves
//! - Split round-trip
//! - Void and unbreakable guards
//! - Paragraph merging through delete_edge

mod common;

use common::{assert_symmetric, find_text, load, markup};
use wysiwyg_arch::{ArchError, DeleteEdgeOptions, Violation, ViolationKind};

#[test]
fn test_symmetry_survives_edit_sequence() {
    let mut arch = load("<div><p>ab</p><p>cd</p></div>");
    let ab = find_text(&arch, "ab");
    let cd = find_text(&arch, "cd");

    arch.split(ab, 1).unwrap();
    assert_symmetric(&arch);

    arch.add_line(cd, 1).unwrap();
    assert_symmetric(&arch);

    let first = arch.parent(ab).unwrap();
    let quote = arch.wrap(first, "blockquote").unwrap();
    assert_symmetric(&arch);

    arch.unwrap(quote).unwrap();
    assert_symmetric(&arch);
    assert!(arch.is_removed(quote));
    assert_eq!(markup(&arch), "<div><p>ab</p><p>c</p><p>d</p></div>");
}

#[test]
fn test_ids_are_stable_across_moves() {
    let mut arch = load("<p>a</p><p>b</p>");
    let a = find_text(&arch, "a");
    let b = find_text(&arch, "b");
    let p2 = arch.parent(b).unwrap();

    arch.append(p2, a).unwrap();
    assert_eq!(arch.children(p2), &[b, a]);
    arch.prepend(p2, a).unwrap();
    assert_eq!(arch.children(p2), &[a, b]);
    arch.insert_after(p2, a, b).unwrap();
    assert_eq!(arch.children(p2), &[b, a]);
    arch.insert_before(p2, a, b).unwrap();
    assert_eq!(arch.children(p2), &[a, b]);

    for (id, value) in [(a, "a"), (b, "b")] {
        let node = arch.node(id).unwrap();
        assert_eq!(node.text(), Some(value));
        assert!(!node.data().is_removed());
        assert_eq!(node.parent().map(|p| p.id()), Some(p2));
    }
    assert_symmetric(&arch);
}

#[test]
fn test_split_round_trip() {
    let mut arch = load("<p>hello world</p>");
    let text = find_text(&arch, "hello world");
    let right = arch.split(text, 5).unwrap();

    let first = arch.node(text).unwrap();
    let second = arch.node(right).unwrap();
    let joined = format!("{}{}", first.text().unwrap(), second.text().unwrap());
    assert_eq!(joined.replace('\u{a0}', " "), "hello world");
    assert_eq!(first.next_sibling().map(|n| n.id()), Some(right));
}

#[test]
fn test_void_nodes_never_gain_children() {
    let mut arch = load("<p>a<img/></p>");
    let p = arch.children(arch.root())[0];
    let img = arch.children(p)[1];

    let x = arch.create_text("x");
    let error = arch.append(img, x).unwrap_err();
    assert!(matches!(
        error,
        ArchError::Violation(Violation { kind: ViolationKind::VoidContainer, .. })
    ));
    assert_eq!(arch.children(img).len(), 0);

    // Insertion delegates to the parent, in front of the void node
    arch.insert(img, x, 0).unwrap();
    assert_eq!(arch.children(img).len(), 0);
    assert_eq!(markup(&arch), "<p>ax<img/></p>");
}

#[test]
fn test_unbreakable_nodes_refuse_structural_edits() {
    let source = "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>";
    let mut arch = load(source);
    let a = find_text(&arch, "a");
    let td = arch.parent(a).unwrap();
    let tr = arch.parent(td).unwrap();
    let count = arch.node_count();

    assert!(arch.split(td, 0).is_err());
    assert!(arch.split(tr, 1).is_err());
    assert!(matches!(
        arch.remove(td),
        Err(ArchError::Violation(Violation { kind: ViolationKind::Unbreakable, .. }))
    ));
    arch.delete_edge(a, false, DeleteEdgeOptions::default()).unwrap();

    assert_eq!(arch.node_count(), count);
    assert_eq!(markup(&arch), source);
}

#[test]
fn test_delete_edge_merges_equal_paragraphs() {
    let mut arch = load("<p>A</p><p>B</p>");
    let a = find_text(&arch, "A");
    let b = find_text(&arch, "B");
    let p1 = arch.parent(a).unwrap();
    let p2 = arch.parent(b).unwrap();

    arch.delete_edge(p1, false, DeleteEdgeOptions::default()).unwrap();

    assert_eq!(arch.children(arch.root()), &[p1]);
    assert_eq!(arch.children(p1), &[a, b]);
    assert!(arch.is_removed(p2));
    assert_eq!(markup(&arch), "<p>AB</p>");
}

#[test]
fn test_delete_edge_from_caret_text() {
    let mut arch = load(r#"<p class="x">A</p><p class="x">B</p>"#);
    let a = find_text(&arch, "A");
    let p1 = arch.parent(a).unwrap();

    arch.delete_edge(a, false, DeleteEdgeOptions::default()).unwrap();
    assert_eq!(markup(&arch), r#"<p class="x">AB</p>"#);
    assert_eq!(arch.last_change(), Some((p1, 1)));
}

#[test]
fn test_removed_nodes_stay_removed() {
    let mut arch = load("<p>a</p><p>b</p>");
    // Drops the import fragment
    arch.purge_removed();
    let a = find_text(&arch, "a");
    let p1 = arch.parent(a).unwrap();
    arch.remove(p1).unwrap();

    let root = arch.root();
    assert!(matches!(
        arch.append(root, p1),
        Err(ArchError::Violation(Violation { kind: ViolationKind::Removed, .. }))
    ));
    assert!(arch.get_node(p1).is_err());
    assert_eq!(markup(&arch), "<p>b</p>");

    let purged = arch.purge_removed();
    assert_eq!(purged, 2);
    assert!(arch.data(p1).is_err());
}
