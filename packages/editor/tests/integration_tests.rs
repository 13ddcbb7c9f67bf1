//! Integration tests for editor crate
//!
//! Full editing sessions driven the way a host drives them: native
//! selection through the bridge, commands as JSON, markup out.

use anyhow::Result;
use wysiwyg_editor::{
    ArchConfig, ChangeKind, EditCommand, EditorDocument, EditorError, HeadlessBridge,
    NativeSelection, PartialRange, Range,
};
use wysiwyg_arch::ViolationKind;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn load(markup: &str) -> Result<EditorDocument> {
    init_tracing();
    Ok(EditorDocument::from_markup(ArchConfig::default(), markup)?)
}

#[test]
fn test_typing_session() -> Result<()> {
    let mut doc = load("<p>Hello</p>")?;
    let text = doc.arch().text_nodes(doc.root())[0];

    let mut bridge = HeadlessBridge::new();
    bridge.set_selection(NativeSelection::caret(text, 5), "");
    doc.sync_selection(&bridge)?;

    let result = doc.apply(EditCommand::InsertText { text: " world".into() })?;
    assert_eq!(result.range, Range::caret(text, 11));

    // Enter at the end opens an empty paragraph holding the caret
    let result = doc.apply(EditCommand::AddLine)?;
    assert_eq!(doc.arch().children(doc.root()).len(), 2);
    assert!(doc.arch().node(result.range.sc)?.is_virtual());
    assert!(result.changes.iter().any(|change| change.kind == ChangeKind::Add));

    doc.apply(EditCommand::InsertText { text: "!".into() })?;
    assert_eq!(doc.markup()?, "<p>Hello world</p><p>!</p>");
    assert_eq!(doc.version, 3);
    Ok(())
}

#[test]
fn test_backspace_joins_paragraphs() -> Result<()> {
    let mut doc = load("<p>ab</p><p>cd</p>")?;
    let cd = doc.arch().text_nodes(doc.root())[1];
    doc.select_range(Range::caret(cd, 0))?;

    let result = doc.apply(EditCommand::RemoveLeft)?;
    assert_eq!(doc.markup()?, "<p>abcd</p>");
    // Caret lands at the join point
    assert_eq!(result.range, Range::caret(cd, 0));

    let result = doc.apply(EditCommand::RemoveLeft)?;
    assert_eq!(doc.markup()?, "<p>acd</p>");
    assert!(result.range.is_collapsed());
    Ok(())
}

#[test]
fn test_commands_from_json() -> Result<()> {
    let mut doc = load("<p>abcd</p>")?;
    let text = doc.arch().text_nodes(doc.root())[0];
    doc.select(&HeadlessBridge::new(), Some(PartialRange { sc: Some(text), so: Some(1), ec: Some(text), eo: Some(3), ..Default::default() }))?;

    let command = EditCommand::from_json(r#"{"type":"WrapSelection","tag":"em"}"#)?;
    let result = doc.apply(command)?;
    assert_eq!(doc.markup()?, "<p>a<em>bc</em>d</p>");

    let wire = serde_json::to_string(&result)?;
    assert!(wire.contains("\"changes\""));
    assert!(wire.contains("\"version\":1"));

    doc.apply(EditCommand::from_json(r#"{"type":"UnwrapFormat","tag":"em"}"#)?)?;
    assert_eq!(doc.markup()?, "<p>abcd</p>");
    Ok(())
}

#[test]
fn test_paste_markup_at_caret() -> Result<()> {
    let mut doc = load("<p>ad</p>")?;
    let text = doc.arch().text_nodes(doc.root())[0];
    doc.select_range(Range::caret(text, 1))?;

    doc.apply(EditCommand::InsertMarkup { markup: "<b>bc</b>".into() })?;
    assert_eq!(doc.markup()?, "<p>a<b>bc</b>d</p>");

    let bad = doc.apply(EditCommand::InsertMarkup { markup: "<b>x</i>".into() });
    assert!(matches!(bad, Err(EditorError::Markup(_))));
    Ok(())
}

#[test]
fn test_refused_command_keeps_document() -> Result<()> {
    let source = "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>";
    let mut doc = load(source)?;
    let a = doc.arch().text_nodes(doc.root())[0];
    let td = doc.arch().parent(a).unwrap();

    let result = doc.apply(EditCommand::SetAttribute {
        node_id: td,
        name: "colspan".into(),
        value: "2".into(),
    })?;
    assert_eq!(result.changes.len(), 1);

    doc.select_range(Range::caret(td, 0))?;
    assert!(doc.apply(EditCommand::UnwrapFormat { tag: "td".into() }).is_err());
    assert_eq!(
        doc.markup()?,
        r#"<table><tbody><tr><td colspan="2">a</td><td>b</td></tr></tbody></table>"#
    );
    Ok(())
}

#[test]
fn test_range_survives_merge() -> Result<()> {
    let mut doc = load("<p>a</p><p>b</p>")?;
    let p1 = doc.arch().children(doc.root())[0];

    // Pull the second paragraph into the first
    doc.select_range(Range::caret(p1, 1))?;
    doc.apply(EditCommand::DeleteEdge {
        is_left: false,
        options: Default::default(),
    })?;
    assert_eq!(doc.markup()?, "<p>ab</p>");
    assert!(doc.range().is_attached(doc.arch()));
    Ok(())
}

#[test]
fn test_refused_wrap_leaves_text_whole() -> Result<()> {
    let mut doc = load("<p>abcd</p>")?;
    let text = doc.arch().text_nodes(doc.root())[0];
    doc.select_range(Range { sc: text, so: 1, ec: text, eo: 3 })?;

    let err = doc
        .apply(EditCommand::WrapSelection { tag: "img".into() })
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Arch(ref error) if error.violation() == Some(ViolationKind::VoidContainer)
    ));
    assert_eq!(doc.markup()?, "<p>abcd</p>");
    assert_eq!(doc.arch().text_nodes(doc.root()), vec![text]);
    assert_eq!(doc.range(), Range { sc: text, so: 1, ec: text, eo: 3 });

    // The selection is still usable
    doc.apply(EditCommand::WrapSelection { tag: "em".into() })?;
    assert_eq!(doc.markup()?, "<p>a<em>bc</em>d</p>");
    Ok(())
}
