//! # Editor Document
//!
//! One Arch tree plus the current range. A command either applies and the
//! range is resolved again from the change log, or it is refused before it
//! touches the tree and the range is clamped to what is still attached.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Select → Apply → Drain changes → Re-resolve range
//!  ↓       ↓        ↓           ↓                 ↓
//! Arch   Range  EditCommand  CommandResult      Range
//! ```

use crate::commands::{CommandResult, EditCommand};
use crate::errors::{EditorError, EditorResult};
use crate::range::{PartialRange, Range};
use crate::selection::SelectionBridge;
use tracing::{debug, instrument, warn};
use wysiwyg_arch::{Arch, ArchConfig, NodeId, SerializeOptions};

#[derive(Debug)]
pub struct EditorDocument {
    arch: Arch,

    /// Current selection
    range: Range,

    /// Current version number (increments on each command)
    pub version: u64,
}

impl EditorDocument {
    pub fn new(arch: Arch) -> Self {
        let range = end_of_document(&arch);
        Self {
            arch,
            range,
            version: 0,
        }
    }

    pub fn from_markup(config: ArchConfig, markup: &str) -> EditorResult<Self> {
        Ok(Self::new(Arch::from_markup(config, markup)?))
    }

    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn markup(&self) -> EditorResult<String> {
        Ok(self.arch.to_markup(self.arch.root(), SerializeOptions::default())?)
    }

    /// Set the range, resolving it against the tree
    pub fn select<B: SelectionBridge>(
        &mut self,
        bridge: &B,
        partial: Option<PartialRange<B::Handle>>,
    ) -> EditorResult<Range> {
        self.range = Range::new(&self.arch, bridge, partial)?;
        Ok(self.range)
    }

    /// Set the range from ids and offsets
    pub fn select_range(&mut self, range: Range) -> EditorResult<Range> {
        self.arch.get_node(range.sc)?;
        self.arch.get_node(range.ec)?;
        self.range = range;
        Ok(range)
    }

    /// Adopt the host's native selection
    pub fn sync_selection<B: SelectionBridge>(&mut self, bridge: &B) -> EditorResult<Range> {
        self.range = Range::from_selection(&self.arch, bridge)?;
        Ok(self.range)
    }

    /// Apply a command
    #[instrument(level = "debug", skip(self), fields(command = command.name()))]
    pub fn apply(&mut self, command: EditCommand) -> EditorResult<CommandResult> {
        self.version += 1;

        let outcome = self.run(command);
        let changes = self.arch.drain_changes();
        let range = match outcome {
            Ok(range) => range,
            Err(error) => {
                warn!(version = self.version, error = %error, "Command failed");
                self.range = self.surviving_range();
                return Err(error);
            }
        };

        self.range = match range {
            Some(range) => range,
            None => self.resolve_range(),
        };
        debug!(version = self.version, changes = changes.len(), "Command applied");

        Ok(CommandResult {
            version: self.version,
            changes,
            range: self.range,
        })
    }

    /// Run a command; an explicit range overrides the caret taken from the
    /// change log
    fn run(&mut self, command: EditCommand) -> EditorResult<Option<Range>> {
        let Range { sc, so, .. } = self.range;
        match command {
            EditCommand::InsertText { text } => self.arch.insert_text(sc, so, &text)?,
            EditCommand::InsertMarkup { markup } => self.arch.insert_markup(sc, &markup, so)?,
            EditCommand::RemoveLeft => self.arch.remove_left(sc, so)?,
            EditCommand::RemoveRight => self.arch.remove_right(sc, so)?,
            EditCommand::AddLine => self.arch.add_line(sc, so)?,
            EditCommand::DeleteEdge { is_left, options } => self.arch.delete_edge(sc, is_left, options)?,
            EditCommand::WrapSelection { tag } => return self.wrap_selection(&tag).map(Some),
            EditCommand::UnwrapFormat { tag } => {
                let format = self
                    .arch
                    .get_node(sc)?
                    .ancestor(|node| node.node_name() == Some(tag.as_str()))
                    .map(|node| node.id())
                    .ok_or(EditorError::UnsupportedSelection("no such format around the caret"))?;
                self.arch.unwrap(format)?;
                return Ok(Some(self.range));
            }
            EditCommand::SetAttribute { node_id, name, value } => {
                self.arch.set_attribute(node_id, &name, &value)?;
            }
            EditCommand::RemoveAttribute { node_id, name } => {
                self.arch.remove_attribute(node_id, &name)?;
            }
            EditCommand::SetStyle { node_id, property, value } => {
                self.arch.set_style(node_id, &property, &value)?;
            }
            EditCommand::AddClass { node_id, class_name } => {
                self.arch.add_class(node_id, &class_name)?;
            }
            EditCommand::RemoveClass { node_id, class_name } => {
                self.arch.remove_class(node_id, &class_name)?;
            }
        }
        Ok(None)
    }

    /// Split the selected part of one text node out and wrap it
    fn wrap_selection(&mut self, tag: &str) -> EditorResult<Range> {
        let Range { sc, so, ec, eo } = self.range;
        if sc != ec {
            return Err(EditorError::UnsupportedSelection("selection spans several nodes"));
        }
        if so == eo {
            return Err(EditorError::UnsupportedSelection("selection is collapsed"));
        }
        let node = self.arch.get_node(sc)?;
        if !node.is_visible_text() {
            return Err(EditorError::NotText(sc));
        }
        let length = node.length();
        let (start, end) = (so.min(eo), so.max(eo).min(length));

        // Refuse before the splits touch the tree
        let wrapper = self.arch.create_tag(tag);
        self.arch.check_container(wrapper)?;

        if end < length {
            self.arch.split(sc, end)?;
        }
        let middle = if start > 0 { self.arch.split(sc, start)? } else { sc };
        self.arch.wrap_in(middle, wrapper)?;
        Ok(Range {
            sc: middle,
            so: 0,
            ec: middle,
            eo: self.arch.length(middle),
        })
    }

    /// Caret from the last change; else the previous range if it survived;
    /// else the end of the document
    fn resolve_range(&self) -> Range {
        if let Some((node, offset)) = self.arch.last_change() {
            if self.arch.is_attached(node) {
                return Range::leaf_caret(&self.arch, node, offset.min(self.arch.length(node)));
            }
        }
        self.surviving_range()
    }

    /// The current range clamped to its containers, or the end of the
    /// document once a container is gone
    fn surviving_range(&self) -> Range {
        if !self.range.is_attached(&self.arch) {
            return end_of_document(&self.arch);
        }
        let Range { sc, so, ec, eo } = self.range;
        Range {
            sc,
            so: so.min(self.arch.length(sc)),
            ec,
            eo: eo.min(self.arch.length(ec)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.arch.root()
    }
}

fn end_of_document(arch: &Arch) -> Range {
    let root = arch.root();
    Range::caret(root, arch.children(root).len())
}
