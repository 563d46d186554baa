use crate::nav::Selection;
use crate::search::FilteredTree;
use crate::tree::{Descend, FolderId, FolderNode, LinkTree, Visitor, walk, walk_from};

pub const EMPTY_PLACEHOLDER: &str = "No folders to show.";

const MAX_HEADING_LEVEL: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// The whole tree as nested, indented sections.
    #[default]
    Document,
    /// Only the subtree under the active folder.
    SingleNode,
}

pub fn heading_level(depth: usize) -> u8 {
    depth.clamp(1, MAX_HEADING_LEVEL) as u8
}

/// Unknown accessibility is drawn like a failed check.
pub fn status_glyph(accessible: Option<bool>) -> &'static str {
    if accessible == Some(true) { "✅" } else { "❌" }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading {
        id: FolderId,
        title: String,
        level: u8,
        indent: f32,
    },
    Link {
        title: String,
        url: String,
        glyph: &'static str,
        accessible: Option<bool>,
        indent: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentView {
    pub blocks: Vec<ContentBlock>,
    pub placeholder: Option<String>,
}

impl ContentView {
    fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            placeholder: Some(EMPTY_PLACEHOLDER.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRenderer {
    mode: ContentMode,
    indent_px: f32,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new(ContentMode::Document, 24.0)
    }
}

struct Sections<'s> {
    indent_px: f32,
    origins: Option<&'s FilteredTree>,
    blocks: Vec<ContentBlock>,
}

impl<'a> Visitor<'a> for Sections<'_> {
    fn enter(&mut self, id: &FolderId, folder: &'a FolderNode, depth: usize) -> Descend {
        let indent = (depth.saturating_sub(1)) as f32 * self.indent_px;
        let id = self
            .origins
            .and_then(|filtered| filtered.origin(id))
            .unwrap_or(id)
            .clone();
        self.blocks.push(ContentBlock::Heading {
            id,
            title: folder.title.clone(),
            level: heading_level(depth),
            indent,
        });
        self.blocks
            .extend(folder.content.iter().map(|link| ContentBlock::Link {
                title: link.title.clone(),
                url: link.url.clone(),
                glyph: status_glyph(link.accessible),
                accessible: link.accessible,
                indent,
            }));
        Descend::Into
    }
}

impl ContentRenderer {
    pub fn new(mode: ContentMode, indent_px: f32) -> Self {
        Self { mode, indent_px }
    }

    pub fn render(&self, tree: &LinkTree, selection: &Selection) -> ContentView {
        match self.mode {
            ContentMode::Document => self.document(tree, None),
            ContentMode::SingleNode => self.single_node(tree, selection),
        }
    }

    /// Document mode draws the pruned tree; single-node mode ignores the
    /// filter and keeps showing the whole active subtree.
    pub fn render_filtered(
        &self,
        tree: &LinkTree,
        filtered: &FilteredTree,
        selection: &Selection,
    ) -> ContentView {
        match self.mode {
            ContentMode::Document => self.document(&filtered.tree, Some(filtered)),
            ContentMode::SingleNode => self.single_node(tree, selection),
        }
    }

    fn sections<'s>(&self, origins: Option<&'s FilteredTree>) -> Sections<'s> {
        Sections {
            indent_px: self.indent_px,
            origins,
            blocks: Vec::new(),
        }
    }

    fn document(&self, tree: &LinkTree, origins: Option<&FilteredTree>) -> ContentView {
        if tree.is_empty() {
            return ContentView::empty();
        }
        let mut sections = self.sections(origins);
        walk(tree.folders(), &mut sections);
        ContentView {
            blocks: sections.blocks,
            placeholder: None,
        }
    }

    fn single_node(&self, tree: &LinkTree, selection: &Selection) -> ContentView {
        let Some((id, folder)) = selection
            .active
            .as_ref()
            .and_then(|id| tree.folder(id).map(|folder| (id, folder)))
        else {
            return ContentView::empty();
        };
        let mut sections = self.sections(None);
        walk_from(folder, id, 1, &mut sections);
        ContentView {
            blocks: sections.blocks,
            placeholder: None,
        }
    }
}
