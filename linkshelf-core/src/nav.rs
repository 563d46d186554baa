//! Navigation pane view model.
//!
//! The renderer walks the tree once per frame and produces a flat list of
//! rows the UI paints top to bottom. Rows carry [`FolderId`]s, never
//! references, so the view outlives nothing and two renders of the same
//! tree and selection compare equal.

use std::collections::BTreeSet;

use crate::search::FilteredTree;
use crate::tree::{Descend, FolderId, FolderNode, LinkTree, Visitor, walk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavModel {
    /// Header clicks flip that folder's own expanded flag.
    #[default]
    Toggle,
    /// Header clicks pick the one active folder; nothing collapses.
    SingleSelection,
}

/// Transient UI selection, created at startup and dropped on exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub active: Option<FolderId>,
    pub expanded: BTreeSet<FolderId>,
    pub highlighted: Option<FolderId>,
}

impl Selection {
    pub fn for_tree(tree: &LinkTree) -> Self {
        Self {
            active: tree.first_root(),
            ..Self::default()
        }
    }

    pub fn is_expanded(&self, id: &FolderId) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle(&mut self, id: &FolderId) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    pub fn select(&mut self, id: FolderId) {
        self.active = Some(id);
    }

    /// Makes `id` active and highlighted, expanding it and every ancestor
    /// so its row and contents are visible.
    pub fn reveal(&mut self, id: FolderId) {
        self.expanded.extend(id.ancestors());
        self.expanded.insert(id.clone());
        self.highlighted = Some(id.clone());
        self.active = Some(id);
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Drops ids that no longer resolve in `tree`. A lost active folder
    /// falls back to the first root.
    pub fn reconcile(&mut self, tree: &LinkTree) {
        self.expanded.retain(|id| tree.contains(id));
        if self.highlighted.as_ref().is_some_and(|id| !tree.contains(id)) {
            self.highlighted = None;
        }
        if !self.active.as_ref().is_some_and(|id| tree.contains(id)) {
            self.active = tree.first_root();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavPolicy {
    pub model: NavModel,
    /// Deepest collapsible level in the toggle model; 0 means no limit.
    pub collapsible_depth: usize,
    pub show_links: bool,
}

impl Default for NavPolicy {
    fn default() -> Self {
        Self {
            model: NavModel::Toggle,
            collapsible_depth: 2,
            show_links: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Open,
    Closed,
}

impl Indicator {
    pub fn glyph(self) -> &'static str {
        match self {
            Indicator::Open => "▾",
            Indicator::Closed => "▸",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRow {
    Folder {
        id: FolderId,
        title: String,
        depth: usize,
        /// `None` in the single-selection model.
        indicator: Option<Indicator>,
        interactive: bool,
        active: bool,
        highlighted: bool,
    },
    Link {
        folder: FolderId,
        title: String,
        url: String,
        depth: usize,
        accessible: Option<bool>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavView {
    pub rows: Vec<NavRow>,
}

impl NavView {
    pub fn folder_rows(&self) -> impl Iterator<Item = &NavRow> {
        self.rows
            .iter()
            .filter(|row| matches!(row, NavRow::Folder { .. }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationRenderer {
    policy: NavPolicy,
}

struct RowBuilder<'s> {
    policy: NavPolicy,
    selection: &'s Selection,
    /// Pruned-to-source id mapping when drawing a filtered tree.
    origins: Option<&'s FilteredTree>,
    rows: Vec<NavRow>,
}

impl RowBuilder<'_> {
    fn source_id(&self, id: &FolderId) -> FolderId {
        self.origins
            .and_then(|filtered| filtered.origin(id))
            .unwrap_or(id)
            .clone()
    }
}

impl<'a> Visitor<'a> for RowBuilder<'_> {
    fn enter(&mut self, id: &FolderId, folder: &'a FolderNode, depth: usize) -> Descend {
        let source = self.source_id(id);
        let (indicator, interactive, open) = match self.policy.model {
            NavModel::SingleSelection => (None, true, true),
            NavModel::Toggle => {
                let interactive =
                    self.origins.is_none() && is_collapsible(&self.policy, depth);
                let open = !interactive || self.selection.is_expanded(&source);
                let indicator = if open { Indicator::Open } else { Indicator::Closed };
                (Some(indicator), interactive, open)
            }
        };

        let active = self.policy.model == NavModel::SingleSelection
            && self.selection.active.as_ref() == Some(&source);
        self.rows.push(NavRow::Folder {
            active,
            highlighted: self.selection.highlighted.as_ref() == Some(&source),
            id: source,
            title: folder.title.clone(),
            depth,
            indicator,
            interactive,
        });

        if open { Descend::Into } else { Descend::Skip }
    }

    fn leave(&mut self, id: &FolderId, folder: &'a FolderNode, depth: usize) {
        if !self.policy.show_links {
            return;
        }
        let source = self.source_id(id);
        for link in &folder.content {
            self.rows.push(NavRow::Link {
                folder: source.clone(),
                title: link.title.clone(),
                url: link.url.clone(),
                depth: depth + 1,
                accessible: link.accessible,
            });
        }
    }
}

fn is_collapsible(policy: &NavPolicy, depth: usize) -> bool {
    policy.collapsible_depth == 0 || depth <= policy.collapsible_depth
}

impl NavigationRenderer {
    pub fn new(policy: NavPolicy) -> Self {
        Self { policy }
    }

    pub fn render(&self, tree: &LinkTree, selection: &Selection) -> NavView {
        self.render_rows(tree, selection, None)
    }

    /// Draws a pruned tree fully expanded. Row ids point into the tree the
    /// filter was computed from.
    pub fn render_filtered(&self, filtered: &FilteredTree, selection: &Selection) -> NavView {
        self.render_rows(&filtered.tree, selection, Some(filtered))
    }

    fn render_rows(
        &self,
        tree: &LinkTree,
        selection: &Selection,
        origins: Option<&FilteredTree>,
    ) -> NavView {
        let mut builder = RowBuilder {
            policy: self.policy,
            selection,
            origins,
            rows: Vec::new(),
        };
        walk(tree.folders(), &mut builder);
        NavView { rows: builder.rows }
    }

    pub fn is_interactive(&self, id: &FolderId) -> bool {
        match self.policy.model {
            NavModel::SingleSelection => true,
            NavModel::Toggle => is_collapsible(&self.policy, id.depth()),
        }
    }

    /// Applies a header click. In the toggle model only the clicked folder's
    /// expanded flag changes. Returns whether the selection changed.
    pub fn click_header(&self, selection: &mut Selection, id: &FolderId) -> bool {
        if !self.is_interactive(id) {
            return false;
        }
        match self.policy.model {
            NavModel::Toggle => selection.toggle(id),
            NavModel::SingleSelection => {
                if selection.active.as_ref() == Some(id) {
                    return false;
                }
                selection.select(id.clone());
                selection.clear_highlight();
            }
        }
        true
    }
}
