//! Application controller: one tree, one selection, and the renderers and
//! search session built from configuration. The UI feeds it clicks and keys
//! and paints the views it returns.

use tracing::debug;

use crate::config::Config;
use crate::content::{ContentMode, ContentRenderer, ContentView};
use crate::nav::{NavPolicy, NavView, NavigationRenderer, Selection};
use crate::query::normalize_query;
use crate::search::{
    FilteredTree, NodeRef, SearchKey, SearchResult, SearchSession, filter_with_origins,
};
use crate::tree::{FolderId, LinkTree};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrowserOptions {
    pub nav: NavPolicy,
    pub content_mode: ContentMode,
    pub indent_px: f32,
    pub filter_tree: bool,
    pub max_results: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for BrowserOptions {
    fn from(config: &Config) -> Self {
        Self {
            nav: NavPolicy::from(&config.navigation),
            content_mode: config.content.mode.into(),
            indent_px: config.content.indent_px as f32,
            filter_tree: config.search.filter_tree,
            max_results: config.search.max_results,
        }
    }
}

/// Side effects the UI has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Scroll the folder's navigation row into view.
    RevealFolder(FolderId),
    /// Open in the system browser.
    OpenUrl(String),
}

pub struct Browser {
    tree: LinkTree,
    selection: Selection,
    nav: NavigationRenderer,
    content: ContentRenderer,
    search: SearchSession,
    filter_tree: bool,
    filtered: Option<FilteredTree>,
}

impl Browser {
    pub fn new(tree: LinkTree, options: BrowserOptions) -> Self {
        Self {
            selection: Selection::for_tree(&tree),
            tree,
            nav: NavigationRenderer::new(options.nav),
            content: ContentRenderer::new(options.content_mode, options.indent_px),
            search: SearchSession::new(options.max_results),
            filter_tree: options.filter_tree,
            filtered: None,
        }
    }

    pub fn tree(&self) -> &LinkTree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn is_filtering(&self) -> bool {
        self.filtered.is_some()
    }

    /// Swaps in a new tree of possibly different shape, e.g. the annotated
    /// copy from a probe pass. Selection and search are carried over where
    /// their ids still resolve.
    pub fn replace_tree(&mut self, tree: LinkTree) {
        self.tree = tree;
        self.selection.reconcile(&self.tree);
        self.search.refresh(&self.tree);
        self.refilter();
    }

    pub fn nav_view(&self) -> NavView {
        match &self.filtered {
            Some(filtered) => self.nav.render_filtered(filtered, &self.selection),
            None => self.nav.render(&self.tree, &self.selection),
        }
    }

    pub fn content_view(&self) -> ContentView {
        match &self.filtered {
            Some(filtered) => self
                .content
                .render_filtered(&self.tree, filtered, &self.selection),
            None => self.content.render(&self.tree, &self.selection),
        }
    }

    pub fn click_header(&mut self, id: &FolderId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.nav.click_header(&mut self.selection, id)
    }

    pub fn set_query(&mut self, raw: &str) {
        self.search.set_query(&self.tree, raw);
        self.refilter();
    }

    /// The filter follows the results: Escape drops it along with them.
    fn refilter(&mut self) {
        let query = normalize_query(self.search.query());
        self.filtered = (self.filter_tree && !query.is_empty() && !self.search.is_dismissed())
            .then(|| filter_with_origins(&self.tree, &query));
    }

    pub fn handle_key(&mut self, key: SearchKey) -> Option<Action> {
        let picked = self.search.handle_key(key);
        if key == SearchKey::Escape {
            self.refilter();
        }
        self.activate(picked?)
    }

    pub fn click_result(&mut self, index: usize) -> Option<Action> {
        let picked = self.search.pick(index)?;
        self.activate(picked)
    }

    /// A click that landed on neither the search input nor the dropdown.
    pub fn click_outside(&mut self) {
        self.search.close();
    }

    pub fn focus_search(&mut self) {
        self.search.reopen();
    }

    fn activate(&mut self, result: SearchResult) -> Option<Action> {
        match result.target {
            NodeRef::Folder(id) => {
                if !self.tree.contains(&id) {
                    debug!(title = %result.title, "search result no longer in tree");
                    return None;
                }
                self.selection.reveal(id.clone());
                Some(Action::RevealFolder(id))
            }
            NodeRef::Link { folder, index } => {
                let url = self.tree.link(&folder, index)?.url.clone();
                Some(Action::OpenUrl(url))
            }
        }
    }
}
