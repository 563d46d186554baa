use std::collections::HashMap;

use regex::RegexBuilder;

use crate::query::{contains_normalized, normalize_query};
use crate::tree::{Descend, FolderId, FolderNode, LinkNode, LinkTree, Visitor, walk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Folder,
    Link,
}

/// Back-reference to the node a result came from. Resolved against the
/// current tree on use; never keeps a node alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Folder(FolderId),
    Link { folder: FolderId, index: usize },
}

impl NodeRef {
    /// The folder that is the result itself, or that owns the link.
    pub fn folder(&self) -> &FolderId {
        match self {
            NodeRef::Folder(id) => id,
            NodeRef::Link { folder, .. } => folder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub kind: ResultKind,
    pub title: String,
    pub url: Option<String>,
    pub target: NodeRef,
}

fn folder_matches(folder: &FolderNode, query: &str) -> bool {
    contains_normalized(&folder.title, query)
}

fn link_matches(link: &LinkNode, query: &str) -> bool {
    contains_normalized(&link.title, query) || contains_normalized(&link.url, query)
}

struct Collector<'q> {
    query: &'q str,
    results: Vec<SearchResult>,
}

impl<'a> Visitor<'a> for Collector<'_> {
    fn enter(&mut self, id: &FolderId, folder: &'a FolderNode, _depth: usize) -> Descend {
        if folder_matches(folder, self.query) {
            self.results.push(SearchResult {
                kind: ResultKind::Folder,
                title: folder.title.clone(),
                url: None,
                target: NodeRef::Folder(id.clone()),
            });
        }
        for (index, link) in folder.content.iter().enumerate() {
            if link_matches(link, self.query) {
                self.results.push(SearchResult {
                    kind: ResultKind::Link,
                    title: link.title.clone(),
                    url: Some(link.url.clone()),
                    target: NodeRef::Link {
                        folder: id.clone(),
                        index,
                    },
                });
            }
        }
        Descend::Into
    }
}

/// Pre-order search: a folder's own title match, then its matching links,
/// then the results of its child folders.
pub fn search(tree: &LinkTree, query: &str) -> Vec<SearchResult> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }
    let mut collector = Collector {
        query: &query,
        results: Vec::new(),
    };
    walk(tree.folders(), &mut collector);
    collector.results
}

/// A pruned tree plus the mapping from its folder ids back to the ids of
/// the same folders in the tree it was pruned from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredTree {
    pub tree: LinkTree,
    origins: HashMap<FolderId, FolderId>,
}

impl FilteredTree {
    pub fn origin(&self, pruned: &FolderId) -> Option<&FolderId> {
        self.origins.get(pruned)
    }
}

struct Kept {
    origin: FolderId,
    title: String,
    level: u32,
    content: Vec<LinkNode>,
    children: Vec<Kept>,
}

fn prune(folder: &FolderNode, origin: FolderId, query: &str) -> Option<Kept> {
    let children: Vec<Kept> = folder
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, child)| prune(child, origin.child(index), query))
        .collect();
    let content: Vec<LinkNode> = folder
        .content
        .iter()
        .filter(|link| link_matches(link, query))
        .cloned()
        .collect();

    if !folder_matches(folder, query) && children.is_empty() && content.is_empty() {
        return None;
    }

    Some(Kept {
        origin,
        title: folder.title.clone(),
        level: folder.level,
        content,
        children,
    })
}

fn assemble(kept: Kept, id: FolderId, origins: &mut HashMap<FolderId, FolderId>) -> FolderNode {
    let children = kept
        .children
        .into_iter()
        .enumerate()
        .map(|(index, child)| assemble(child, id.child(index), origins))
        .collect();
    origins.insert(id, kept.origin);
    FolderNode {
        title: kept.title,
        level: kept.level,
        children,
        content: kept.content,
    }
}

/// Keeps exactly the folders and links that match, plus every ancestor of
/// a match. An empty query keeps everything.
pub fn filter_with_origins(tree: &LinkTree, query: &str) -> FilteredTree {
    let query = normalize_query(query);
    let mut origins = HashMap::new();
    let folders = tree
        .folders()
        .iter()
        .enumerate()
        .filter_map(|(index, folder)| prune(folder, FolderId::root(index), &query))
        .enumerate()
        .map(|(index, kept)| assemble(kept, FolderId::root(index), &mut origins))
        .collect();
    FilteredTree {
        tree: LinkTree::new(folders),
        origins,
    }
}

pub fn filter_tree(tree: &LinkTree, query: &str) -> LinkTree {
    filter_with_origins(tree, query).tree
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub text: String,
    pub emphasized: bool,
}

/// Splits `text` into plain and emphasized spans around every
/// case-insensitive occurrence of `query`. The query is escaped first, so
/// characters like `(` or `*` match literally.
pub fn highlight(text: &str, query: &str) -> Vec<HighlightSpan> {
    let plain = |s: &str| HighlightSpan {
        text: s.to_string(),
        emphasized: false,
    };

    let query = query.trim();
    if query.is_empty() {
        return vec![plain(text)];
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return vec![plain(text)];
    };

    let mut spans = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            spans.push(plain(&text[last..found.start()]));
        }
        spans.push(HighlightSpan {
            text: found.as_str().to_string(),
            emphasized: true,
        });
        last = found.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(plain(&text[last..]));
    }
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Query, results and keyboard cursor behind the search dropdown.
///
/// The cursor lives in `[-1, len - 1]`; -1 means no result is selected.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    results: Vec<SearchResult>,
    index: isize,
    open: bool,
    /// Set by Escape; results stay empty until the query changes.
    dismissed: bool,
    max_results: usize,
}

impl SearchSession {
    /// `max_results == 0` keeps every result.
    pub fn new(max_results: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            index: -1,
            open: false,
            dismissed: false,
            max_results,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn current_index(&self) -> isize {
        self.index
    }

    pub fn current(&self) -> Option<&SearchResult> {
        usize::try_from(self.index)
            .ok()
            .and_then(|index| self.results.get(index))
    }

    pub fn set_query(&mut self, tree: &LinkTree, raw: &str) {
        self.query = raw.to_string();
        self.index = -1;
        self.dismissed = false;
        self.run(tree);
        self.open = !normalize_query(&self.query).is_empty();
    }

    /// Re-runs the current query, e.g. after the tree was replaced. The
    /// dropdown stays open or closed as it was, and dismissed results stay
    /// cleared.
    pub fn refresh(&mut self, tree: &LinkTree) {
        if self.dismissed {
            return;
        }
        let keep = self.index;
        self.run(tree);
        self.index = keep.min(self.results.len() as isize - 1);
    }

    fn run(&mut self, tree: &LinkTree) {
        if normalize_query(&self.query).is_empty() {
            self.results.clear();
            return;
        }
        self.results = search(tree, &self.query);
        if self.max_results > 0 {
            self.results.truncate(self.max_results);
        }
    }

    pub fn move_by(&mut self, delta: isize) {
        let last = self.results.len() as isize - 1;
        self.index = (self.index + delta).clamp(-1, last.max(-1));
    }

    /// Applies a navigation key. Returns the result to act on for Enter.
    pub fn handle_key(&mut self, key: SearchKey) -> Option<SearchResult> {
        if self.results.is_empty() && key != SearchKey::Escape {
            return None;
        }
        match key {
            SearchKey::ArrowDown => {
                self.move_by(1);
                None
            }
            SearchKey::ArrowUp => {
                self.move_by(-1);
                None
            }
            SearchKey::Enter => {
                let picked = self.current().cloned();
                if picked.is_some() {
                    self.close();
                }
                picked
            }
            SearchKey::Escape => {
                self.clear();
                None
            }
        }
    }

    /// A click on the result at `index`.
    pub fn pick(&mut self, index: usize) -> Option<SearchResult> {
        let picked = self.results.get(index).cloned();
        if picked.is_some() {
            self.close();
        }
        picked
    }

    /// Hides the dropdown and drops the cursor; results stay for reopening.
    pub fn close(&mut self) {
        self.open = false;
        self.index = -1;
    }

    pub fn reopen(&mut self) {
        if !self.results.is_empty() {
            self.open = true;
        }
    }

    /// Clears results and cursor; the typed query is left alone.
    pub fn clear(&mut self) {
        self.results.clear();
        self.dismissed = true;
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FolderNode, LinkNode};

    fn link(title: &str, url: &str, accessible: Option<bool>) -> LinkNode {
        LinkNode {
            title: title.to_string(),
            url: url.to_string(),
            accessible,
        }
    }

    fn dev_tree() -> LinkTree {
        LinkTree::new(vec![
            FolderNode::new("Dev", 1)
                .with_links(vec![link("MDN", "https://mdn.io", Some(true))])
                .with_children(vec![
                    FolderNode::new("JS", 2)
                        .with_links(vec![link("Broken", "https://x", Some(false))]),
                ]),
        ])
    }

    fn titles(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn search_js_finds_only_the_folder() {
        let results = search(&dev_tree(), "js");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ResultKind::Folder);
        assert_eq!(results[0].title, "JS");
        assert_eq!(results[0].target, NodeRef::Folder(FolderId::root(0).child(0)));
    }

    #[test]
    fn search_mdn_finds_one_link_under_dev() {
        let results = search(&dev_tree(), "mdn");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ResultKind::Link);
        assert_eq!(results[0].url.as_deref(), Some("https://mdn.io"));
        assert_eq!(results[0].target.folder(), &FolderId::root(0));
    }

    #[test]
    fn search_orders_folder_then_own_links_then_children() {
        let tree = LinkTree::new(vec![
            FolderNode::new("Rust F", 1)
                .with_links(vec![link("Rust L", "https://l", None)])
                .with_children(vec![
                    FolderNode::new("G", 2).with_links(vec![link("rust G1", "https://g1", None)]),
                ]),
        ]);
        let results = search(&tree, "rust");
        assert_eq!(titles(&results), vec!["Rust F", "Rust L", "rust G1"]);
    }

    #[test]
    fn search_matches_urls_and_ignores_case() {
        let results = search(&dev_tree(), "  MDN.IO ");
        assert_eq!(titles(&results), vec!["MDN"]);
    }

    #[test]
    fn empty_query_has_no_results() {
        assert!(search(&dev_tree(), "   ").is_empty());
    }

    #[test]
    fn filter_keeps_ancestors_of_matches_and_drops_the_rest() {
        let tree = LinkTree::new(vec![
            FolderNode::new("Dev", 1)
                .with_links(vec![link("MDN", "https://mdn.io", Some(true))])
                .with_children(vec![
                    FolderNode::new("JS", 2).with_links(vec![
                        link("Broken", "https://x", Some(false)),
                        link("Other", "https://o", None),
                    ]),
                    FolderNode::new("Python", 2),
                ]),
            FolderNode::new("News", 1),
        ]);
        let pruned = filter_tree(&tree, "broken");
        assert_eq!(pruned.folders().len(), 1);
        let dev = &pruned.folders()[0];
        assert_eq!(dev.title, "Dev");
        assert!(dev.content.is_empty());
        assert_eq!(dev.children.len(), 1);
        assert_eq!(dev.children[0].title, "JS");
        assert_eq!(dev.children[0].content, vec![link("Broken", "https://x", Some(false))]);
    }

    #[test]
    fn filter_drops_non_matching_contents_of_matching_folder() {
        let pruned = filter_tree(&dev_tree(), "dev");
        let dev = &pruned.folders()[0];
        assert_eq!(dev.title, "Dev");
        assert!(dev.content.is_empty());
        assert!(dev.children.is_empty());
    }

    #[test]
    fn filter_with_empty_query_keeps_everything() {
        assert_eq!(filter_tree(&dev_tree(), ""), dev_tree());
    }

    #[test]
    fn filter_maps_pruned_ids_back_to_source() {
        let tree = LinkTree::new(vec![
            FolderNode::new("A", 1),
            FolderNode::new("B", 1)
                .with_children(vec![FolderNode::new("x", 2), FolderNode::new("needle", 2)]),
        ]);
        let filtered = filter_with_origins(&tree, "needle");
        let pruned_child = FolderId::root(0).child(0);
        assert_eq!(
            filtered.tree.folder(&pruned_child).map(|f| f.title.as_str()),
            Some("needle")
        );
        assert_eq!(
            filtered.origin(&pruned_child),
            Some(&FolderId::root(1).child(1))
        );
        assert_eq!(filtered.origin(&FolderId::root(0)), Some(&FolderId::root(1)));
    }

    /// Every kept folder matches or has a kept descendant, and every
    /// matching node of the source survives.
    fn check_retention_law(tree: &LinkTree, query: &str) {
        fn has_content(folder: &FolderNode) -> bool {
            !folder.content.is_empty() || !folder.children.is_empty()
        }
        fn check(folder: &FolderNode, query: &str) {
            assert!(
                folder_matches(folder, query) || has_content(folder),
                "folder `{}` kept without reason for `{query}`",
                folder.title
            );
            for link in &folder.content {
                assert!(link_matches(link, query));
            }
            for child in &folder.children {
                check(child, query);
            }
        }

        let q = normalize_query(query);
        let pruned = filter_tree(tree, query);
        for folder in pruned.folders() {
            check(folder, &q);
        }

        let expected: Vec<SearchResult> = search(tree, query);
        let kept = search(&pruned, query);
        assert_eq!(
            expected.iter().map(|r| (&r.kind, &r.title)).collect::<Vec<_>>(),
            kept.iter().map(|r| (&r.kind, &r.title)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn filter_retention_law_holds_for_several_queries() {
        let tree = LinkTree::new(vec![
            FolderNode::new("Languages", 1).with_children(vec![
                FolderNode::new("Rust", 2)
                    .with_links(vec![link("The Book", "https://doc.rust-lang.org/book", None)])
                    .with_children(vec![FolderNode::new("Async", 3).with_links(vec![link(
                        "Tokio",
                        "https://tokio.rs",
                        Some(true),
                    )])]),
                FolderNode::new("Go", 2).with_links(vec![link("Tour", "https://go.dev/tour", None)]),
            ]),
            FolderNode::new("Tools", 1).with_links(vec![link("ripgrep", "https://rg", None)]),
        ]);
        for query in ["rust", "tokio", "o", "tour", "zzz", "LANG", "https://"] {
            check_retention_law(&tree, query);
        }
    }

    #[test]
    fn highlight_wraps_every_match_case_insensitively() {
        let spans = highlight("JavaScript and javascript", "script");
        let emphasized: Vec<&str> = spans
            .iter()
            .filter(|s| s.emphasized)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(emphasized, vec!["Script", "script"]);
        let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "JavaScript and javascript");
    }

    #[test]
    fn highlight_treats_metacharacters_literally() {
        let spans = highlight("C++ (draft) *notes*", "(draft");
        assert_eq!(
            spans,
            vec![
                HighlightSpan {
                    text: "C++ ".to_string(),
                    emphasized: false
                },
                HighlightSpan {
                    text: "(draft".to_string(),
                    emphasized: true
                },
                HighlightSpan {
                    text: ") *notes*".to_string(),
                    emphasized: false
                },
            ]
        );
        assert!(highlight("a*b", "*").iter().any(|s| s.emphasized && s.text == "*"));
    }

    #[test]
    fn highlight_without_match_is_one_plain_span() {
        assert_eq!(
            highlight("Docs", "zzz"),
            vec![HighlightSpan {
                text: "Docs".to_string(),
                emphasized: false
            }]
        );
        assert_eq!(highlight("", "a").len(), 1);
    }

    #[test]
    fn cursor_is_clamped_between_none_and_last() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "https");
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.current_index(), -1);

        session.handle_key(SearchKey::ArrowUp);
        assert_eq!(session.current_index(), -1);
        session.handle_key(SearchKey::ArrowDown);
        session.handle_key(SearchKey::ArrowDown);
        session.handle_key(SearchKey::ArrowDown);
        assert_eq!(session.current_index(), 1);
        session.handle_key(SearchKey::ArrowUp);
        session.handle_key(SearchKey::ArrowUp);
        assert_eq!(session.current_index(), -1);
    }

    #[test]
    fn enter_acts_only_on_an_active_index() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "mdn");
        assert!(session.handle_key(SearchKey::Enter).is_none());
        assert!(session.is_open());

        session.handle_key(SearchKey::ArrowDown);
        let picked = session.handle_key(SearchKey::Enter).expect("picked");
        assert_eq!(picked.title, "MDN");
        assert!(!session.is_open());
        assert_eq!(session.current_index(), -1);
    }

    #[test]
    fn escape_clears_results_and_cursor() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "s");
        session.handle_key(SearchKey::ArrowDown);
        session.handle_key(SearchKey::Escape);
        assert!(session.results().is_empty());
        assert_eq!(session.current_index(), -1);
        assert!(!session.is_open());
    }

    #[test]
    fn refresh_leaves_dismissed_results_cleared() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "js");
        session.handle_key(SearchKey::Escape);
        session.refresh(&dev_tree());
        assert!(session.is_dismissed());
        assert!(session.results().is_empty());
        assert!(!session.is_open());

        session.set_query(&dev_tree(), "js");
        assert!(!session.is_dismissed());
        assert!(session.is_open());
    }

    #[test]
    fn refresh_keeps_a_closed_dropdown_closed() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "js");
        session.close();
        session.refresh(&dev_tree());
        assert!(!session.is_open());
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn new_query_resets_cursor_and_respects_max_results() {
        let mut session = SearchSession::new(1);
        session.set_query(&dev_tree(), "s");
        assert_eq!(session.results().len(), 1);
        session.handle_key(SearchKey::ArrowDown);
        session.set_query(&dev_tree(), "js");
        assert_eq!(session.current_index(), -1);
    }

    #[test]
    fn blank_query_closes_the_dropdown() {
        let mut session = SearchSession::new(0);
        session.set_query(&dev_tree(), "dev");
        assert!(session.is_open());
        session.set_query(&dev_tree(), "  ");
        assert!(!session.is_open());
        assert!(session.results().is_empty());
    }
}
