//! Folder/link tree model.
//!
//! Folders own their sub-folders and links exclusively, so the tree is
//! acyclic by construction. Folders are addressed by [`FolderId`], the index
//! path from the root list, which stays valid across re-renders and across
//! replacing the tree with an annotated copy of the same shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNode {
    pub title: String,
    pub url: String,
    /// `None` until the accessibility probe has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<bool>,
}

impl LinkNode {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            accessible: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub title: String,
    pub level: u32,
    #[serde(default)]
    pub children: Vec<FolderNode>,
    #[serde(default)]
    pub content: Vec<LinkNode>,
}

impl FolderNode {
    pub fn new(title: impl Into<String>, level: u32) -> Self {
        Self {
            title: title.into(),
            level,
            children: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FolderNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_links(mut self, content: Vec<LinkNode>) -> Self {
        self.content = content;
        self
    }
}

/// Index path of a folder: `[2, 0]` is the first child of the third root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(Vec<usize>);

impl FolderId {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn from_path(path: Vec<usize>) -> Self {
        Self(path)
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Root folders have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn path(&self) -> &[usize] {
        &self.0
    }

    /// Strict ancestors, outermost first.
    pub fn ancestors(&self) -> Vec<FolderId> {
        (1..self.0.len())
            .map(|len| Self(self.0[..len].to_vec()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Into,
    Skip,
}

/// Depth-first traversal callbacks.
///
/// `enter` runs before a folder's children; returning [`Descend::Skip`]
/// prunes the subtree. `leave` runs after the children of every folder that
/// was descended into.
pub trait Visitor<'a> {
    fn enter(&mut self, id: &FolderId, folder: &'a FolderNode, depth: usize) -> Descend;

    fn leave(&mut self, _id: &FolderId, _folder: &'a FolderNode, _depth: usize) {}
}

/// Walks `folders` as a root list; roots are visited at depth 1.
pub fn walk<'a, V: Visitor<'a>>(folders: &'a [FolderNode], visitor: &mut V) {
    for (index, folder) in folders.iter().enumerate() {
        walk_from(folder, &FolderId::root(index), 1, visitor);
    }
}

/// Walks the subtree rooted at `folder`, which is visited at `depth`.
pub fn walk_from<'a, V: Visitor<'a>>(
    folder: &'a FolderNode,
    id: &FolderId,
    depth: usize,
    visitor: &mut V,
) {
    if visitor.enter(id, folder, depth) == Descend::Skip {
        return;
    }
    for (index, child) in folder.children.iter().enumerate() {
        walk_from(child, &id.child(index), depth + 1, visitor);
    }
    visitor.leave(id, folder, depth);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkTree {
    folders: Vec<FolderNode>,
}

impl LinkTree {
    pub fn new(folders: Vec<FolderNode>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[FolderNode] {
        &self.folders
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn first_root(&self) -> Option<FolderId> {
        (!self.folders.is_empty()).then(|| FolderId::root(0))
    }

    pub fn folder(&self, id: &FolderId) -> Option<&FolderNode> {
        let (first, rest) = id.path().split_first()?;
        let mut node = self.folders.get(*first)?;
        for index in rest {
            node = node.children.get(*index)?;
        }
        Some(node)
    }

    pub fn link(&self, folder: &FolderId, index: usize) -> Option<&LinkNode> {
        self.folder(folder)?.content.get(index)
    }

    pub fn contains(&self, id: &FolderId) -> bool {
        self.folder(id).is_some()
    }

    pub fn link_count(&self) -> usize {
        struct Count(usize);
        impl<'a> Visitor<'a> for Count {
            fn enter(&mut self, _: &FolderId, folder: &'a FolderNode, _: usize) -> Descend {
                self.0 += folder.content.len();
                Descend::Into
            }
        }
        let mut count = Count(0);
        walk(&self.folders, &mut count);
        count.0
    }

    /// Visits every link mutably: a folder's own links first, then its
    /// children, depth first.
    pub fn for_each_link_mut<F: FnMut(&mut LinkNode)>(&mut self, mut f: F) {
        fn visit<F: FnMut(&mut LinkNode)>(folder: &mut FolderNode, f: &mut F) {
            for link in &mut folder.content {
                f(link);
            }
            for child in &mut folder.children {
                visit(child, f);
            }
        }
        for folder in &mut self.folders {
            visit(folder, &mut f);
        }
    }
}
