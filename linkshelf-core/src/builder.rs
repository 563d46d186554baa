//! Builds the folder tree from either accepted input shape.
//!
//! The nested shape is passed through, with missing levels filled in from
//! nesting depth. The legacy heading-outline shape (a flat list of
//! `{tag: "h1".."h6", title, content}` records) is nested with a stack of
//! open ancestors, the way a document outline nests headings.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::tree::{FolderNode, LinkNode, LinkTree};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeadingRecord {
    pub tag: String,
    pub title: String,
    #[serde(default)]
    pub content: Vec<LinkNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NestedFolder {
    pub title: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub children: Vec<NestedFolder>,
    #[serde(default)]
    pub content: Vec<LinkNode>,
}

/// Either accepted JSON shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeInput {
    Flat(Vec<HeadingRecord>),
    Nested(Vec<NestedFolder>),
}

/// Detects the shape structurally: a non-empty array whose items all carry
/// `tag` and no `children` is a heading outline. Extra keys are ignored.
pub fn parse_tree(json: &str) -> CoreResult<LinkTree> {
    let items: Vec<Value> = serde_json::from_str(json)?;
    let flat = !items.is_empty() && items.iter().all(is_heading_record);
    let input = if flat {
        TreeInput::Flat(
            items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else {
        TreeInput::Nested(
            items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    build(input)
}

fn is_heading_record(item: &Value) -> bool {
    item.as_object()
        .is_some_and(|fields| fields.contains_key("tag") && !fields.contains_key("children"))
}

pub fn build(input: TreeInput) -> CoreResult<LinkTree> {
    let folders = match input {
        TreeInput::Flat(records) => build_flat(records)?,
        TreeInput::Nested(folders) => folders
            .into_iter()
            .map(|folder| build_nested(folder, None))
            .collect::<CoreResult<Vec<_>>>()?,
    };
    Ok(LinkTree::new(folders))
}

/// Parses `h<N>` (case-insensitive `h`) into a positive level.
pub fn parse_level(tag: &str) -> Option<u32> {
    let digits = tag.trim().strip_prefix(['h', 'H'])?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|level| *level > 0)
}

fn build_flat(records: Vec<HeadingRecord>) -> CoreResult<Vec<FolderNode>> {
    let mut roots = Vec::new();
    let mut open: Vec<FolderNode> = Vec::new();

    for record in records {
        let Some(level) = parse_level(&record.tag) else {
            return Err(CoreError::MalformedInput {
                tag: record.tag,
                title: record.title,
            });
        };

        while open.last().is_some_and(|top| top.level >= level) {
            close_top(&mut open, &mut roots);
        }

        open.push(FolderNode {
            title: record.title,
            level,
            children: Vec::new(),
            content: record.content,
        });
    }

    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }

    Ok(roots)
}

/// Pops the innermost open folder into its parent, or into the roots.
fn close_top(open: &mut Vec<FolderNode>, roots: &mut Vec<FolderNode>) {
    let Some(done) = open.pop() else {
        return;
    };
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}

fn build_nested(folder: NestedFolder, parent: Option<(&str, u32)>) -> CoreResult<FolderNode> {
    let level = match (folder.level, folder.tag.as_deref()) {
        (Some(0), _) => {
            return Err(CoreError::MalformedInput {
                tag: "level 0".to_string(),
                title: folder.title,
            });
        }
        (Some(level), _) => level,
        (None, Some(tag)) => parse_level(tag).ok_or_else(|| CoreError::MalformedInput {
            tag: tag.to_string(),
            title: folder.title.clone(),
        })?,
        (None, None) => parent.map_or(1, |(_, parent_level)| parent_level + 1),
    };

    if let Some((parent_title, parent_level)) = parent {
        if level <= parent_level {
            return Err(CoreError::LevelOrder {
                parent: parent_title.to_string(),
                parent_level,
                child: folder.title,
                child_level: level,
            });
        }
    }

    let children = folder
        .children
        .into_iter()
        .map(|child| build_nested(child, Some((folder.title.as_str(), level))))
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(FolderNode {
        title: folder.title,
        level,
        children,
        content: folder.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, title: &str) -> HeadingRecord {
        HeadingRecord {
            tag: tag.to_string(),
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    fn shape(folders: &[FolderNode]) -> String {
        folders
            .iter()
            .map(|f| {
                if f.children.is_empty() {
                    f.title.clone()
                } else {
                    format!("{}{{{}}}", f.title, shape(&f.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn flat_headings_nest_like_an_outline() {
        let input = TreeInput::Flat(vec![
            record("h1", "A"),
            record("h2", "B"),
            record("h3", "C"),
            record("h2", "D"),
            record("h1", "E"),
        ]);
        let tree = build(input).expect("build");
        assert_eq!(shape(tree.folders()), "A{B{C},D},E");
        assert!(tree.folders()[1].children.is_empty());
        assert_eq!(tree.folders()[0].children[0].children[0].level, 3);
    }

    #[test]
    fn skipped_levels_nest_under_nearest_shallower_folder() {
        let input = TreeInput::Flat(vec![
            record("h1", "A"),
            record("h3", "C"),
            record("h2", "B"),
        ]);
        let tree = build(input).expect("build");
        assert_eq!(shape(tree.folders()), "A{C,B}");
        assert_eq!(tree.folders()[0].children[0].level, 3);
    }

    #[test]
    fn leading_deep_heading_becomes_a_root() {
        let input = TreeInput::Flat(vec![record("h2", "B"), record("h1", "A")]);
        let tree = build(input).expect("build");
        assert_eq!(shape(tree.folders()), "B,A");
    }

    #[test]
    fn flat_records_keep_their_links() {
        let input = TreeInput::Flat(vec![HeadingRecord {
            tag: "h1".to_string(),
            title: "A".to_string(),
            content: vec![LinkNode::new("x", "https://x")],
        }]);
        let tree = build(input).expect("build");
        assert_eq!(tree.folders()[0].content.len(), 1);
    }

    #[test]
    fn malformed_tag_fails_the_build() {
        let input = TreeInput::Flat(vec![record("h1", "A"), record("hx", "Bad")]);
        match build(input) {
            Err(CoreError::MalformedInput { tag, title }) => {
                assert_eq!(tag, "hx");
                assert_eq!(title, "Bad");
            }
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn parse_level_rejects_non_numeric_and_zero() {
        assert_eq!(parse_level("h1"), Some(1));
        assert_eq!(parse_level("H6"), Some(6));
        assert_eq!(parse_level("h"), None);
        assert_eq!(parse_level("h0"), None);
        assert_eq!(parse_level("h-1"), None);
        assert_eq!(parse_level("div"), None);
    }

    #[test]
    fn nested_input_fills_levels_from_depth() {
        let json = r#"[{"title":"A","children":[{"title":"B","children":[{"title":"C"}]}]}]"#;
        let tree = parse_tree(json).expect("parse");
        let a = &tree.folders()[0];
        assert_eq!(a.level, 1);
        assert_eq!(a.children[0].level, 2);
        assert_eq!(a.children[0].children[0].level, 3);
    }

    #[test]
    fn nested_input_rejects_non_increasing_levels() {
        let json = r#"[{"title":"A","level":2,"children":[{"title":"B","level":2}]}]"#;
        assert!(matches!(
            parse_tree(json),
            Err(CoreError::LevelOrder { child_level: 2, .. })
        ));
    }

    #[test]
    fn json_shape_is_detected() {
        let flat = r#"[{"tag":"h1","title":"A","content":[]},{"tag":"h2","title":"B"}]"#;
        let tree = parse_tree(flat).expect("flat");
        assert_eq!(shape(tree.folders()), "A{B}");

        let nested = r#"[
            {"title":"Dev","level":1,
             "content":[{"title":"MDN","url":"https://mdn.io","accessible":true}],
             "children":[{"title":"JS","level":2,
                          "content":[{"title":"Broken","url":"https://x","accessible":false}],
                          "children":[]}]}
        ]"#;
        let tree = parse_tree(nested).expect("nested");
        assert_eq!(shape(tree.folders()), "Dev{JS}");
        assert_eq!(tree.folders()[0].content[0].accessible, Some(true));
        assert_eq!(tree.folders()[0].children[0].content[0].accessible, Some(false));
    }

    #[test]
    fn extra_keys_do_not_flatten_a_heading_outline() {
        let json = r#"[
            {"tag":"h1","title":"A","content":[],"note":"x"},
            {"tag":"h2","title":"B","content":[]}
        ]"#;
        let tree = parse_tree(json).expect("flat");
        assert_eq!(shape(tree.folders()), "A{B}");
        assert_eq!(tree.folders()[0].children[0].level, 2);
    }

    #[test]
    fn malformed_tag_with_extra_keys_still_fails() {
        let json = r#"[{"tag":"h1","title":"A","id":7},{"tag":"hx","title":"Bad"}]"#;
        assert!(matches!(
            parse_tree(json),
            Err(CoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn empty_array_is_an_empty_tree() {
        let tree = parse_tree("[]").expect("parse");
        assert!(tree.is_empty());
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(parse_tree("{not json"), Err(CoreError::Json(_))));
    }
}
