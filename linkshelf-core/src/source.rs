use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::builder::parse_tree;
use crate::error::{CoreError, CoreResult};
use crate::tree::LinkTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLocation::Url(url) => f.write_str(url),
            DataLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `http(s)` sources stay URLs; relative paths resolve against `base_dir`.
pub fn resolve_location(base_dir: Option<&Path>, source: &str) -> DataLocation {
    let source = source.trim();
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return DataLocation::Url(source.to_string());
    }
    let path = PathBuf::from(source);
    match base_dir {
        Some(base) if path.is_relative() => DataLocation::File(base.join(path)),
        _ => DataLocation::File(path),
    }
}

fn read_source(location: &DataLocation, timeout: Duration) -> CoreResult<String> {
    match location {
        DataLocation::File(path) => {
            fs::read_to_string(path).map_err(|err| CoreError::fetch(location.to_string(), err))
        }
        DataLocation::Url(url) => {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|err| CoreError::HttpClient(err.to_string()))?;
            client
                .get(url)
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .map_err(|err| CoreError::fetch(url.as_str(), err))
        }
    }
}

/// Reads the JSON document at `location` and builds the tree from it.
pub fn load_tree(location: &DataLocation, timeout: Duration) -> CoreResult<LinkTree> {
    let json = read_source(location, timeout)?;
    let tree = parse_tree(&json)?;
    info!(
        source = %location,
        folders = tree.folders().len(),
        links = tree.link_count(),
        "tree loaded"
    );
    Ok(tree)
}

/// Writes `tree` in the nested JSON shape, replacing `path` atomically.
pub fn save_tree(tree: &LinkTree, path: &Path) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(tree)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| CoreError::fetch(path.display().to_string(), err))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)
        .and_then(|()| fs::rename(&tmp_path, path))
        .map_err(|err| CoreError::fetch(path.display().to_string(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FolderNode, LinkNode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("linkshelf-source-{name}-{nanos}"))
    }

    #[test]
    fn urls_are_kept_and_paths_resolved() {
        let base = Path::new("/etc/linkshelf");
        assert_eq!(
            resolve_location(Some(base), " https://example.com/r.json "),
            DataLocation::Url("https://example.com/r.json".to_string())
        );
        assert_eq!(
            resolve_location(Some(base), "HTTP://example.com"),
            DataLocation::Url("HTTP://example.com".to_string())
        );
        assert_eq!(
            resolve_location(Some(base), "resources.json"),
            DataLocation::File(base.join("resources.json"))
        );
        assert_eq!(
            resolve_location(Some(base), "/srv/data.json"),
            DataLocation::File(PathBuf::from("/srv/data.json"))
        );
        assert_eq!(
            resolve_location(None, "resources.json"),
            DataLocation::File(PathBuf::from("resources.json"))
        );
    }

    #[test]
    fn loads_flat_headings_from_file() {
        let dir = temp_dir("flat");
        fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("resources.json");
        fs::write(
            &path,
            r#"[{"tag":"h1","title":"Dev","content":[{"title":"MDN","url":"https://mdn.io"}]},
                {"tag":"h2","title":"JS","content":[]}]"#,
        )
        .expect("write");

        let tree = load_tree(&DataLocation::File(path), Duration::from_secs(1)).expect("load");
        assert_eq!(tree.folders().len(), 1);
        assert_eq!(tree.folders()[0].children[0].title, "JS");
        assert_eq!(tree.link_count(), 1);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let location = DataLocation::File(temp_dir("missing").join("nope.json"));
        assert!(matches!(
            load_tree(&location, Duration::from_secs(1)),
            Err(CoreError::Fetch { .. })
        ));
    }

    #[test]
    fn saved_tree_loads_back_with_accessibility() {
        let dir = temp_dir("save");
        let path = dir.join("out.json");
        let tree = LinkTree::new(vec![FolderNode::new("Dev", 1).with_links(vec![LinkNode {
            title: "MDN".to_string(),
            url: "https://mdn.io".to_string(),
            accessible: Some(false),
        }])]);

        save_tree(&tree, &path).expect("save");
        let loaded = load_tree(&DataLocation::File(path), Duration::from_secs(1)).expect("load");
        assert_eq!(loaded, tree);

        let _ = fs::remove_dir_all(dir);
    }
}
