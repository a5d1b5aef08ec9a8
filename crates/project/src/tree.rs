use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::file_map::{format_kib, FileMap};

/// A node of the derived folder/file view.
/// 衍生出的資料夾／檔案樹節點。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileTreeNode {
    File {
        /// Content length in bytes.
        size: usize,
        /// Full original path inside the project.
        path: String,
    },
    Folder {
        children: BTreeMap<String, FileTreeNode>,
    },
}

impl FileTreeNode {
    fn empty_folder() -> Self {
        FileTreeNode::Folder {
            children: BTreeMap::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, FileTreeNode::Folder { .. })
    }

    /// Children in display order: folders before files, then by name.
    /// 依顯示順序列出子節點：資料夾在前，其次依名稱排序。
    pub fn sorted_children(&self) -> Vec<(&str, &FileTreeNode)> {
        let FileTreeNode::Folder { children } = self else {
            return Vec::new();
        };
        let (mut folders, files): (Vec<_>, Vec<_>) = children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
            .partition(|(_, node)| node.is_folder());
        folders.extend(files);
        folders
    }

    /// Looks up a node by slash-separated path relative to this folder.
    /// 以斜線分隔的相對路徑尋找節點。
    pub fn find(&self, path: &str) -> Option<&FileTreeNode> {
        let mut current = self;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            match current {
                FileTreeNode::Folder { children } => current = children.get(segment)?,
                FileTreeNode::File { .. } => return None,
            }
        }
        Some(current)
    }

    /// Renders the subtree as indented display lines.
    /// 將子樹輸出為縮排的顯示文字。
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        render_recursive(self, 0, &mut lines);
        lines
    }
}

fn render_recursive(node: &FileTreeNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (name, child) in node.sorted_children() {
        match child {
            FileTreeNode::Folder { .. } => {
                lines.push(format!("{indent}{name}/"));
                render_recursive(child, depth + 1, lines);
            }
            FileTreeNode::File { size, .. } => {
                lines.push(format!("{indent}{name}  {} KB", format_kib(*size, 2)));
            }
        }
    }
}

/// Builds the hierarchical view of a [`FileMap`].
/// 由 [`FileMap`] 建立階層式檔案樹。
pub struct FileTreeBuilder;

impl FileTreeBuilder {
    /// Returns the root folder. When a name is used both as a file and as a
    /// folder, the folder is kept.
    /// 回傳根資料夾；同名檔案與資料夾衝突時保留資料夾。
    pub fn build(files: &FileMap) -> FileTreeNode {
        let mut root = BTreeMap::new();
        for (path, content) in files.iter() {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            insert_file(&mut root, &segments, path, content.len());
        }
        FileTreeNode::Folder { children: root }
    }
}

fn insert_file(
    children: &mut BTreeMap<String, FileTreeNode>,
    segments: &[&str],
    path: &str,
    size: usize,
) {
    match segments {
        [] => {}
        [leaf] => {
            if children.get(*leaf).is_some_and(FileTreeNode::is_folder) {
                debug!("file {path} shadowed by folder of the same name");
                return;
            }
            children.insert(
                (*leaf).to_string(),
                FileTreeNode::File {
                    size,
                    path: path.to_string(),
                },
            );
        }
        [folder, rest @ ..] => {
            let entry = children
                .entry((*folder).to_string())
                .or_insert_with(FileTreeNode::empty_folder);
            if !entry.is_folder() {
                debug!("folder {folder} replaces a file of the same name");
                *entry = FileTreeNode::empty_folder();
            }
            if let FileTreeNode::Folder { children } = entry {
                insert_file(children, rest, path, size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(node: &FileTreeNode) -> Vec<&str> {
        node.sorted_children()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    #[test]
    fn folders_sort_before_files_then_by_name() {
        let files: FileMap = [
            ("zeta.txt", "z"),
            ("src/main.rs", "fn main() {}"),
            ("alpha.txt", "a"),
            ("assets/logo.svg", "<svg/>"),
        ]
        .into_iter()
        .collect();

        let tree = FileTreeBuilder::build(&files);
        assert_eq!(names(&tree), vec!["assets", "src", "alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn nested_paths_merge_into_shared_folders() {
        let files: FileMap = [
            ("src/a/one.js", "1"),
            ("src/b.js", "22"),
            ("src/a/two.js", "333"),
        ]
        .into_iter()
        .collect();

        let tree = FileTreeBuilder::build(&files);
        let src = tree.find("src").unwrap();
        assert_eq!(names(src), vec!["a", "b.js"]);
        assert_eq!(
            tree.find("src/a/two.js"),
            Some(&FileTreeNode::File {
                size: 3,
                path: "src/a/two.js".into(),
            })
        );
    }

    #[test]
    fn empty_segments_are_dropped() {
        let files: FileMap = [("/docs//readme.md", "hi")].into_iter().collect();
        let tree = FileTreeBuilder::build(&files);
        assert_eq!(
            tree.find("docs/readme.md"),
            Some(&FileTreeNode::File {
                size: 2,
                path: "/docs//readme.md".into(),
            })
        );
    }

    #[test]
    fn folder_wins_name_conflict() {
        let files: FileMap = [("lib.d", "file"), ("lib.d/x.txt", "x")]
            .into_iter()
            .collect();
        let tree = FileTreeBuilder::build(&files);
        assert!(tree.find("lib.d").unwrap().is_folder());
        assert!(tree.find("lib.d/x.txt").is_some());
    }

    #[test]
    fn folder_wins_when_file_comes_after_folder() {
        let files: FileMap = [("lib.d/x.txt", "x"), ("lib.d", "file"), ("lib.d/y.txt", "y")]
            .into_iter()
            .collect();
        let tree = FileTreeBuilder::build(&files);
        let folder = tree.find("lib.d").unwrap();
        assert!(folder.is_folder());
        assert_eq!(names(folder), vec!["x.txt", "y.txt"]);
    }

    #[test]
    fn ordering_is_stable_across_insertion_orders() {
        let forward: FileMap = [("b/x.txt", ""), ("a.txt", ""), ("c/y.txt", "")]
            .into_iter()
            .collect();
        let reverse: FileMap = [("c/y.txt", ""), ("a.txt", ""), ("b/x.txt", "")]
            .into_iter()
            .collect();
        assert_eq!(
            FileTreeBuilder::build(&forward).render_lines(),
            FileTreeBuilder::build(&reverse).render_lines()
        );
    }

    #[test]
    fn render_lines_show_sizes_in_kib() {
        let files: FileMap = [("index.html", "x".repeat(2048)), ("css/site.css", String::new())]
            .into_iter()
            .collect();
        let lines = FileTreeBuilder::build(&files).render_lines();
        assert_eq!(lines, vec!["css/", "  site.css  0.00 KB", "index.html  2.00 KB"]);
    }
}
