use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Preferred preview entry point.
/// 預覽時優先使用的入口檔案。
pub const INDEX_HTML: &str = "index.html";

/// Ordered mapping from project-relative path to raw file content.
/// 依標頭出現順序保存「路徑 → 內容」的對照表。
///
/// Insertion order follows the order in which file headers appeared in the
/// source text. Re-inserting an existing path replaces the content but keeps
/// the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap(IndexMap<String, String>);

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a file, returning the previous content when present.
    /// 新增或覆寫檔案；若原本存在則回傳舊內容。
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> Option<String> {
        self.0.insert(path.into(), content.into())
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates `(path, content)` pairs in insertion order.
    /// 依插入順序列舉 `(路徑, 內容)`。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the contents of every file whose path ends with `suffix`, in order.
    /// 依序取得路徑以 `suffix` 結尾的所有檔案內容。
    pub fn contents_with_suffix<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a str> {
        self.iter()
            .filter(move |(path, _)| path.ends_with(suffix))
            .map(|(_, content)| content)
    }

    /// Picks the HTML entry file: `index.html` first, otherwise the first `.html` path.
    /// 選出 HTML 入口檔：優先 `index.html`，否則取第一個 `.html` 檔。
    pub fn html_entry(&self) -> Option<&str> {
        if let Some((path, _)) = self.0.get_key_value(INDEX_HTML) {
            return Some(path.as_str());
        }
        self.paths().find(|path| path.ends_with(".html"))
    }

    /// Aggregated counts used by the stats bar.
    /// 統計列使用的檔案數與總大小。
    pub fn stats(&self) -> FileMapStats {
        FileMapStats {
            file_count: self.len(),
            total_bytes: self.0.values().map(String::len).sum(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FileMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for (path, content) in iter {
            map.insert(path, content);
        }
        map
    }
}

/// File count and total byte size of a [`FileMap`].
/// [`FileMap`] 的檔案數與位元組總量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileMapStats {
    pub file_count: usize,
    pub total_bytes: usize,
}

impl FileMapStats {
    /// Total size in KiB with one decimal, e.g. `1.5`.
    pub fn total_kib(&self) -> String {
        format_kib(self.total_bytes, 1)
    }
}

/// Formats a byte count as KiB with a fixed number of decimals.
/// 以固定小數位數將位元組轉為 KiB 字串。
pub fn format_kib(bytes: usize, decimals: usize) -> String {
    format!("{:.*}", decimals, bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_original_position() {
        let mut files = FileMap::new();
        files.insert("a.txt", "1");
        files.insert("b.txt", "2");
        let previous = files.insert("a.txt", "3");

        assert_eq!(previous.as_deref(), Some("1"));
        let collected: Vec<_> = files.iter().collect();
        assert_eq!(collected, vec![("a.txt", "3"), ("b.txt", "2")]);
    }

    #[test]
    fn html_entry_prefers_index() {
        let files: FileMap = [("about.html", ""), ("index.html", ""), ("x.css", "")]
            .into_iter()
            .collect();
        assert_eq!(files.html_entry(), Some("index.html"));

        let files: FileMap = [("x.css", ""), ("pages/about.html", ""), ("b.html", "")]
            .into_iter()
            .collect();
        assert_eq!(files.html_entry(), Some("pages/about.html"));

        let files: FileMap = [("main.py", "print(1)")].into_iter().collect();
        assert_eq!(files.html_entry(), None);
    }

    #[test]
    fn stats_count_bytes_not_chars() {
        let files: FileMap = [("a.txt", "héllo"), ("b.txt", "")].into_iter().collect();
        let stats = files.stats();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_bytes, 6);
        assert_eq!(format_kib(1536, 1), "1.5");
        assert_eq!(format_kib(10, 2), "0.01");
    }
}
