use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file_map::FileMap;

/// Runnable-language classification of a project.
/// 專案可執行語言的分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Python,
    C,
    Cpp,
    Javascript,
    Web,
    None,
}

impl LanguageTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::C => "c",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Javascript => "javascript",
            LanguageTag::Web => "web",
            LanguageTag::None => "none",
        }
    }

    /// Whether the project can be dispatched for execution.
    /// 是否可送出執行。
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            LanguageTag::Python | LanguageTag::C | LanguageTag::Cpp | LanguageTag::Javascript
        )
    }

    /// C and C++ declare prompts with `// input("Label")` comments.
    pub fn uses_magic_marker(&self) -> bool {
        matches!(self, LanguageTag::C | LanguageTag::Cpp)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The source file scanned for interactive-input prompts.
/// 用於掃描互動輸入的來源檔案。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSource<'a> {
    pub path: &'a str,
    pub content: &'a str,
}

const RUNNABLE_ENTRIES: [(&str, LanguageTag); 3] = [
    ("main.py", LanguageTag::Python),
    ("main.c", LanguageTag::C),
    ("main.cpp", LanguageTag::Cpp),
];

/// Fixed-priority, filename-based language detection.
/// 以固定優先順序、依檔名判斷語言。
pub struct LanguageDetector;

impl LanguageDetector {
    /// `main.py`, then `main.c`, then `main.cpp`; a project with only an HTML
    /// entry is `web`; anything else is `none`.
    pub fn detect(files: &FileMap) -> LanguageTag {
        if let Some((_, tag)) = RUNNABLE_ENTRIES
            .iter()
            .find(|(path, _)| files.contains(path))
        {
            return *tag;
        }
        if files.html_entry().is_some() {
            LanguageTag::Web
        } else {
            LanguageTag::None
        }
    }

    /// Picks the file whose text feeds input synthesis, following the same
    /// priority as [`LanguageDetector::detect`].
    /// 依與 `detect` 相同的優先順序選出輸入合成所用的來源檔。
    pub fn active_source(files: &FileMap) -> Option<ActiveSource<'_>> {
        RUNNABLE_ENTRIES.iter().find_map(|(path, _)| {
            files.get(path).map(|content| ActiveSource {
                path: *path,
                content,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(paths: &[&str]) -> FileMap {
        paths.iter().map(|path| (*path, "x")).collect()
    }

    #[test]
    fn detection_follows_fixed_priority() {
        assert_eq!(
            LanguageDetector::detect(&project(&["main.cpp", "main.c", "main.py"])),
            LanguageTag::Python
        );
        assert_eq!(
            LanguageDetector::detect(&project(&["main.cpp", "main.c"])),
            LanguageTag::C
        );
        assert_eq!(
            LanguageDetector::detect(&project(&["main.cpp", "index.html"])),
            LanguageTag::Cpp
        );
    }

    #[test]
    fn html_only_project_is_web_and_others_none() {
        assert_eq!(
            LanguageDetector::detect(&project(&["index.html", "index.js"])),
            LanguageTag::Web
        );
        assert_eq!(
            LanguageDetector::detect(&project(&["notes.txt", "index.js"])),
            LanguageTag::None
        );
        assert_eq!(LanguageDetector::detect(&FileMap::new()), LanguageTag::None);
    }

    #[test]
    fn active_source_matches_detection_priority() {
        let files: FileMap = [("main.c", "int main;"), ("main.py", "print(1)")]
            .into_iter()
            .collect();
        let source = LanguageDetector::active_source(&files).unwrap();
        assert_eq!(source.path, "main.py");
        assert_eq!(source.content, "print(1)");
        assert!(LanguageDetector::active_source(&project(&["index.html"])).is_none());
    }
}
