//! Live-preview composition for HTML/CSS/JS projects.
//! HTML/CSS/JS 專案的即時預覽組合器。
//!
//! The entry HTML file is taken as the document base. External stylesheet
//! links and external scripts are stripped, then every `.css` file is inlined
//! into a `<style>` block before `</head>` and every `.js` file into a
//! `<script>` block before `</body>`. Composition always starts from the stored
//! entry content, so recomposing an unchanged project yields the same bytes.

use std::borrow::Cow;

use log::debug;
use once_cell::sync::Lazy;
use pastepad_project::FileMap;
use regex::Regex;

static STYLESHEET_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link\b[^>]*\srel\s*=\s*(?:"stylesheet"|'stylesheet'|stylesheet\b)[^>]*>"#)
        .expect("stylesheet link pattern must compile")
});

static EXTERNAL_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\ssrc\s*=\s*["'][^"']*["'][^>]*>.*?</script\s*>"#)
        .expect("external script pattern must compile")
});

const HEAD_CLOSE: &str = "</head>";
const BODY_CLOSE: &str = "</body>";

/// Composes the preview document for a project.
/// 為專案組合預覽文件。
pub struct PreviewComposer;

impl PreviewComposer {
    /// Path of the file used as the document base, if any.
    /// 作為文件基底的檔案路徑（若有）。
    pub fn entry(files: &FileMap) -> Option<&str> {
        files.html_entry()
    }

    /// Returns the composed document, or `None` when the project has no HTML file.
    /// 回傳組合後的文件；若專案沒有 HTML 檔則回傳 `None`。
    pub fn compose(files: &FileMap) -> Option<String> {
        let entry = Self::entry(files)?;
        let base = files.get(entry)?;

        let mut document = strip_external_assets(base).into_owned();

        let styles = join_with_suffix(files, ".css");
        if !styles.is_empty() {
            let block = format!("<style>{styles}</style>");
            document = insert_before_or(document, HEAD_CLOSE, &block, Placement::Prepend);
        }

        let scripts = join_with_suffix(files, ".js");
        if !scripts.is_empty() {
            let block = format!("<script>{scripts}</script>");
            document = insert_before_or(document, BODY_CLOSE, &block, Placement::Append);
        }

        debug!(
            "composed preview from {entry} ({} bytes)",
            document.len()
        );
        Some(document)
    }
}

/// Removes stylesheet `<link>` tags and external `<script src>` elements.
/// 移除樣式表 `<link>` 標籤與外部 `<script src>` 元素。
pub fn strip_external_assets(html: &str) -> Cow<'_, str> {
    match STYLESHEET_LINK.replace_all(html, "") {
        Cow::Borrowed(unchanged) => EXTERNAL_SCRIPT.replace_all(unchanged, ""),
        Cow::Owned(stripped) => Cow::Owned(EXTERNAL_SCRIPT.replace_all(&stripped, "").into_owned()),
    }
}

fn join_with_suffix(files: &FileMap, suffix: &str) -> String {
    files
        .contents_with_suffix(suffix)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Copy)]
enum Placement {
    Prepend,
    Append,
}

fn insert_before_or(mut document: String, marker: &str, block: &str, fallback: Placement) -> String {
    match find_ascii_case_insensitive(&document, marker) {
        Some(offset) => {
            document.insert_str(offset, block);
            document
        }
        None => match fallback {
            Placement::Prepend => format!("{block}{document}"),
            Placement::Append => {
                document.push_str(block);
                document
            }
        },
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets identical.
    haystack.to_ascii_lowercase().find(needle)
}
