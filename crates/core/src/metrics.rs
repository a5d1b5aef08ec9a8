use std::fmt;

/// 編輯器統計資料。 / Statistics shown under the project editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorStats {
    pub line_count: usize,
    pub char_count: usize,
}

impl fmt::Display for EditorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lines • {} chars", self.line_count, self.char_count)
    }
}

/// 統計原始文字。 / Counts `\n`-separated lines and characters of the raw text.
///
/// An empty editor still reports one line.
pub fn collect_editor_stats(text: &str) -> EditorStats {
    let mut line_count = 1usize;
    let mut char_count = 0usize;
    for ch in text.chars() {
        char_count += 1;
        if ch == '\n' {
            line_count += 1;
        }
    }
    EditorStats {
        line_count,
        char_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_line() {
        let stats = collect_editor_stats("");
        assert_eq!(stats.line_count, 1);
        assert_eq!(stats.char_count, 0);
        assert_eq!(stats.to_string(), "1 lines • 0 chars");
    }

    #[test]
    fn trailing_newline_opens_a_new_line() {
        let stats = collect_editor_stats("a\nb\n");
        assert_eq!(stats.line_count, 3);
        assert_eq!(stats.char_count, 4);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let stats = collect_editor_stats("héllo");
        assert_eq!(stats.char_count, 5);
    }
}
