//! Line-oriented project text parser.
//! 逐行掃描的專案文字解析器。
//!
//! A project text is a sequence of header lines (`//--- path/to/file.ext ---`)
//! each followed by the body of that file. The scanner is an explicit
//! two-state machine: [`ParserState::AwaitingHeader`] until the first header,
//! then [`ParserState::InFileBody`] accumulating lines until the next header
//! or end of input flushes them.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::file_map::FileMap;

static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*//\s*-{3,}\s*(?P<path>\S*\.\S*?)\s*-{3,}\s*$")
        .expect("header pattern must compile")
});

/// Errors produced while parsing project text.
/// 解析專案文字時的錯誤。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no file headers found; expected lines such as `//--- index.html ---`")]
    Malformed,
}

/// Returns the file path named by a header line, or `None` for ordinary lines.
/// 若為標頭行則回傳其檔案路徑，否則回傳 `None`。
pub fn header_path(line: &str) -> Option<&str> {
    HEADER_PATTERN
        .captures(line)
        .and_then(|captures| captures.name("path"))
        .map(|path| path.as_str())
}

/// Scanner state between lines.
/// 逐行掃描時的狀態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState<'a> {
    /// No header seen yet; incoming lines are discarded.
    AwaitingHeader,
    /// Accumulating the body of `path`.
    InFileBody { path: &'a str, lines: Vec<&'a str> },
}

/// Incremental project parser fed one line at a time.
/// 逐行餵入的增量式專案解析器。
#[derive(Debug)]
pub struct ProjectParser<'a> {
    state: ParserState<'a>,
    files: FileMap,
    headers: usize,
}

impl<'a> Default for ProjectParser<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ProjectParser<'a> {
    pub fn new() -> Self {
        Self {
            state: ParserState::AwaitingHeader,
            files: FileMap::new(),
            headers: 0,
        }
    }

    pub fn state(&self) -> &ParserState<'a> {
        &self.state
    }

    /// Number of header lines seen so far.
    pub fn header_count(&self) -> usize {
        self.headers
    }

    /// Applies one line (without its terminator) to the state machine.
    /// 將單一行（不含換行字元）套用至狀態機。
    pub fn feed_line(&mut self, line: &'a str) {
        if let Some(path) = header_path(line) {
            self.headers += 1;
            self.flush();
            self.state = ParserState::InFileBody {
                path,
                lines: Vec::new(),
            };
            return;
        }
        if let ParserState::InFileBody { lines, .. } = &mut self.state {
            lines.push(line);
        }
    }

    /// Flushes the open file and returns the collected map.
    /// 寫入最後一個開啟中的檔案並回傳結果。
    pub fn finish(mut self) -> FileMap {
        self.flush();
        self.files
    }

    fn flush(&mut self) {
        let state = std::mem::replace(&mut self.state, ParserState::AwaitingHeader);
        if let ParserState::InFileBody { path, lines } = state {
            let content = lines.join("\n").trim().to_string();
            if self.files.insert(path, content).is_some() {
                debug!("duplicate header for {path}; later content wins");
            }
        }
    }
}

/// Parses raw editor text into a [`FileMap`].
/// 將編輯器原始文字解析為 [`FileMap`]。
///
/// Blank input yields an empty map. Non-blank input without a single header
/// fails with [`ParseError::Malformed`] and produces nothing.
pub fn parse(raw: &str) -> Result<FileMap, ParseError> {
    if raw.trim().is_empty() {
        return Ok(FileMap::new());
    }

    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut parser = ProjectParser::new();
    for line in normalized.split('\n') {
        parser.feed_line(line);
    }

    if parser.header_count() == 0 {
        return Err(ParseError::Malformed);
    }
    let files = parser.finish();
    debug!("parsed project with {} file(s)", files.len());
    Ok(files)
}
