//! Project model primitives for PastePad: parsing, file tree, language detection and history.
//! PastePad 專案模型核心：解析、檔案樹、語言偵測與復原紀錄。

pub mod archive;
pub mod file_map;
pub mod language;
pub mod parser;
pub mod tree;
pub mod undo;

pub use archive::{
    archive_file_name, export_members, read_directory, read_text_file, serialize_members,
    write_directory, ArchiveMember, ExportError, ImportError,
};
pub use file_map::{format_kib, FileMap, FileMapStats};
pub use language::{ActiveSource, LanguageDetector, LanguageTag};
pub use parser::{header_path, parse, ParseError, ParserState, ProjectParser};
pub use tree::{FileTreeBuilder, FileTreeNode};
pub use undo::{UndoLog, UndoSnapshot, DEFAULT_UNDO_DEPTH};
