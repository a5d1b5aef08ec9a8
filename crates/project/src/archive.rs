//! Import/export helpers that move a project in and out of member sets.
//! 專案匯入／匯出：在檔案成員集合與專案文字之間轉換。
//!
//! Export turns every [`FileMap`] entry into one member keyed by its path.
//! Import goes the other way: each member is re-serialised as a synthetic
//! `//--- <path> ---` header followed by its content so the result can be fed
//! back through [`crate::parse`].

use std::collections::HashSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use log::debug;
use thiserror::Error;
use walkdir::WalkDir;

use crate::file_map::FileMap;
use crate::parser::header_path;

/// One file inside an exported or imported member set.
/// 匯出或匯入集合中的單一檔案成員。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub path: String,
    pub content: String,
}

impl ArchiveMember {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Errors raised while reading an import source.
/// 讀取匯入來源時的錯誤。
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{0} is not valid UTF-8 text")]
    NotText(PathBuf),
    #[error("{0} contains no files to import")]
    Empty(PathBuf),
    #[error("'{0}' cannot be written as a file header; names need an extension and no spaces")]
    UnrepresentablePath(String),
    #[error("{path} contains the header line '{line}'")]
    EmbeddedHeader { path: String, line: String },
}

/// Errors raised while writing an export.
/// 寫出匯出檔案時的錯誤。
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("path '{0}' escapes the export directory")]
    UnsafePath(String),
    #[error("'{0}' is both a file and a folder")]
    Conflict(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lists the members of an export in project order.
/// 依專案順序列出匯出成員。
pub fn export_members(files: &FileMap) -> Vec<ArchiveMember> {
    files
        .iter()
        .map(|(path, content)| ArchiveMember::new(path, content))
        .collect()
}

/// Archive download name: trimmed project name (or `fallback` when blank),
/// suffixed with `.zip` unless already present.
/// 壓縮檔名稱：去除空白的專案名稱（空白時使用 `fallback`），必要時補上 `.zip`。
pub fn archive_file_name(project_name: &str, fallback: &str) -> String {
    let trimmed = project_name.trim();
    let name = if trimmed.is_empty() {
        fallback.trim()
    } else {
        trimmed
    };
    if name.ends_with(".zip") {
        name.to_string()
    } else {
        format!("{name}.zip")
    }
}

/// Re-serialises members into project text with synthetic header lines.
/// 以合成標頭將成員重新序列化為專案文字。
///
/// Every member must survive a parse unchanged: its path has to be a valid
/// header token and its content must not contain header lines of its own.
pub fn serialize_members<'a, I>(members: I) -> Result<String, ImportError>
where
    I: IntoIterator<Item = &'a ArchiveMember>,
{
    let mut text = String::new();
    for member in members {
        let header = format!("//--- {} ---", member.path);
        if header_path(&header) != Some(member.path.as_str()) {
            return Err(ImportError::UnrepresentablePath(member.path.clone()));
        }
        if let Some(line) = member
            .content
            .split(|ch| ch == '\n' || ch == '\r')
            .find(|line| header_path(line).is_some())
        {
            return Err(ImportError::EmbeddedHeader {
                path: member.path.clone(),
                line: line.trim().to_string(),
            });
        }
        text.push_str(&header);
        text.push('\n');
        text.push_str(&member.content);
        text.push('\n');
    }
    Ok(text)
}

/// Reads a plain text or code file verbatim.
/// 原樣讀取純文字或程式碼檔案。
pub fn read_text_file(path: &Path) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|source| classify_read_error(path, source))
}

/// Collects every regular file under `root` as a member keyed by its
/// slash-separated relative path, sorted by path.
/// 將 `root` 底下所有檔案收集為成員，以斜線分隔的相對路徑為鍵並排序。
pub fn read_directory(root: &Path) -> Result<Vec<ArchiveMember>, ImportError> {
    let mut members = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ImportError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        let key = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        let content = read_text_file(entry.path())?;
        members.push(ArchiveMember::new(key, content));
    }
    if members.is_empty() {
        return Err(ImportError::Empty(root.to_path_buf()));
    }
    debug!("read {} member(s) from {}", members.len(), root.display());
    Ok(members)
}

/// Writes every file under `root`, creating folders as needed. Returns the
/// number of files written.
/// 將所有檔案寫入 `root`，必要時建立資料夾；回傳寫入的檔案數。
pub fn write_directory(files: &FileMap, root: &Path) -> Result<usize, ExportError> {
    let mut targets = Vec::with_capacity(files.len());
    for member in export_members(files) {
        let target = safe_join(root, &member.path)?;
        targets.push((target, member.content));
    }
    let file_targets: HashSet<&Path> = targets.iter().map(|(target, _)| target.as_path()).collect();
    for (target, _) in &targets {
        let clash = target
            .ancestors()
            .skip(1)
            .take_while(|ancestor| *ancestor != root)
            .find(|ancestor| file_targets.contains(ancestor));
        if let Some(folder) = clash {
            let relative = folder.strip_prefix(root).unwrap_or(folder);
            return Err(ExportError::Conflict(relative.display().to_string()));
        }
    }
    for (target, content) in &targets {
        write_member(target, content).map_err(|source| ExportError::Write {
            path: target.clone(),
            source,
        })?;
    }
    Ok(targets.len())
}

// `<name>.tmp` sibling, then rename over the target.
fn write_member(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staging = target.file_name().unwrap_or_default().to_os_string();
    staging.push(".tmp");
    let staging = target.with_file_name(staging);
    fs::write(&staging, content.as_bytes())?;
    fs::rename(&staging, target)
}

fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, ExportError> {
    let mut target = root.to_path_buf();
    let mut pushed = false;
    for segment in relative.split('/').filter(|segment| !segment.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => {
                target.push(part);
                pushed = true;
            }
            _ => return Err(ExportError::UnsafePath(relative.to_string())),
        }
    }
    if pushed {
        Ok(target)
    } else {
        Err(ExportError::UnsafePath(relative.to_string()))
    }
}

fn classify_read_error(path: &Path, source: io::Error) -> ImportError {
    if source.kind() == ErrorKind::InvalidData {
        ImportError::NotText(path.to_path_buf())
    } else {
        ImportError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
