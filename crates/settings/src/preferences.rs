use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PREFERENCES_VERSION: u32 = 1;

/// Piston-compatible endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://emkc.org/api/v2/piston/execute";

const MAX_UNDO_DEPTH: usize = 100;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub execution: ExecutionPreferences,
    #[serde(default)]
    pub history: HistoryPreferences,
    #[serde(default)]
    pub export: ExportPreferences,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            execution: ExecutionPreferences::default(),
            history: HistoryPreferences::default(),
            export: ExportPreferences::default(),
        }
    }
}

impl Preferences {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.execution.sanitize();
        self.history.sanitize();
        self.export.sanitize();
    }
}

/// 遠端執行服務設定。 / Remote execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPreferences {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_language_version")]
    pub language_version: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_language_version() -> String {
    "*".to_string()
}

impl Default for ExecutionPreferences {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            language_version: default_language_version(),
        }
    }
}

impl ExecutionPreferences {
    fn sanitize(&mut self) {
        if self.endpoint.trim().is_empty() {
            self.endpoint = default_endpoint();
        }
        if self.language_version.trim().is_empty() {
            self.language_version = default_language_version();
        }
    }
}

/// 復原紀錄設定。 / Undo history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPreferences {
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
}

fn default_undo_depth() -> usize {
    10
}

impl Default for HistoryPreferences {
    fn default() -> Self {
        Self {
            undo_depth: default_undo_depth(),
        }
    }
}

impl HistoryPreferences {
    fn sanitize(&mut self) {
        if self.undo_depth == 0 {
            self.undo_depth = default_undo_depth();
        }
        self.undo_depth = self.undo_depth.clamp(1, MAX_UNDO_DEPTH);
    }
}

/// 匯出設定。 / Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPreferences {
    #[serde(default = "default_project_name")]
    pub default_project_name: String,
}

fn default_project_name() -> String {
    "project".to_string()
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            default_project_name: default_project_name(),
        }
    }
}

impl ExportPreferences {
    fn sanitize(&mut self) {
        if self.default_project_name.trim().is_empty() {
            self.default_project_name = default_project_name();
        }
    }
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    /// 載入設定；檔案不存在時使用預設值。 / Loads preferences, falling back to defaults when absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            read_document(&path)?
        } else {
            log::debug!("no preferences at {}; using defaults", path.display());
            let mut defaults = Preferences::default();
            defaults.sanitize();
            defaults
        };
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    /// 以暫存檔加 rename 寫入。 / Writes through a `.tmp` sibling and renames it into place.
    pub fn save(&self) -> Result<(), PreferencesError> {
        let staging = self.path.with_extension("tmp");
        write_document(&staging, &self.data)?;
        fs::rename(&staging, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn export_to(&self, target: impl AsRef<Path>) -> Result<(), PreferencesError> {
        write_document(target.as_ref(), &self.data)
    }

    /// 匯入偏好設定並備份既有檔案。 / Imports preferences, backing up the current file first.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let incoming = read_document(source.as_ref())?;
        if self.path.exists() {
            let backup = self.path.with_extension("bak");
            fs::copy(&self.path, &backup).map_err(|source| PreferencesError::Write {
                path: backup,
                source,
            })?;
        }
        self.data = incoming;
        self.save()
    }
}

fn read_document(path: &Path) -> Result<Preferences, PreferencesError> {
    let contents = fs::read_to_string(path).map_err(|source| PreferencesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut data: Preferences =
        serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    data.sanitize();
    Ok(data)
}

fn write_document(path: &Path, data: &Preferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_vec_pretty(data).map_err(|source| PreferencesError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, payload).map_err(|source| PreferencesError::Write {
        path: path.to_path_buf(),
        source,
    })
}
