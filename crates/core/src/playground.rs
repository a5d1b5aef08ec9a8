//! Top-level playground controller.
//! 遊樂場主控制器。
//!
//! [`Playground`] owns the raw project text, the parsed [`FileMap`] and every
//! view derived from it. All derived state is recomputed from one consistent
//! file map after each committed change, and every commit bumps a revision
//! counter that run results are checked against.

use std::path::Path;

use log::{debug, info, warn};
use pastepad_inputs::{synthesize, InputSchema};
use pastepad_preview::PreviewComposer;
use pastepad_project::{
    archive_file_name, parse, read_directory, read_text_file, serialize_members, write_directory,
    ArchiveMember, ExportError, FileMap, FileMapStats, FileTreeBuilder, FileTreeNode, ImportError,
    LanguageDetector, LanguageTag, ParseError, UndoLog, UndoSnapshot,
};
use pastepad_runexec::{
    render_transcript, ExecutionRequest, ExecutionResponse, RunError, TerminalLine, Transport,
};
use pastepad_settings::Preferences;
use thiserror::Error;

use crate::metrics::{collect_editor_stats, EditorStats};
use crate::samples::{Sample, SAMPLES};

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("inputs are missing for slot(s) {slots:?}")]
    MissingInputs { slots: Vec<usize> },
    #[error("input slot {0} does not exist")]
    UnknownSlot(usize),
    #[error("{0} projects cannot be run")]
    NotRunnable(LanguageTag),
}

/// 標準輸入來源。 / Where the stdin of a run comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StdinMode {
    /// Slot values joined with `\n`; every slot must be filled.
    #[default]
    Smart,
    /// A raw stdin string passed through untouched.
    Manual(String),
}

/// A run request stamped with the revision it was built from.
/// 附帶建立時版本號的執行請求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    revision: u64,
    request: ExecutionRequest,
}

impl RunTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// 送出請求。 / Sends the request once through `transport`.
    pub fn dispatch(self, transport: &dyn Transport) -> RunCompletion {
        let result = transport.execute(&self.request);
        RunCompletion {
            revision: self.revision,
            result,
        }
    }
}

/// The outcome of a dispatched ticket, waiting to be accepted.
#[derive(Debug)]
pub struct RunCompletion {
    pub revision: u64,
    pub result: Result<ExecutionResponse, RunError>,
}

#[derive(Debug)]
pub struct Playground {
    raw_text: String,
    files: FileMap,
    language: LanguageTag,
    inputs: InputSchema,
    input_values: Vec<String>,
    stdin_mode: StdinMode,
    revision: u64,
    undo: UndoLog,
    sample_index: usize,
    language_version: String,
    default_project_name: String,
}

impl Default for Playground {
    fn default() -> Self {
        Self::from_preferences(&Preferences::default())
    }
}

impl Playground {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依偏好設定建立。 / Creates an empty playground configured from `preferences`.
    pub fn from_preferences(preferences: &Preferences) -> Self {
        Self {
            raw_text: String::new(),
            files: FileMap::new(),
            language: LanguageTag::None,
            inputs: InputSchema::NotNeeded,
            input_values: Vec::new(),
            stdin_mode: StdinMode::default(),
            revision: 0,
            undo: UndoLog::new(preferences.history.undo_depth),
            sample_index: 0,
            language_version: preferences.execution.language_version.clone(),
            default_project_name: preferences.export.default_project_name.clone(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn inputs(&self) -> &InputSchema {
        &self.inputs
    }

    pub fn input_values(&self) -> &[String] {
        &self.input_values
    }

    pub fn set_stdin_mode(&mut self, mode: StdinMode) {
        self.stdin_mode = mode;
    }

    /// 每次提交狀態變更都會遞增。 / Bumped on every committed state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn file_tree(&self) -> FileTreeNode {
        FileTreeBuilder::build(&self.files)
    }

    pub fn preview(&self) -> Option<String> {
        PreviewComposer::compose(&self.files)
    }

    pub fn stats(&self) -> FileMapStats {
        self.files.stats()
    }

    pub fn editor_stats(&self) -> EditorStats {
        collect_editor_stats(&self.raw_text)
    }

    /// 解析並提交新文字。 / Parses `text` and commits it as the new project.
    ///
    /// A malformed text leaves the current project and history untouched.
    pub fn parse_text(&mut self, text: &str) -> Result<(), PlaygroundError> {
        let files = match parse(text) {
            Ok(files) => files,
            Err(err) => {
                warn!("rejected project text: {err}");
                return Err(err.into());
            }
        };
        self.snapshot();
        self.raw_text = text.to_string();
        self.files = files;
        self.recompute();
        info!(
            "parsed {} file(s); language {}",
            self.files.len(),
            self.language
        );
        Ok(())
    }

    /// 清除專案；空白時不動作。 / Clears the project; returns `false` when already blank.
    pub fn clear(&mut self) -> bool {
        if self.raw_text.trim().is_empty() {
            return false;
        }
        self.snapshot();
        self.raw_text.clear();
        self.files.clear();
        self.recompute();
        info!("cleared project");
        true
    }

    /// 還原上一個快照。 / Restores the newest snapshot; returns `false` when history is empty.
    pub fn undo(&mut self) -> bool {
        let Some(UndoSnapshot { files, raw_text }) = self.undo.pop() else {
            return false;
        };
        self.files = files;
        self.raw_text = raw_text;
        self.recompute();
        info!("undo restored {} file(s)", self.files.len());
        true
    }

    /// 以合成標頭匯入成員。 / Imports members by re-serialising them as project text.
    pub fn import_members(&mut self, members: &[ArchiveMember]) -> Result<(), PlaygroundError> {
        let text = serialize_members(members)?;
        self.parse_text(&text)
    }

    /// 匯入資料夾或文字檔。 / Imports a directory tree or a single text file.
    pub fn import_path(&mut self, path: &Path) -> Result<(), PlaygroundError> {
        if path.is_dir() {
            let members = read_directory(path)?;
            info!("importing {} member(s) from {}", members.len(), path.display());
            self.import_members(&members)
        } else {
            let text = read_text_file(path)?;
            info!("importing text from {}", path.display());
            self.parse_text(&text)
        }
    }

    /// 匯出檔名。 / Archive file name for `name`, falling back to the configured default.
    pub fn archive_name(&self, name: Option<&str>) -> String {
        archive_file_name(name.unwrap_or_default(), &self.default_project_name)
    }

    /// 將所有檔案寫入資料夾。 / Writes every file under `root`.
    pub fn export_to(&self, root: &Path) -> Result<usize, PlaygroundError> {
        let written = write_directory(&self.files, root)?;
        info!("exported {written} file(s) to {}", root.display());
        Ok(written)
    }

    /// 載入下一個範例。 / Loads the next built-in sample.
    pub fn load_next_sample(&mut self) -> Result<&'static Sample, PlaygroundError> {
        self.sample_index = (self.sample_index + 1) % SAMPLES.len();
        let sample = &SAMPLES[self.sample_index];
        self.parse_text(sample.text)?;
        Ok(sample)
    }

    pub fn set_input_value(
        &mut self,
        slot: usize,
        value: impl Into<String>,
    ) -> Result<(), PlaygroundError> {
        let entry = self
            .input_values
            .get_mut(slot)
            .ok_or(PlaygroundError::UnknownSlot(slot))?;
        *entry = value.into();
        Ok(())
    }

    /// 組合標準輸入。 / Assembles stdin for the current mode.
    pub fn assemble_stdin(&self) -> Result<String, PlaygroundError> {
        match &self.stdin_mode {
            StdinMode::Manual(raw) => Ok(raw.clone()),
            StdinMode::Smart => {
                let slots: Vec<usize> = self
                    .input_values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| value.trim().is_empty())
                    .map(|(slot, _)| slot)
                    .collect();
                if !slots.is_empty() {
                    return Err(PlaygroundError::MissingInputs { slots });
                }
                Ok(self.input_values.join("\n"))
            }
        }
    }

    /// 建立執行請求。 / Builds a run ticket for the current revision.
    pub fn prepare_run(&self) -> Result<RunTicket, PlaygroundError> {
        if !self.language.is_runnable() {
            return Err(PlaygroundError::NotRunnable(self.language));
        }
        let stdin = self.assemble_stdin()?;
        let request = ExecutionRequest::for_project(&self.files, stdin)?
            .with_version(self.language_version.as_str());
        debug!(
            "prepared {} run at revision {}",
            request.language, self.revision
        );
        Ok(RunTicket {
            revision: self.revision,
            request,
        })
    }

    /// 接受執行結果；過期結果會被捨棄。 / Renders a completion, or drops it when stale.
    pub fn accept_run(&self, completion: RunCompletion) -> Option<Vec<TerminalLine>> {
        if completion.revision != self.revision {
            warn!(
                "discarding run result for revision {} (current {})",
                completion.revision, self.revision
            );
            return None;
        }
        Some(render_transcript(&completion.result))
    }

    /// 同步執行。 / Prepares, dispatches and renders a run in one step.
    pub fn run_with(&self, transport: &dyn Transport) -> Result<Vec<TerminalLine>, PlaygroundError> {
        let completion = self.prepare_run()?.dispatch(transport);
        Ok(render_transcript(&completion.result))
    }

    fn snapshot(&mut self) {
        self.undo
            .push(UndoSnapshot::new(&self.files, &self.raw_text));
    }

    fn recompute(&mut self) {
        self.language = LanguageDetector::detect(&self.files);
        let source = LanguageDetector::active_source(&self.files)
            .map(|active| active.content)
            .unwrap_or_default();
        self.inputs = synthesize(source, self.language);
        self.input_values = vec![String::new(); self.inputs.len()];
        self.revision += 1;
        debug!(
            "recomputed revision {}: {} input slot(s)",
            self.revision,
            self.inputs.len()
        );
    }
}
