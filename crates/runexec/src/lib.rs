//! Remote code execution for runnable projects.
//! （將可執行專案送往遠端執行服務。）
//!
//! A run submits a single source file plus a stdin string to a
//! Piston-compatible HTTP endpoint and receives `{ run: { stdout, stderr } }`.
//! There is exactly one attempt per run: no retry and no timeout policy beyond
//! what the transport itself applies.
//! 每次執行僅送出一次請求，不重試，也不另外設定逾時。

use log::{debug, warn};
use pastepad_project::FileMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language version sent when none is configured; `*` selects the latest.
pub const ANY_VERSION: &str = "*";

/// Errors that may surface while dispatching a run.
/// （送出執行請求時可能發生的錯誤。）
#[derive(Debug, Error)]
pub enum RunError {
    #[error("connection error: {0}")]
    Transport(String),
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("project has no {0} to run")]
    MissingEntry(&'static str),
}

/// Language and file chosen for execution.
/// （執行時選用的語言與檔案。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTarget {
    pub language: &'static str,
    pub file_name: &'static str,
}

impl ExecutionTarget {
    const PYTHON: Self = Self {
        language: "python",
        file_name: "main.py",
    };

    /// `main.c`, then `main.cpp`, then `index.js` without `index.html`, then
    /// `main.py`; python is the fallback when nothing matches.
    /// （依 `main.c`、`main.cpp`、無 `index.html` 的 `index.js`、`main.py` 的順序選擇；皆無時預設 python。）
    pub fn select(files: &FileMap) -> Self {
        if files.contains("main.c") {
            Self {
                language: "c",
                file_name: "main.c",
            }
        } else if files.contains("main.cpp") {
            Self {
                language: "cpp",
                file_name: "main.cpp",
            }
        } else if files.contains("index.js") && !files.contains("index.html") {
            Self {
                language: "javascript",
                file_name: "index.js",
            }
        } else {
            Self::PYTHON
        }
    }
}

/// One source file in the request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFile {
    pub content: String,
}

/// Serializable execution request.
/// （可序列化的執行請求。）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<RequestFile>,
    pub stdin: String,
}

impl ExecutionRequest {
    /// Creates an empty request for the given language.
    /// （以指定語言建立空白請求。）
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: ANY_VERSION.to_string(),
            files: Vec::new(),
            stdin: String::new(),
        }
    }

    /// Builds the request for a project: the selected entry file only.
    /// （為專案建立請求：僅包含選定的入口檔。）
    pub fn for_project(files: &FileMap, stdin: impl Into<String>) -> Result<Self, RunError> {
        let target = ExecutionTarget::select(files);
        let content = files
            .get(target.file_name)
            .ok_or(RunError::MissingEntry(target.file_name))?;
        Ok(Self::new(target.language)
            .with_file(content)
            .with_stdin(stdin))
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_file(mut self, content: impl Into<String>) -> Self {
        self.files.push(RequestFile {
            content: content.into(),
        });
        self
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

/// Output section of an execution response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

/// Execution response; anything without a `run` object is an API error.
/// （執行回應；沒有 `run` 物件即視為 API 錯誤。）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub run: Option<RunOutput>,
}

impl ExecutionResponse {
    pub fn from_json(body: &str) -> Result<Self, RunError> {
        serde_json::from_str(body).map_err(|err| RunError::Decode(err.to_string()))
    }
}

/// Sends execution requests somewhere and returns the decoded response.
/// （送出執行請求並回傳解碼後的回應。）
pub trait Transport {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, RunError>;
}

/// HTTP transport posting JSON to a Piston-compatible endpoint.
/// （以 JSON POST 至 Piston 相容端點的 HTTP 傳輸。）
pub struct HttpTransport {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, RunError> {
        let body =
            serde_json::to_string(request).map_err(|err| RunError::Decode(err.to_string()))?;
        debug!(
            "posting {} run ({} stdin bytes) to {}",
            request.language,
            request.stdin.len(),
            self.endpoint
        );
        let response = match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                warn!("execution endpoint answered with status {code}");
                resp
            }
            Err(ureq::Error::Transport(err)) => return Err(RunError::Transport(err.to_string())),
        };
        let text = response
            .into_string()
            .map_err(|err| RunError::Transport(err.to_string()))?;
        ExecutionResponse::from_json(&text)
    }
}

/// Visual category of a terminal line.
/// （終端機輸出行的顯示類別。）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Output,
    Error,
    Info,
}

/// One line of the run transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TerminalLine {
    pub kind: LineKind,
    pub text: String,
}

impl TerminalLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Renders a run result as ordered terminal lines.
/// （將執行結果轉為依序排列的終端機輸出行。）
pub fn render_transcript(result: &Result<ExecutionResponse, RunError>) -> Vec<TerminalLine> {
    let response = match result {
        Ok(response) => response,
        Err(err) => return vec![TerminalLine::new(LineKind::Error, err.to_string())],
    };

    let mut lines = Vec::new();
    match &response.run {
        Some(run) => {
            if let Some(stdout) = run.stdout.as_deref().filter(|text| !text.is_empty()) {
                lines.push(TerminalLine::new(LineKind::Output, stdout));
            }
            if let Some(stderr) = run.stderr.as_deref().filter(|text| !text.is_empty()) {
                lines.push(TerminalLine::new(LineKind::Error, stderr));
            }
        }
        None => lines.push(TerminalLine::new(LineKind::Error, "API error")),
    }
    lines.push(TerminalLine::new(LineKind::Info, "--- Run finished ---"));
    lines
}
