//! Application state for the PastePad playground.
//! PastePad 遊樂場的應用程式狀態。

pub mod metrics;
pub mod playground;
pub mod samples;

pub use metrics::{collect_editor_stats, EditorStats};
pub use playground::{Playground, PlaygroundError, RunCompletion, RunTicket, StdinMode};
pub use samples::{Sample, SAMPLES};
