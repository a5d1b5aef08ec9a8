//! Persisted configuration for PastePad.
//! PastePad 的持久化設定。

pub mod preferences;

pub use preferences::{
    ExecutionPreferences, ExportPreferences, HistoryPreferences, Preferences, PreferencesError,
    PreferencesStore, DEFAULT_ENDPOINT,
};
