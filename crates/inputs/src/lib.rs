use log::debug;
use once_cell::sync::Lazy;
use pastepad_project::LanguageTag;
use regex::Regex;
use serde::Serialize;

/// Comment-only prompt marker used by C and C++ sources: `// input("Label")`.
/// C／C++ 專用的註解提示標記：`// input("Label")`。
pub const MAGIC_MARKER_EXAMPLE: &str = r#"// input("Label")"#;

static MAGIC_MARKER_RULE: Lazy<InputRule> = Lazy::new(|| {
    InputRule::new(r#"//\s*input\s*\(\s*["'](?P<label>[^"']+)["']\s*\)"#)
        .expect("magic marker pattern must compile")
});

static INPUT_CALL_RULE: Lazy<InputRule> = Lazy::new(|| {
    InputRule::new(r#"input\s*\(\s*['"](?P<label>[^'"]+)['"]\s*\)"#)
        .expect("input call pattern must compile")
});

/// One synthesized input field.
/// （單一合成的輸入欄位。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDescriptor {
    pub label: String,
    /// 0-based position in source order; binds a collected value back to its prompt.
    pub slot_index: usize,
    /// Byte offset of the call site that produced this field.
    #[serde(skip)]
    pub offset: usize,
}

/// Result of input synthesis.
/// （輸入合成的結果。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InputSchema {
    /// Nothing to scan: a web/none project or an empty source.
    NotNeeded,
    /// The source was scanned; `fields` may legitimately be empty.
    Scanned {
        language: LanguageTag,
        fields: Vec<InputDescriptor>,
    },
}

impl InputSchema {
    pub fn fields(&self) -> &[InputDescriptor] {
        match self {
            InputSchema::NotNeeded => &[],
            InputSchema::Scanned { fields, .. } => fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Language-specific hint shown when a scan found no prompts.
    /// （掃描後找不到提示時顯示的語言相關提示。）
    pub fn hint(&self) -> Option<String> {
        match self {
            InputSchema::Scanned { language, fields } if fields.is_empty() => {
                let mut message = String::from("No input() prompts detected.");
                if language.uses_magic_marker() {
                    message.push_str(&format!(
                        " Hint: declare prompts with `{MAGIC_MARKER_EXAMPLE}`."
                    ));
                }
                Some(message)
            }
            _ => None,
        }
    }
}

/// A compiled prompt pattern with a `label` capture group.
/// （含 `label` 擷取群組的已編譯提示樣式。）
#[derive(Debug, Clone)]
pub struct InputRule {
    regex: Regex,
}

impl InputRule {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Returns `(offset, label)` for every match in `source`.
    /// （回傳 `source` 中每個符合項目的 `(位移, 標籤)`。）
    pub fn scan<'s>(&self, source: &'s str) -> Vec<(usize, &'s str)> {
        self.regex
            .captures_iter(source)
            .filter_map(|capture| {
                let whole = capture.get(0)?;
                let label = capture.name("label")?;
                Some((whole.start(), label.as_str()))
            })
            .collect()
    }
}

/// Selects the rule used for a language, or `None` when no input is needed.
/// （選出語言對應的規則；不需要輸入時回傳 `None`。）
pub fn rule_for(language: LanguageTag) -> Option<&'static InputRule> {
    match language {
        LanguageTag::Web | LanguageTag::None => None,
        LanguageTag::C | LanguageTag::Cpp => Some(&*MAGIC_MARKER_RULE),
        LanguageTag::Python | LanguageTag::Javascript => Some(&*INPUT_CALL_RULE),
    }
}

/// Scans `source` for interactive-input prompts and returns them in source order.
/// （掃描 `source` 中的互動輸入提示，依原始碼順序回傳。）
pub fn synthesize(source: &str, language: LanguageTag) -> InputSchema {
    if source.is_empty() {
        return InputSchema::NotNeeded;
    }
    let Some(rule) = rule_for(language) else {
        return InputSchema::NotNeeded;
    };

    let mut matches = rule.scan(source);
    matches.sort_by_key(|(offset, _)| *offset);
    let fields: Vec<InputDescriptor> = matches
        .into_iter()
        .enumerate()
        .map(|(slot_index, (offset, label))| InputDescriptor {
            label: label.to_string(),
            slot_index,
            offset,
        })
        .collect();

    debug!("synthesized {} input field(s) for {language}", fields.len());
    InputSchema::Scanned { language, fields }
}
