use std::path::Path;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlanError, Result};
use crate::notation::{self, Dialect};

use super::chunk::{self, Label, IMAGE_RE, SUBHEADING_RE};
use super::{image_alt, markdown_image_path, TF_LINE_RE};

static NOTATION_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\s*TRANSITION_NOTATION\s*(.*?)\s*-->").expect("notation pattern")
});
static MEANING_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\s*TRANSITION_MEANING_NOTATION\s*(.*?)\s*-->").expect("meaning pattern")
});
static WHY_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--\s*TRANSITION_WHY\s*(.*?)\s*-->").expect("why pattern")
});
/// Rendered meaning line; re-derived on serialize, so recognized but unused.
static MEANING_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\*\*Что это будет означать\?:\*\*.*$").expect("meaning line pattern")
});
static WHY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*Почему\?:\*\*\s*$").expect("why line pattern"));

/// One transition scenario: a chart image plus the action notation, the
/// meaning notation and the trader's reasoning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionEntry {
    pub image_path: String,
    pub timeframe: String,
    pub notation: String,
    pub meaning_notation: String,
    pub why_text: String,
}

impl TransitionEntry {
    /// Extracts all transition scenarios from the section body, in order.
    pub fn parse_all(body: &str) -> Vec<Self> {
        chunk::split_chunks(body)
            .into_iter()
            .map(Self::from_chunk)
            .collect()
    }

    fn from_chunk(entry_chunk: &str) -> Self {
        let image_path = IMAGE_RE
            .captures(entry_chunk)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        let fields = chunk::scan_fields(
            entry_chunk,
            &[
                Label::inline("tf", &TF_LINE_RE),
                Label::inline("notation", &NOTATION_COMMENT_RE),
                Label::inline("meaning", &MEANING_COMMENT_RE),
                Label::inline("why", &WHY_COMMENT_RE),
                Label::inline("meaning_line", &MEANING_LINE_RE),
                Label::section("why_line", &WHY_LINE_RE),
            ],
        );
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        let mut why_text = field("why");
        if why_text.is_empty() {
            why_text = field("why_line");
        }
        if why_text.is_empty() {
            // Legacy chunk without any why label: the leftover prose is the
            // reasoning, never discarded.
            why_text = leftover_text(entry_chunk);
        }

        Self {
            image_path,
            timeframe: field("tf"),
            notation: field("notation"),
            meaning_notation: field("meaning"),
            why_text,
        }
    }

    /// Serializes the scenarios back to the section body with the fixed
    /// label layout, numbering entries from 1.
    pub fn render_all(entries: &[Self], base_dir: Option<&Path>) -> String {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_markdown(index + 1, base_dir))
            .join("\n\n")
    }

    fn to_markdown(&self, index: usize, base_dir: Option<&Path>) -> String {
        let path = markdown_image_path(&self.image_path, base_dir);
        let alt = image_alt(&path, format!("transition_{index}"));

        let mut parts = vec![format!(
            "#### Сценарий {index}\n![{alt}]({path})\n**TF:** {}",
            self.timeframe.trim()
        )];
        parts.push(format!(
            "<!-- TRANSITION_NOTATION\n{}\n-->",
            self.notation.trim()
        ));

        let meaning = self.meaning_notation.trim();
        if !meaning.is_empty() {
            parts.push(format!("<!-- TRANSITION_MEANING_NOTATION\n{meaning}\n-->"));
        }
        let why = self.why_text.trim();
        if !why.is_empty() {
            parts.push(format!("<!-- TRANSITION_WHY\n{why}\n-->"));
        }

        // Readable duplicates of the machine-held payloads.
        if let Ok(sentence) = notation::translate(Dialect::TransitionMeaning, meaning) {
            parts.push(format!("**Что это будет означать?:** {sentence}"));
        }
        if !why.is_empty() {
            parts.push(format!("**Почему?:**\n{why}"));
        }

        parts.join("\n\n")
    }

    /// First problem in the whole section: it must hold at least one
    /// scenario and every scenario must be complete.
    pub fn validate_all(entries: &[Self]) -> Result<()> {
        if entries.is_empty() {
            return Err(PlanError::Validation(
                "В разделе сценариев перехода нужен минимум один сценарий.".to_string(),
            ));
        }
        for (index, entry) in entries.iter().enumerate() {
            entry.validate(index + 1)?;
        }
        Ok(())
    }

    /// First problem preventing this scenario from being complete.
    pub fn validate(&self, index: usize) -> Result<()> {
        let problem = |message: String| Err(PlanError::Validation(message));
        if self.image_path.trim().is_empty() {
            return problem(format!("Сценарий #{index}: не выбрана картинка."));
        }
        if self.timeframe.trim().is_empty() {
            return problem(format!("Сценарий #{index}: выберите таймфрейм."));
        }
        if let Err(error) = notation::translate(Dialect::TransitionAction, self.notation.trim()) {
            return problem(format!("Сценарий #{index}: {error}"));
        }
        let meaning = self.meaning_notation.trim();
        if meaning.is_empty() {
            return problem(format!(
                "Сценарий #{index}: заполните нотацию 'Что это будет означать?'."
            ));
        }
        if let Err(error) = notation::translate(Dialect::TransitionMeaning, meaning) {
            return problem(format!("Сценарий #{index}: {error}"));
        }
        if self.why_text.trim().is_empty() {
            return problem(format!("Сценарий #{index}: заполните 'Почему?'."));
        }
        Ok(())
    }
}

/// Chunk text with every structural marker removed; what remains is prose.
fn leftover_text(entry_chunk: &str) -> String {
    let mut rest = SUBHEADING_RE.replace_all(entry_chunk, "").into_owned();
    rest = IMAGE_RE.replace_all(&rest, "").into_owned();
    rest = NOTATION_COMMENT_RE.replace_all(&rest, "").into_owned();
    rest = MEANING_COMMENT_RE.replace_all(&rest, "").into_owned();
    rest = WHY_COMMENT_RE.replace_all(&rest, "").into_owned();
    rest = TF_LINE_RE.replace_all(&rest, "").into_owned();
    rest = MEANING_LINE_RE.replace_all(&rest, "").into_owned();
    rest = WHY_LINE_RE.replace_all(&rest, "").into_owned();
    rest.trim().to_string()
}
