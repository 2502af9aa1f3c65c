//! The structured document model of a trading plan.
//!
//! A plan is a markdown file with one top-level title and three canonical
//! second-level sections in fixed order. Documents that do not match that
//! template are never mangled: they are kept verbatim in raw mode until the
//! user explicitly normalizes them.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// The three canonical section headings, in their required order.
pub const SECTION_HEADINGS: [&str; 3] = [
    "1. Описание текущей ситуации",
    "2. Описание сценариев перехода к сделкам",
    "3. Описание сценариев сделок",
];

/// Title used when a plan is created from scratch.
pub const DEFAULT_TITLE: &str = "Новый торговый план";
/// Title used when a document carries none.
pub const UNTITLED: &str = "Без названия";

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*#\s+(.+?)\s*$").expect("title pattern"));
static H2_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##\s+(.+?)\s*$").expect("h2 pattern"));
static IMAGE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[[^\]]*]\([^)]+\)\s*$").expect("image line pattern"));

/// Collapses whitespace and case-folds a heading for comparison. The
/// canonical headings are Cyrillic, so the fold has to be Unicode-aware.
fn normalize_heading(value: &str) -> String {
    value.split_whitespace().join(" ").to_lowercase()
}

fn canonical_index(normalized: &str) -> Option<usize> {
    SECTION_HEADINGS
        .iter()
        .position(|heading| normalize_heading(heading) == normalized)
}

/// In-memory representation of a plan document.
///
/// When `structured` is true the three section bodies plus `extras` are the
/// source of truth and serialization reproduces them byte-identically. When
/// it is false the document did not match the template and `raw_markdown`
/// holds the whole original text instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub title: String,
    /// Body of "1. Описание текущей ситуации".
    pub situation: String,
    /// Body of "2. Описание сценариев перехода к сделкам".
    pub transitions: String,
    /// Body of "3. Описание сценариев сделок".
    pub deals: String,
    /// Non-canonical content, preserved verbatim, serialized after the
    /// canonical sections.
    pub extras: String,
    /// The original text; only meaningful when `structured` is false.
    pub raw_markdown: String,
    pub structured: bool,
}

impl Plan {
    /// A fresh structured plan with empty sections.
    pub fn empty(title: &str) -> Self {
        let title = title.trim();
        Self {
            title: if title.is_empty() { DEFAULT_TITLE } else { title }.to_string(),
            situation: String::new(),
            transitions: String::new(),
            deals: String::new(),
            extras: String::new(),
            raw_markdown: String::new(),
            structured: true,
        }
    }

    /// Parses a markdown document into a plan.
    ///
    /// The document is structured iff all three canonical headings are
    /// present and occur in canonical order; otherwise the entire text is
    /// retained verbatim in raw mode and no partial extraction is exposed.
    pub fn from_markdown(markdown: &str, fallback_title: &str) -> Self {
        let text = markdown.replace("\r\n", "\n").replace('\r', "\n");

        let title_captures = TITLE_RE.captures(&text);
        let title = title_captures
            .as_ref()
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| fallback_title.to_string());

        let headings: Vec<regex::Captures> = H2_RE.captures_iter(&text).collect();
        if headings.is_empty() {
            return Self::raw(title, text);
        }

        let mut sections: [Option<String>; 3] = [None, None, None];
        let mut extras_chunks: Vec<String> = Vec::new();
        let mut encountered: Vec<usize> = Vec::new();

        // Prose between the title and the first heading goes to extras.
        let prefix_start = title_captures
            .as_ref()
            .and_then(|captures| captures.get(0))
            .map(|m| m.end())
            .unwrap_or(0);
        let first_heading_start = headings[0].get(0).map(|m| m.start()).unwrap_or(0);
        // A title below the first heading leaves no prefix (inverted range).
        let prefix = text
            .get(prefix_start..first_heading_start)
            .unwrap_or_default();
        if !prefix.trim().is_empty() {
            extras_chunks.push(prefix.trim_matches('\n').to_string());
        }

        for (index, captures) in headings.iter().enumerate() {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            let heading = captures
                .get(1)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let body_end = headings
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            let body = text[whole.end()..body_end].trim_matches('\n');

            // First match wins; duplicates and unknown headings are extras.
            if let Some(slot) = canonical_index(&normalize_heading(heading)) {
                if sections[slot].is_none() {
                    sections[slot] = Some(body.to_string());
                    encountered.push(slot);
                    continue;
                }
            }

            let mut extra = format!("## {heading}\n");
            if !body.is_empty() {
                extra.push_str(body.trim_end());
                extra.push('\n');
            }
            extras_chunks.push(extra.trim_matches('\n').to_string());
        }

        // Structured iff every section was found and their first occurrences
        // are in canonical order.
        let structured = sections.iter().all(Option::is_some)
            && encountered.windows(2).all(|pair| pair[0] < pair[1]);
        if !structured {
            return Self::raw(title, text);
        }

        let [situation, transitions, deals] = sections.map(Option::unwrap_or_default);
        Self {
            title,
            situation,
            transitions,
            deals,
            extras: extras_chunks
                .iter()
                .filter(|chunk| !chunk.trim().is_empty())
                .join("\n\n"),
            raw_markdown: text,
            structured: true,
        }
    }

    fn raw(title: String, text: String) -> Self {
        Self {
            title,
            situation: String::new(),
            transitions: String::new(),
            deals: String::new(),
            extras: String::new(),
            raw_markdown: text,
            structured: false,
        }
    }

    /// Adopts a raw document into the canonical template: the whole text
    /// becomes the body of section 1. An explicit escape hatch for legacy
    /// content, not a parse.
    pub fn normalize_raw(markdown: &str, title: &str) -> Self {
        let title = title.trim();
        Self {
            title: if title.is_empty() { DEFAULT_TITLE } else { title }.to_string(),
            situation: markdown.trim_matches('\n').to_string(),
            transitions: String::new(),
            deals: String::new(),
            extras: String::new(),
            raw_markdown: String::new(),
            structured: true,
        }
    }

    fn sections(&self) -> [&str; 3] {
        [&self.situation, &self.transitions, &self.deals]
    }

    /// Serializes a structured plan back to canonical markdown: title, the
    /// three sections in fixed order, extras, one trailing newline.
    pub fn to_markdown(&self) -> String {
        let title = self.title.trim();
        let mut lines: Vec<String> = vec![
            format!("# {}", if title.is_empty() { UNTITLED } else { title }),
            String::new(),
        ];

        for (heading, body) in SECTION_HEADINGS.iter().zip(self.sections()) {
            lines.push(format!("## {heading}"));
            let body = body.trim_matches('\n');
            if !body.is_empty() {
                lines.push(body.to_string());
            }
            lines.push(String::new());
        }

        let extras = self.extras.trim_matches('\n');
        if !extras.is_empty() {
            lines.push(extras.to_string());
            lines.push(String::new());
        }

        let mut output = lines.join("\n").trim_end().to_string();
        output.push('\n');
        output
    }
}

/// Replaces the text of the first top-level heading, or prepends a new one
/// when the document has none.
pub fn apply_title_to_markdown(markdown: &str, title: &str) -> String {
    let title = title.trim();
    let clean_title = if title.is_empty() { UNTITLED } else { title };
    let text = markdown.replace("\r\n", "\n").replace('\r', "\n");

    if TITLE_RE.is_match(&text) {
        let replaced = TITLE_RE.replacen(&text, 1, regex::NoExpand(&format!("# {clean_title}")));
        return format!("{}\n", replaced.trim_end());
    }

    if !text.trim().is_empty() {
        return format!(
            "# {clean_title}\n\n{}\n",
            text.trim_start_matches('\n').trim_end()
        );
    }

    format!("# {clean_title}\n\n")
}

/// Finds the first embedded image line with no prose between it and the next
/// image (or the end of the block) and returns the 1-based line number just
/// below it. The editor uses this to place the caret for a caption.
pub fn find_first_image_without_text(markdown_block: &str) -> Option<usize> {
    let lines: Vec<&str> = markdown_block.lines().collect();

    for (index, raw_line) in lines.iter().enumerate() {
        if !IMAGE_LINE_RE.is_match(raw_line.trim()) {
            continue;
        }

        let has_text_below = lines[index + 1..]
            .iter()
            .map(|next| next.trim())
            .find(|next| !next.is_empty())
            .is_some_and(|next| !IMAGE_LINE_RE.is_match(next));

        if !has_text_below {
            return Some(index + 1);
        }
    }

    None
}
