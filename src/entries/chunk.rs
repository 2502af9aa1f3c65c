//! Chunk-then-field-table engine shared by the three block parsers.
//!
//! A section body is first split into ordered entry chunks (a pure structural
//! step), then a label scanner maps each chunk's recognized labels to field
//! bodies. Label order in the source is irrelevant; only label positions
//! bound the bodies.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Standard markdown image marker; the path is the first capture.
pub(super) static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("image pattern"));

/// Fourth-level sub-heading opening an entry chunk.
pub(super) static SUBHEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^####\s+.*$").expect("subheading pattern"));

/// Splits a block body into entry chunks.
///
/// When the body contains `####` sub-headings, each heading's span (to the
/// next heading or end) is one chunk. Otherwise each embedded image marker
/// starts a chunk; a body with no images yields no chunks on that path.
pub(super) fn split_chunks(body: &str) -> Vec<&str> {
    let text = body.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = if SUBHEADING_RE.is_match(text) {
        SUBHEADING_RE.find_iter(text).map(|m| m.start()).collect()
    } else {
        IMAGE_RE.find_iter(text).map(|m| m.start()).collect()
    };

    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .collect()
}

/// How a label carries its body.
pub(super) enum LabelKind {
    /// The body is the pattern's first capture (labeled line or HTML-comment
    /// block).
    Inline,
    /// The body runs from the end of the label to the start of the next
    /// recognized label of any kind, or the end of the chunk.
    Section,
}

/// One row of a block's field table.
pub(super) struct Label<'r> {
    pub field: &'static str,
    pub kind: LabelKind,
    pub pattern: &'r Regex,
}

impl<'r> Label<'r> {
    pub fn inline(field: &'static str, pattern: &'r Regex) -> Self {
        Self {
            field,
            kind: LabelKind::Inline,
            pattern,
        }
    }

    pub fn section(field: &'static str, pattern: &'r Regex) -> Self {
        Self {
            field,
            kind: LabelKind::Section,
            pattern,
        }
    }
}

/// Runs the label table over one chunk.
///
/// Only the first occurrence of each label is considered. Fields whose label
/// is absent are missing from the map; callers decide the fallback.
pub(super) fn scan_fields(chunk: &str, labels: &[Label]) -> HashMap<&'static str, String> {
    struct Hit<'c> {
        start: usize,
        end: usize,
        field: &'static str,
        kind: &'c LabelKind,
        inline_body: Option<String>,
    }

    let mut hits: Vec<Hit> = labels
        .iter()
        .filter_map(|label| {
            let captures = label.pattern.captures(chunk)?;
            let whole = captures.get(0)?;
            Some(Hit {
                start: whole.start(),
                end: whole.end(),
                field: label.field,
                kind: &label.kind,
                inline_body: captures.get(1).map(|m| m.as_str().trim().to_string()),
            })
        })
        .collect();
    hits.sort_by_key(|hit| hit.start);

    let mut fields = HashMap::new();
    for (index, hit) in hits.iter().enumerate() {
        let body = match hit.kind {
            LabelKind::Inline => hit.inline_body.clone().unwrap_or_default(),
            LabelKind::Section => {
                let end = hits
                    .get(index + 1)
                    .map(|next| next.start)
                    .unwrap_or(chunk.len());
                chunk[hit.end..end].trim().to_string()
            }
        };
        fields.insert(hit.field, body);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_images_without_subheadings() {
        let body = "![a](a.png)\nподпись a\n\n![b](b.png)\nподпись b";
        let chunks = split_chunks(body);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("a.png"));
        assert!(chunks[0].contains("подпись a"));
        assert!(chunks[1].contains("b.png"));
    }

    #[test]
    fn test_split_by_subheadings_when_present() {
        let body = "вводный текст\n\n#### Сценарий 1\n![a](a.png)\n\n#### Сценарий 2\n![b](b.png)";
        let chunks = split_chunks(body);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("#### Сценарий 1"));
        assert!(chunks[1].starts_with("#### Сценарий 2"));
    }

    #[test]
    fn test_no_images_no_subheadings_yields_no_chunks() {
        assert!(split_chunks("просто текст без картинок").is_empty());
        assert!(split_chunks("").is_empty());
    }

    #[test]
    fn test_section_body_bounded_by_next_label_of_any_kind() {
        let header = Regex::new(r"(?m)^\*\*Идея\*\*\s*$").unwrap();
        let tf = Regex::new(r"(?m)^\*\*TF:\*\*\s*(.+?)\s*$").unwrap();
        let chunk = "**Идея**\nтело идеи\nвторая строка\n**TF:** H1";
        let fields = scan_fields(
            chunk,
            &[Label::section("idea", &header), Label::inline("tf", &tf)],
        );
        assert_eq!(fields["idea"], "тело идеи\nвторая строка");
        assert_eq!(fields["tf"], "H1");
    }

    #[test]
    fn test_label_order_in_source_is_irrelevant() {
        let a = Regex::new(r"(?m)^\*\*A\*\*\s*$").unwrap();
        let b = Regex::new(r"(?m)^\*\*B\*\*\s*$").unwrap();
        let chunk = "**B**\nтело B\n**A**\nтело A";
        let fields = scan_fields(chunk, &[Label::section("a", &a), Label::section("b", &b)]);
        assert_eq!(fields["a"], "тело A");
        assert_eq!(fields["b"], "тело B");
    }

    #[test]
    fn test_missing_labels_are_absent() {
        let a = Regex::new(r"(?m)^\*\*A\*\*\s*$").unwrap();
        let fields = scan_fields("никаких меток", &[Label::section("a", &a)]);
        assert!(fields.is_empty());
    }
}
