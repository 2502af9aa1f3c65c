use std::path::Path;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlanError, Result};

use super::chunk::{self, Label, IMAGE_RE, SUBHEADING_RE};
use super::{image_alt, markdown_image_path};

/// The four prose fields of a deal scenario and their bold headers, in the
/// fixed serialization order. `idea` is the primary field that receives
/// label-free legacy content.
const FIELD_HEADERS: [(&str, &str); 4] = [
    ("idea", "Идея сделки"),
    ("entry", "Entry: почему именно так? Можно ли выгоднее? Обосновать"),
    ("sl", "SL: Почему именно так? Что он отменяет? Обосновать"),
    ("tp", "TP: Почему именно так? Это оптимальная цель? Обосновать"),
];

static TRANSITION_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\*\*Сценарий перехода:\*\*\s*(.+?)\s*$").expect("transition ref pattern")
});

static FIELD_HEADER_RES: Lazy<[Regex; 4]> = Lazy::new(|| {
    FIELD_HEADERS.map(|(_, header)| {
        Regex::new(&format!(r"(?m)^\*\*{}\*\*\s*$", regex::escape(header)))
            .expect("field header pattern")
    })
});

/// One deal scenario: a chart image, a reference to the transition scenario
/// it follows from and the four reasoning fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DealEntry {
    pub image_path: String,
    pub transition_ref: String,
    pub idea: String,
    pub entry: String,
    pub sl: String,
    pub tp: String,
}

impl DealEntry {
    /// Extracts all deal scenarios from the section body, in order.
    ///
    /// A legacy body with no chunk markers at all still yields one entry
    /// carrying the whole text as the idea.
    pub fn parse_all(body: &str) -> Vec<Self> {
        let text = body.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let chunks = chunk::split_chunks(text);
        if chunks.is_empty() {
            return vec![Self {
                idea: text.to_string(),
                ..Self::default()
            }];
        }
        chunks.into_iter().map(Self::from_chunk).collect()
    }

    fn from_chunk(entry_chunk: &str) -> Self {
        let image_path = IMAGE_RE
            .captures(entry_chunk)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        let mut labels = vec![Label::inline("transition_ref", &TRANSITION_REF_RE)];
        for ((field, _), pattern) in FIELD_HEADERS.iter().zip(FIELD_HEADER_RES.iter()) {
            labels.push(Label::section(field, pattern));
        }
        let fields = chunk::scan_fields(entry_chunk, &labels);
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        let mut idea = field("idea");
        let entry = field("entry");
        let sl = field("sl");
        let tp = field("tp");
        if idea.is_empty() && entry.is_empty() && sl.is_empty() && tp.is_empty() {
            // Label-free legacy chunk: the leftover prose becomes the idea.
            idea = leftover_text(entry_chunk);
        }

        Self {
            image_path,
            transition_ref: field("transition_ref"),
            idea,
            entry,
            sl,
            tp,
        }
    }

    /// Serializes the scenarios back to the section body, numbering entries
    /// from 1 and emitting the field headers in their fixed order.
    pub fn render_all(entries: &[Self], base_dir: Option<&Path>) -> String {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_markdown(index + 1, base_dir))
            .join("\n\n")
    }

    fn to_markdown(&self, index: usize, base_dir: Option<&Path>) -> String {
        let path = markdown_image_path(&self.image_path, base_dir);
        let alt = image_alt(&path, format!("deal_{index}"));

        let mut lines = vec![
            format!("#### Сделка {index}"),
            format!("![{alt}]({path})"),
            format!("**Сценарий перехода:** {}", self.transition_ref.trim()),
        ];
        for ((_, header), value) in FIELD_HEADERS
            .iter()
            .zip([&self.idea, &self.entry, &self.sl, &self.tp])
        {
            lines.push(String::new());
            lines.push(format!("**{header}**"));
            lines.push(value.trim().to_string());
        }
        lines.join("\n").trim().to_string()
    }

    /// First problem in the whole section: it must hold at least one deal
    /// and every deal must be complete.
    pub fn validate_all(entries: &[Self]) -> Result<()> {
        if entries.is_empty() {
            return Err(PlanError::Validation(
                "В разделе сценариев сделок нужна минимум одна сделка.".to_string(),
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
            return problem(format!("Сделка #{index}: не выбрана картинка."));
        }
        if self.transition_ref.trim().is_empty() {
            return problem(format!("Сделка #{index}: выберите сценарий перехода."));
        }
        if self.idea.trim().is_empty() {
            return problem(format!("Сделка #{index}: заполните поле 'Идея сделки'."));
        }
        if self.entry.trim().is_empty() {
            return problem(format!("Сделка #{index}: заполните поле 'Entry'."));
        }
        if self.sl.trim().is_empty() {
            return problem(format!("Сделка #{index}: заполните поле 'SL'."));
        }
        if self.tp.trim().is_empty() {
            return problem(format!("Сделка #{index}: заполните поле 'TP'."));
        }
        Ok(())
    }
}

/// Chunk text with the structural markers removed.
fn leftover_text(entry_chunk: &str) -> String {
    let mut rest = SUBHEADING_RE.replace_all(entry_chunk, "").into_owned();
    rest = IMAGE_RE.replace_all(&rest, "").into_owned();
    rest = TRANSITION_REF_RE.replace_all(&rest, "").into_owned();
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> DealEntry {
        DealEntry {
            image_path: "img/deal.png".to_string(),
            transition_ref: "Сценарий 1".to_string(),
            idea: "Покупка от дисконта.".to_string(),
            entry: "Лимитный ордер на границе блока.".to_string(),
            sl: "За минимум структуры.".to_string(),
            tp: "Противоположная зона премиум.".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let entries = vec![sample_entry()];
        let body = DealEntry::render_all(&entries, None);
        assert!(body.contains("#### Сделка 1"));
        assert!(body.contains("**Идея сделки**"));
        assert_eq!(DealEntry::parse_all(&body), entries);
    }

    #[test]
    fn test_field_extraction_ignores_source_order() {
        let body = "\
![a](img/a.png)
**Сценарий перехода:** Сценарий 2

**TP: Почему именно так? Это оптимальная цель? Обосновать**
цель

**Идея сделки**
идея";
        let entry = &DealEntry::parse_all(body)[0];
        assert_eq!(entry.transition_ref, "Сценарий 2");
        assert_eq!(entry.idea, "идея");
        assert_eq!(entry.tp, "цель");
        assert!(entry.entry.is_empty());
    }

    #[test]
    fn test_label_free_chunk_keeps_text_as_idea() {
        let body = "![a](img/a.png)\nстарое описание сделки";
        let entry = &DealEntry::parse_all(body)[0];
        assert_eq!(entry.idea, "старое описание сделки");
    }

    #[test]
    fn test_body_without_markers_becomes_single_idea_entry() {
        let entries = DealEntry::parse_all("просто старый текст раздела");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].image_path.is_empty());
        assert_eq!(entries[0].idea, "просто старый текст раздела");
    }

    #[test]
    fn test_validate_all_rejects_empty_section() {
        let error = DealEntry::validate_all(&[]).unwrap_err();
        assert!(error.to_string().contains("минимум одна сделка"));
        assert!(DealEntry::validate_all(&[sample_entry()]).is_ok());
    }

    #[test]
    fn test_validate_names_entry_and_field() {
        assert!(sample_entry().validate(1).is_ok());

        let mut broken = sample_entry();
        broken.sl.clear();
        let error = broken.validate(3).unwrap_err();
        assert!(error.to_string().contains("Сделка #3"));
        assert!(error.to_string().contains("SL"));
    }
}
