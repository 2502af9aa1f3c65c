use std::path::Path;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlanError, Result};
use crate::notation::{self, Dialect};

use super::chunk::{self, IMAGE_RE};
use super::{image_alt, markdown_image_path, TF_LINE_RE};

/// `<!-- NOTATION ... -->` payload of the situation block.
static NOTATION_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--\s*NOTATION\s*(.*?)\s*-->").expect("notation pattern"));

/// Horizontal rule lines, stripped from the free text.
static RULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---+\s*$").expect("rule pattern"));

/// One snapshot of the current situation: a chart image and its timeframe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SituationImage {
    pub image_path: String,
    pub timeframe: String,
}

/// The whole current-situation section: ordered images, one shared notation
/// and the free text underneath.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SituationBlock {
    pub images: Vec<SituationImage>,
    pub notation: String,
    pub text: String,
}

impl SituationBlock {
    /// Extracts the situation block from its section body.
    pub fn parse(body: &str) -> Self {
        let text = body.trim();
        if text.is_empty() {
            return Self::default();
        }

        let images = chunk::split_chunks(text)
            .into_iter()
            .filter_map(|entry_chunk| {
                let captures = IMAGE_RE.captures(entry_chunk)?;
                Some(SituationImage {
                    image_path: captures[1].trim().to_string(),
                    timeframe: TF_LINE_RE
                        .captures(entry_chunk)
                        .map(|c| c[1].trim().to_string())
                        .unwrap_or_default(),
                })
            })
            .collect();

        let notation = NOTATION_COMMENT_RE
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();

        // Free text is whatever remains after the structural markers; it is
        // never discarded, even in label-free legacy blocks.
        let mut manual = NOTATION_COMMENT_RE.replace_all(text, "").into_owned();
        manual = IMAGE_RE.replace_all(&manual, "").into_owned();
        manual = TF_LINE_RE.replace_all(&manual, "").into_owned();
        manual = RULE_RE.replace_all(&manual, "").into_owned();

        Self {
            images,
            notation,
            text: manual.trim().to_string(),
        }
    }

    /// Serializes the block back to its section body: image entries, the
    /// notation comment, then the free text.
    pub fn to_markdown(&self, base_dir: Option<&Path>) -> String {
        let mut parts: Vec<String> = Vec::new();

        let entries = self
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let path = markdown_image_path(&image.image_path, base_dir);
                let alt = image_alt(&path, format!("situation_{}", index + 1));
                let mut entry = format!("![{alt}]({path})");
                if !image.timeframe.trim().is_empty() {
                    entry.push_str(&format!("\n**TF:** {}", image.timeframe.trim()));
                }
                entry
            })
            .join("\n\n");
        if !entries.is_empty() {
            parts.push(entries);
        }

        let notation = self.notation.trim();
        if !notation.is_empty() {
            parts.push(format!("<!-- NOTATION\n{notation}\n-->"));
        }

        let text = self.text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }

        parts.join("\n\n")
    }

    /// First problem preventing this block from being considered complete.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(PlanError::Validation(
                "В разделе текущей ситуации нужна минимум одна картинка.".to_string(),
            ));
        }
        for (index, image) in self.images.iter().enumerate() {
            if image.image_path.trim().is_empty() {
                return Err(PlanError::Validation(format!(
                    "Картинка #{}: не выбрана картинка.",
                    index + 1
                )));
            }
            if image.timeframe.trim().is_empty() {
                return Err(PlanError::Validation(format!(
                    "Картинка #{}: укажите TF.",
                    index + 1
                )));
            }
        }

        let notation = self.notation.trim();
        if notation.is_empty() {
            return Err(PlanError::Validation(
                "Заполните нотацию для блока текущей ситуации.".to_string(),
            ));
        }
        notation::translate(Dialect::Range, notation)?;
        Ok(())
    }
}
