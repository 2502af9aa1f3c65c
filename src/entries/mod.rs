//! Per-section entry parsers.
//!
//! Each canonical section body holds repeated entries anchored by embedded
//! images: situation snapshots, transition scenarios and deal scenarios.
//! The parsers here extract them into typed data and serialize them back
//! with a fixed label layout. Everything is pure text work; image paths are
//! relativized arithmetically and the filesystem is never touched.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

mod chunk;

mod situation;
pub use situation::{SituationBlock, SituationImage};

mod transition;
pub use transition::TransitionEntry;

mod deal;
pub use deal::DealEntry;

/// `**TF:** H1` or legacy `TF: H1` line.
static TF_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^(?:\*\*TF:\*\*|TF:)\s*(.+?)\s*$").expect("tf pattern"));

/// Rewrites an image path for embedding: absolute paths under the base
/// directory become relative, separators become forward slashes.
fn markdown_image_path(path: &str, base_dir: Option<&Path>) -> String {
    let candidate = Path::new(path.trim());
    if candidate.is_absolute() {
        if let Some(base) = base_dir {
            if let Ok(relative) = candidate.strip_prefix(base) {
                return posix(relative);
            }
        }
    }
    posix(candidate)
}

fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Alt text for an embedded image: the file stem, or a numbered fallback.
fn image_alt(markdown_path: &str, fallback: String) -> String {
    Path::new(markdown_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_image_path_relativizes_under_base() {
        let base = Path::new("/plans/eurusd");
        assert_eq!(
            markdown_image_path("/plans/eurusd/img/shot.png", Some(base)),
            "img/shot.png"
        );
        // outside the base directory the absolute path is kept
        assert_eq!(
            markdown_image_path("/elsewhere/shot.png", Some(base)),
            "/elsewhere/shot.png"
        );
        // relative paths pass through
        assert_eq!(markdown_image_path("img/shot.png", Some(base)), "img/shot.png");
        assert_eq!(markdown_image_path("img/shot.png", None), "img/shot.png");
    }

    #[test]
    fn test_image_alt_prefers_file_stem() {
        assert_eq!(image_alt("img/shot.png", "x".into()), "shot");
        assert_eq!(image_alt("", "situation_1".into()), "situation_1");
    }
}
