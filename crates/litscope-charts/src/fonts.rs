//! Runtime font registration.
//!
//! plotters' ab_glyph text backend only knows fonts registered by name, so a
//! TrueType file is read once, leaked for the life of the process, and
//! registered under `FONT_FAMILY` for the normal and bold styles.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};
use tracing::{debug, info};

use crate::error::ChartError;

/// Family name every chart uses for its text.
pub const FONT_FAMILY: &str = "litscope-sans";

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<PathBuf> = OnceLock::new();

/// Register the chart font, once per process.
///
/// `configured` wins when set; otherwise common system locations are probed.
pub fn ensure_font(configured: Option<&Path>) -> Result<(), ChartError> {
    if let Some(path) = REGISTERED.get() {
        debug!(font = %path.display(), "Chart font already registered");
        return Ok(());
    }

    let regular = match configured {
        Some(path) if path.is_file() => path.to_path_buf(),
        Some(path) => {
            return Err(ChartError::FontUnavailable(format!(
                "{} does not exist (charts.font_path)",
                path.display()
            )))
        }
        None => probe(CANDIDATES.iter().map(Path::new)).ok_or_else(|| {
            ChartError::FontUnavailable(
                "no system font found; set charts.font_path to a .ttf file".into(),
            )
        })?,
    };

    let bold = bold_sibling(&regular).filter(|p| p.is_file());
    register(&regular, FontStyle::Normal)?;
    register(bold.as_deref().unwrap_or(&regular), FontStyle::Bold)?;

    info!(font = %regular.display(), bold = bold.is_some(), "Chart font registered");
    let _ = REGISTERED.set(regular);
    Ok(())
}

fn register(path: &Path, style: FontStyle) -> Result<(), ChartError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ChartError::FontUnavailable(format!("{}: {e}", path.display())))?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, style, bytes).map_err(|_| {
        ChartError::FontUnavailable(format!("{} is not a usable TrueType font", path.display()))
    })
}

/// First existing file among `candidates`.
pub fn probe<'a>(mut candidates: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates.find(|p| p.is_file()).map(Path::to_path_buf)
}

/// `DejaVuSans.ttf` → `DejaVuSans-Bold.ttf`, `X-Regular.ttf` → `X-Bold.ttf`,
/// `Arial.ttf` → `Arial Bold.ttf`.
pub fn bold_sibling(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("ttf");
    let bold_stem = if let Some(base) = stem.strip_suffix("-Regular") {
        format!("{base}-Bold")
    } else if stem.eq_ignore_ascii_case("arial") {
        format!("{stem} Bold")
    } else {
        format!("{stem}-Bold")
    };
    Some(path.with_file_name(format!("{bold_stem}.{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_sibling_names() {
        assert_eq!(
            bold_sibling(Path::new("/fonts/DejaVuSans.ttf")).unwrap(),
            PathBuf::from("/fonts/DejaVuSans-Bold.ttf")
        );
        assert_eq!(
            bold_sibling(Path::new("/fonts/LiberationSans-Regular.ttf")).unwrap(),
            PathBuf::from("/fonts/LiberationSans-Bold.ttf")
        );
        assert_eq!(
            bold_sibling(Path::new("/Library/Fonts/Arial.ttf")).unwrap(),
            PathBuf::from("/Library/Fonts/Arial Bold.ttf")
        );
    }

    #[test]
    fn test_probe_takes_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("b.ttf");
        std::fs::write(&present, b"x").unwrap();
        let missing = dir.path().join("a.ttf");

        let found = probe([missing.as_path(), present.as_path()].into_iter());
        assert_eq!(found, Some(present));
        assert_eq!(probe([missing.as_path()].into_iter()), None);
    }

    #[test]
    fn test_missing_configured_font_is_reported() {
        let err = ensure_font(Some(Path::new("/definitely/not/here.ttf")));
        // another test may already have registered a system font
        if REGISTERED.get().is_none() {
            assert!(matches!(err, Err(ChartError::FontUnavailable(_))));
        }
    }
}
