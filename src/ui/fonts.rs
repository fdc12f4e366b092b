use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use eframe::egui;

/// Where common desktop systems keep a font with CJK coverage.
const SYSTEM_CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

pub fn find_font(configured: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(candidates.iter().map(PathBuf::from))
        .find(|path| path.is_file())
}

/// egui's bundled fonts have no Chinese glyphs; add one as a fallback.
pub fn install_cjk_font(ctx: &egui::Context, configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = find_font(configured, SYSTEM_CJK_FONTS).context("no CJK font found")?;
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn configured_font_wins_when_present() {
        let dir = std::env::temp_dir().join(format!("journey_fonts_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let configured = dir.join("mine.ttf");
        fs::write(&configured, b"font").unwrap();

        assert_eq!(find_font(Some(&configured), &[]), Some(configured.clone()));

        let _ = fs::remove_file(&configured);
    }

    #[test]
    fn missing_fonts_yield_none() {
        assert_eq!(
            find_font(Some(Path::new("/definitely/not/here.ttf")), &["/nor/here.ttc"]),
            None
        );
    }
}
