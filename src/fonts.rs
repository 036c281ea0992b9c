//! Font discovery via fontconfig
//!
//! Config font names look like `DejaVu Sans ExtraLight` or, copied from a
//! Pango description, `DejaVu Sans Book 9`. They are resolved to font files
//! and registered with egui as named families.

use std::collections::BTreeSet;
use std::ffi::CString;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use egui::{FontData, FontDefinitions, FontFamily};
use fontconfig::{Fontconfig, Pattern};
use tracing::{debug, info, warn};

/// Style suffixes recognised at the end of a font name
/// Longer names first so "SemiBold Italic" isn't read as "Italic"
const KNOWN_STYLES: &[&str] = &[
    "Condensed Bold Italic",
    "Condensed Bold",
    "SemiBold Italic",
    "Bold Italic",
    "Bold Oblique",
    "Light Italic",
    "ExtraLight",
    "ExtraBold",
    "SemiBold",
    "Italic",
    "Oblique",
    "Bold",
    "Book",
    "Light",
    "Medium",
    "Black",
    "Thin",
    "Regular",
    "Condensed",
];

/// Split a font name into family and optional style
///
/// A trailing point size (`DejaVu Sans Book 9`) is ignored; the size comes
/// from the matching `*-size` key.
pub fn split_font_name(font_name: &str) -> (&str, Option<&'static str>) {
    let mut name = font_name.trim();
    if let Some((rest, last)) = name.rsplit_once(' ') {
        if last.parse::<f32>().is_ok() {
            name = rest.trim_end();
        }
    }

    for style in KNOWN_STYLES {
        if let Some(prefix) = name.strip_suffix(style) {
            if prefix.is_empty() {
                break;
            }
            if prefix.ends_with(' ') {
                return (prefix.trim_end(), Some(*style));
            }
        }
    }
    (name, None)
}

/// Find the font file fontconfig picks for `font_name`
pub fn find_font_path(font_name: &str) -> Result<PathBuf> {
    let fc = Fontconfig::new().context("Failed to initialize fontconfig")?;
    let (family, style) = split_font_name(font_name);

    let mut pattern = Pattern::new(&fc);
    let family_cstr =
        CString::new(family).with_context(|| format!("Invalid family name: {family}"))?;
    pattern.add_string(fontconfig::FC_FAMILY, &family_cstr);
    if let Some(style) = style {
        let style_cstr =
            CString::new(style).with_context(|| format!("Invalid style name: {style}"))?;
        pattern.add_string(fontconfig::FC_STYLE, &style_cstr);
    }

    let matched = pattern.font_match();

    // fontconfig always returns something; make sure it's the family asked for
    if let Some(matched_family) = matched.get_string(fontconfig::FC_FAMILY) {
        if !matched_family.eq_ignore_ascii_case(family) {
            anyhow::bail!(
                "Font '{font_name}' not found - fontconfig returned family '{matched_family}' instead"
            );
        }
    }

    let path = matched
        .filename()
        .map(PathBuf::from)
        .with_context(|| format!("No font file found for '{font_name}'"))?;
    if !path.exists() {
        anyhow::bail!("Font file path '{}' does not exist", path.display());
    }

    debug!(font = font_name, family, style = ?style, path = %path.display(), "Resolved font path");
    Ok(path)
}

/// egui family handle for a configured font name
pub fn family(font_name: &str) -> FontFamily {
    FontFamily::Name(font_name.into())
}

/// Read the file fontconfig picks for `font_name`
fn read_font_file(font_name: &str) -> Result<Vec<u8>> {
    let path = find_font_path(font_name)?;
    fs::read(&path).with_context(|| format!("Failed to read font file: {}", path.display()))
}

/// egui panics on font data it can't parse; bitmap and Type1 fonts are
/// rejected here instead
fn check_font_data(font_name: &str, bytes: &[u8]) -> Result<()> {
    ab_glyph::FontRef::try_from_slice(bytes)
        .map(|_| ())
        .map_err(|err| anyhow!("Font '{font_name}' is not a TrueType/OpenType font: {err}"))
}

/// Register every font name as a named egui family
///
/// Names that can't be resolved are mapped onto the default proportional
/// fonts so painting never hits an unknown family.
pub fn font_definitions<'a>(names: impl IntoIterator<Item = &'a str>) -> FontDefinitions {
    font_definitions_with(names, read_font_file)
}

fn font_definitions_with<'a>(
    names: impl IntoIterator<Item = &'a str>,
    load: impl Fn(&str) -> Result<Vec<u8>>,
) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    let proportional = fonts
        .families
        .get(&FontFamily::Proportional)
        .cloned()
        .unwrap_or_default();

    let names: BTreeSet<&str> = names.into_iter().collect();
    for name in names {
        let mut chain = Vec::new();
        match load(name).and_then(|bytes| check_font_data(name, &bytes).map(|()| bytes)) {
            Ok(bytes) => {
                info!(font = name, "Loaded font");
                fonts
                    .font_data
                    .insert(name.to_string(), Arc::new(FontData::from_owned(bytes)));
                chain.push(name.to_string());
            }
            Err(err) => {
                warn!(font = name, error = %err, "Failed to load font, using default font instead");
            }
        }
        chain.extend(proportional.iter().cloned());
        fonts.families.insert(family(name), chain);
    }
    fonts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_font_name() {
        assert_eq!(split_font_name("DejaVu Sans ExtraLight"), ("DejaVu Sans", Some("ExtraLight")));
        assert_eq!(split_font_name("DejaVu Sans Book 9"), ("DejaVu Sans", Some("Book")));
        assert_eq!(split_font_name("Roboto Mono SemiBold Italic"), ("Roboto Mono", Some("SemiBold Italic")));
        assert_eq!(split_font_name("Inter"), ("Inter", None));
        assert_eq!(split_font_name("Bold"), ("Bold", None));
        assert_eq!(split_font_name("Fira Code 10.5"), ("Fira Code", None));
        assert_eq!(split_font_name("Notosemibold"), ("Notosemibold", None));
    }

    #[test]
    fn test_every_name_gets_a_family() {
        let fonts = font_definitions(["Clearine Missing Font 12", "DejaVu Sans Book"]);
        for name in ["Clearine Missing Font 12", "DejaVu Sans Book"] {
            let chain = fonts.families.get(&family(name)).expect("family registered");
            assert!(!chain.is_empty());
        }
    }

    /// Bytes of one of egui's bundled fonts
    fn bundled_font() -> Vec<u8> {
        FontDefinitions::default()
            .font_data
            .values()
            .next()
            .expect("egui ships default fonts")
            .font
            .to_vec()
    }

    #[test]
    fn test_non_truetype_font_falls_back_without_panicking() {
        let bdf = b"STARTFONT 2.1\nFONT -xos4-Terminus-Medium-R-Normal--16\nENDFONT\n".to_vec();
        let fonts = font_definitions_with(["Terminus"], |_| Ok(bdf.clone()));

        assert!(!fonts.font_data.contains_key("Terminus"));
        let chain = fonts.families.get(&family("Terminus")).expect("family registered");
        assert!(!chain.iter().any(|font| font == "Terminus"));
        assert!(!chain.is_empty());

        let ctx = egui::Context::default();
        ctx.set_fonts(fonts);
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.label(egui::RichText::new("12.30").font(egui::FontId::new(20.0, family("Terminus"))));
                });
            });
        }
    }

    #[test]
    fn test_truetype_font_is_registered_first() {
        let bytes = bundled_font();
        let fonts = font_definitions_with(["Clearine Test Sans"], |_| Ok(bytes.clone()));

        assert!(fonts.font_data.contains_key("Clearine Test Sans"));
        let chain = fonts.families.get(&family("Clearine Test Sans")).expect("family registered");
        assert_eq!(chain.first().map(String::as_str), Some("Clearine Test Sans"));
    }

    #[test]
    fn test_check_font_data() {
        assert!(check_font_data("Bundled", &bundled_font()).is_ok());
        assert!(check_font_data("Empty", &[]).is_err());
        assert!(check_font_data("Type1", b"%!PS-AdobeFont-1.0: Foo").is_err());
    }
}
