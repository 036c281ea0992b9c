//! Button icon lookup and decoding

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use egui::ColorImage;
use tracing::{debug, info};

use crate::constants::themes;

/// Finds per-action icons inside user and system theme directories
#[derive(Debug, Clone)]
pub struct IconResolver {
    user_dir: Option<PathBuf>,
    system_dir: PathBuf,
}

impl IconResolver {
    /// `~/.themes` and `/usr/share/themes`
    pub fn new() -> Self {
        Self {
            user_dir: dirs::home_dir().map(|home| home.join(themes::HOME_DIR)),
            system_dir: PathBuf::from(themes::SYSTEM_DIR),
        }
    }

    #[cfg(test)]
    pub fn with_dirs(user_dir: Option<PathBuf>, system_dir: PathBuf) -> Self {
        Self {
            user_dir,
            system_dir,
        }
    }

    fn icon_path(root: &Path, theme: &str, action: &str, extension: &str) -> PathBuf {
        root.join(theme)
            .join(themes::ICON_SUBDIR)
            .join(format!("{action}.{extension}"))
    }

    /// Candidate paths in search order: PNG before SVG, user before system
    pub fn candidates(&self, action: &str, theme: &str) -> Vec<PathBuf> {
        let roots: Vec<&Path> = self
            .user_dir
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.system_dir.as_path()))
            .collect();

        ["png", "svg"]
            .into_iter()
            .flat_map(|ext| {
                roots
                    .iter()
                    .map(move |root| Self::icon_path(root, theme, action, ext))
            })
            .collect()
    }

    /// First existing candidate, otherwise the fallback theme's SVG
    ///
    /// The fallback path is returned without checking that it exists;
    /// [`load_icon`] reports it if it doesn't.
    pub fn resolve(&self, action: &str, theme: &str) -> PathBuf {
        if let Some(path) = self
            .candidates(action, theme)
            .into_iter()
            .find(|path| path.is_file())
        {
            debug!(action, theme, path = %path.display(), "Resolved button icon");
            return path;
        }

        info!(action, theme, "Icon not found in theme, using fallback theme instead");
        Self::icon_path(&self.system_dir, themes::FALLBACK_THEME, action, "svg")
    }
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a PNG or SVG icon to RGBA pixels
///
/// SVGs are rasterized at exactly `width`×`height`; PNGs keep their own
/// resolution and are scaled when painted.
pub fn load_icon(path: &Path, width: u32, height: u32) -> Result<ColorImage> {
    if !path.is_file() {
        bail!("Icon file not found: {}", path.display());
    }

    let data = fs::read(path).with_context(|| format!("Failed to read icon {}", path.display()))?;
    let is_svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        rasterize_svg(&data, width, height)
            .with_context(|| format!("Failed to render SVG icon {}", path.display()))
    } else {
        decode_png(&data).with_context(|| format!("Failed to decode PNG icon {}", path.display()))
    }
}

fn decode_png(data: &[u8]) -> Result<ColorImage> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let (color_type, _) = reader.output_color_type();
    let (width, height) = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };
    let mut buf = vec![0; width * height * color_type.samples()];
    let frame = reader.next_frame(&mut buf)?;
    let pixels = &buf[..frame.buffer_size()];

    let rgba: Vec<u8> = match color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xFF])
            .collect(),
        png::ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => pixels.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        other => {
            return Err(anyhow!(
                "Unsupported icon color type {:?} (expected RGB, RGBA or grayscale)",
                other
            ));
        }
    };

    Ok(ColorImage::from_rgba_unmultiplied([width, height], &rgba))
}

fn rasterize_svg(data: &[u8], width: u32, height: u32) -> Result<ColorImage> {
    let tree = resvg::usvg::Tree::from_data(data, &resvg::usvg::Options::default())?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow!("Invalid icon size {width}x{height}"))?;

    let size = tree.size();
    let transform = resvg::tiny_skia::Transform::from_scale(
        pixmap.width() as f32 / size.width(),
        pixmap.height() as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(ColorImage::from_rgba_premultiplied(
        [pixmap.width() as usize, pixmap.height() as usize],
        pixmap.data(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><rect width="16" height="16" fill="#ff0000"/></svg>"##;

    fn touch(root: &Path, theme: &str, file: &str) -> PathBuf {
        let dir = root.join(theme).join(themes::ICON_SUBDIR);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        fs::write(&path, SQUARE_SVG).unwrap();
        path
    }

    fn resolver(user: &TempDir, system: &TempDir) -> IconResolver {
        IconResolver::with_dirs(Some(user.path().to_path_buf()), system.path().to_path_buf())
    }

    #[test]
    fn test_candidate_order() {
        let resolver = IconResolver::with_dirs(Some(PathBuf::from("/u")), PathBuf::from("/s"));
        assert_eq!(
            resolver.candidates("logout", "T"),
            vec![
                PathBuf::from("/u/T/clearine/logout.png"),
                PathBuf::from("/s/T/clearine/logout.png"),
                PathBuf::from("/u/T/clearine/logout.svg"),
                PathBuf::from("/s/T/clearine/logout.svg"),
            ]
        );
    }

    #[test]
    fn test_system_svg_found_when_no_png() {
        let (user, system) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let expected = touch(system.path(), "T", "logout.svg");
        assert_eq!(resolver(&user, &system).resolve("logout", "T"), expected);
    }

    #[test]
    fn test_png_beats_svg_and_user_beats_system() {
        let (user, system) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        touch(user.path(), "T", "restart.svg");
        let system_png = touch(system.path(), "T", "restart.png");
        assert_eq!(resolver(&user, &system).resolve("restart", "T"), system_png);

        let user_png = touch(user.path(), "T", "restart.png");
        assert_eq!(resolver(&user, &system).resolve("restart", "T"), user_png);
    }

    #[test]
    fn test_fallback_is_returned_unchecked() {
        let (user, system) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let path = resolver(&user, &system).resolve("shutdown", "Missing");
        assert_eq!(
            path,
            system.path().join("default-clearine/clearine/shutdown.svg")
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_icon_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_icon(&dir.path().join("cancel.svg"), 32, 32).unwrap_err();
        assert!(err.to_string().contains("Icon file not found"));
    }

    #[test]
    fn test_svg_rasterized_at_requested_size() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "T", "cancel.svg");
        let image = load_icon(&path, 24, 40).unwrap();
        assert_eq!(image.size, [24, 40]);
    }
}
