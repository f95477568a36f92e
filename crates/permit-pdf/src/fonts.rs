//! Font loading
//!
//! The embedded typst-assets fonts are always available. A Korean system
//! font is probed at startup: the configured path first, then well-known
//! install locations. Without one, Hangul falls back to the embedded Latin
//! fonts and renders as missing glyphs.

use std::path::{Path, PathBuf};

use typst::foundations::Bytes;
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;

use crate::error::RenderError;

/// Well-known Korean font locations, probed in order
pub const KOREAN_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/Library/Fonts/AppleGothic.ttf",
    "C:\\Windows\\Fonts\\malgun.ttf",
];

/// Family used when no Korean font is installed
pub const FALLBACK_FAMILY: &str = "Libertinus Serif";

/// Fonts available to the form renderer
#[derive(Debug)]
pub struct FontCache {
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    korean_family: Option<String>,
}

impl FontCache {
    /// Embedded fonts only
    pub fn embedded() -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();
        Self::load_embedded_fonts(&mut book, &mut fonts);

        Self {
            book: LazyHash::new(book),
            fonts,
            korean_family: None,
        }
    }

    /// Embedded fonts plus the first Korean font found.
    pub fn load(configured: Option<&Path>) -> Result<Self, RenderError> {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();
        Self::load_embedded_fonts(&mut book, &mut fonts);

        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(KOREAN_FONT_CANDIDATES.iter().map(PathBuf::from));

        let mut korean_family = None;
        for path in candidates {
            if let Some(family) = Self::load_font_file(&path, &mut book, &mut fonts) {
                tracing::info!("Using Korean font '{}' from {}", family, path.display());
                korean_family = Some(family);
                break;
            }
        }

        if korean_family.is_none() {
            tracing::warn!(
                "No Korean font found, falling back to embedded '{}'",
                FALLBACK_FAMILY
            );
        }
        if fonts.is_empty() {
            return Err(RenderError::Font("no fonts available".to_string()));
        }

        tracing::info!("Font cache initialized with {} fonts", fonts.len());

        Ok(Self {
            book: LazyHash::new(book),
            fonts,
            korean_family,
        })
    }

    fn load_embedded_fonts(book: &mut FontBook, fonts: &mut Vec<Font>) {
        for data in typst_assets::fonts() {
            let buffer = Bytes::from_static(data);
            for font in Font::iter(buffer) {
                book.push(font.info().clone());
                fonts.push(font);
            }
        }
    }

    /// Load every face in a font file; returns the first face's family.
    fn load_font_file(path: &Path, book: &mut FontBook, fonts: &mut Vec<Font>) -> Option<String> {
        let data = std::fs::read(path).ok()?;

        let mut family = None;
        for font in Font::iter(Bytes::from(data)) {
            family.get_or_insert_with(|| font.info().family.clone());
            book.push(font.info().clone());
            fonts.push(font);
        }
        if family.is_none() {
            tracing::debug!("{} holds no usable font faces", path.display());
        }
        family
    }

    pub fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    pub fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Family of the Korean font in use, if one was found
    pub fn korean_family(&self) -> Option<&str> {
        self.korean_family.as_deref()
    }

    /// Families for the document's font list, preferred first
    pub fn families(&self) -> Vec<String> {
        self.korean_family
            .iter()
            .cloned()
            .chain(std::iter::once(FALLBACK_FAMILY.to_string()))
            .collect()
    }
}
