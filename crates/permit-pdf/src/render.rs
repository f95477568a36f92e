//! Form compilation with timeout handling

use std::sync::Arc;
use std::time::Duration;

use typst::diag::{Severity, SourceDiagnostic};
use typst_pdf::PdfOptions;

use crate::error::RenderError;
use crate::fonts::FontCache;
use crate::form::FormData;
use crate::layout::form_source;
use crate::world::PermitWorld;

/// Default compile timeout for one form
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 30_000;

/// Renders permit applications; cheap to share behind an `Arc`
pub struct PermitRenderer {
    fonts: Arc<FontCache>,
    timeout_ms: u64,
}

impl PermitRenderer {
    pub fn new(fonts: Arc<FontCache>, timeout_ms: u64) -> Self {
        Self { fonts, timeout_ms }
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    /// Build the world for one submission.
    pub fn world(&self, form: &FormData) -> PermitWorld {
        PermitWorld::new(
            form_source(&self.fonts.families()),
            form.to_inputs(),
            Arc::clone(&self.fonts),
        )
    }

    /// Render on a blocking thread, bounded by the configured timeout.
    pub async fn render(&self, form: &FormData) -> Result<Vec<u8>, RenderError> {
        let world = self.world(form);
        tracing::debug!("Rendering permit form with {} fields", form.len());

        let result = tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            tokio::task::spawn_blocking(move || compile_pdf(&world)),
        )
        .await;

        match result {
            Ok(Ok(pdf)) => pdf,
            Ok(Err(join_error)) => Err(RenderError::Task(join_error.to_string())),
            Err(_timeout) => Err(RenderError::Timeout(self.timeout_ms)),
        }
    }
}

/// Compile and export synchronously.
pub fn compile_pdf(world: &PermitWorld) -> Result<Vec<u8>, RenderError> {
    let warned = typst::compile(world);
    for warning in &warned.warnings {
        tracing::debug!("Typst warning: {}", warning.message);
    }

    let document = warned
        .output
        .map_err(|diagnostics| RenderError::Compile(error_messages(&diagnostics)))?;

    typst_pdf::pdf(&document, &PdfOptions::default())
        .map_err(|diagnostics| RenderError::Export(error_messages(&diagnostics).join("; ")))
}

fn error_messages(diagnostics: &[SourceDiagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|diag| diag.severity == Severity::Error)
        .map(|diag| diag.message.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(timeout_ms: u64) -> PermitRenderer {
        PermitRenderer::new(Arc::new(FontCache::embedded()), timeout_ms)
    }

    #[tokio::test]
    async fn test_render_produces_pdf() {
        let form = FormData::new()
            .with("seller_name", "Hong Gildong")
            .with("land1_address", "Yeoksam-dong 737")
            .with("land1_area", "330.5");

        let pdf = renderer(DEFAULT_RENDER_TIMEOUT_MS).render(&form).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_empty_form_renders() {
        let pdf = renderer(DEFAULT_RENDER_TIMEOUT_MS)
            .render(&FormData::new())
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_markup_in_values_is_inert() {
        let form = FormData::new()
            .with("seller_name", "#panic(\"boom\")")
            .with("use_purpose", "*bold* _x_ $y$ \\ ] )");

        let pdf = renderer(DEFAULT_RENDER_TIMEOUT_MS).render(&form).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_hangul_without_korean_font_still_renders() {
        let form = FormData::new().with("seller_name", "홍길동");
        let pdf = renderer(DEFAULT_RENDER_TIMEOUT_MS).render(&form).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_zero_timeout() {
        let result = renderer(0).render(&FormData::new()).await;
        assert!(matches!(result, Err(RenderError::Timeout(0))));
    }
}
