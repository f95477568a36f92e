//! Land-transaction permit application rendering
//!
//! Submitted values are placed at fixed millimetre coordinates on one A4
//! page and compiled to PDF with Typst. Rendering runs on a blocking thread
//! under a timeout.

pub mod error;
pub mod fonts;
pub mod form;
pub mod layout;
pub mod render;
pub mod world;

pub use error::RenderError;
pub use fonts::FontCache;
pub use form::FormData;
pub use render::{compile_pdf, PermitRenderer, DEFAULT_RENDER_TIMEOUT_MS};
pub use world::PermitWorld;
