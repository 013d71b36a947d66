//! services/api/src/render/mod.rs
//!
//! Slide rendering. `html` produces the browser preview and `pdf` produces the
//! downloadable document; `metrics` holds the font measurements both need for
//! line wrapping.

pub mod html;
pub mod metrics;
pub mod pdf;

pub use html::render_html;
pub use pdf::render_pdf;
