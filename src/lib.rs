//! # customer-pdf – paginated customer detail documents
//!
//! Renders one resolved customer record into a multi-page A4 PDF. The
//! pipeline stages are:
//!
//! 1. **Prepare** – resolve image bytes to assets or absence ([`assets`])
//! 2. **Map** – record → sections, rows, cells and blocks ([`mapper`], [`plan`])
//! 3. **Measure** – heights from the same metrics drawing uses ([`measure`], [`fonts`])
//! 4. **Paginate** – flow rows onto pages with a write cursor ([`pagination`], [`cursor`])
//! 5. **Render** – emit PDF bytes via printpdf, icons as paths ([`render`], [`icons`])

pub mod assets;
pub mod cursor;
pub mod error;
pub mod fonts;
pub mod icons;
pub mod layout_config;
pub mod mapper;
pub mod measure;
pub mod pagination;
pub mod pipeline;
pub mod plan;
pub mod record;
pub mod render;

// Re-exports for convenience
pub use error::{DocumentError, Result};
pub use pipeline::{generate_document, generate_pdf_from_record, DocumentConfig, GeneratedDocument};
pub use record::{Address, CustomerRecord, Role};
