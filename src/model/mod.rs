//! Extraction result model.
//!
//! [`SanctionDocument`] is the structured result of one extraction;
//! [`SanctionRecord`] is its flattened, sentinel-filled serialized form.

mod document;
mod record;

pub use document::*;
pub use record::*;
