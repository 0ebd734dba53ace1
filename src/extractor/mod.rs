//! # Concurrent bundle extraction.
//!
//! - [`classify_index_image`] / [`ImageRef`] reference parsing
//! - [`Extractor`] index resolution plus all-or-nothing concurrent fetching
//! - [`IndexReader`], [`BundleFetcher`] the I/O seams implemented by callers

#[allow(clippy::module_inception)]
mod extractor;
mod image;

pub use extractor::{BundleFetcher, Extractor, IndexReader};
pub use image::{classify_index_image, ImageRef, IndexImage};
