//! # Bundle extraction from an index image.
//!
//! ```text
//! extract_bundles(index, package)
//!   classify_index_image(index) ── Tagless ──► Ok([])        (info log)
//!        │ Tagged(ref)
//!   IndexReader::bundle_images(ref, package) ──► [img0, img1, …, imgN]
//!        │
//!   JoinSet: one fetch task per image, all sharing one CancellationToken
//!        ├─ task i: BundleFetcher::fetch(token, img_i) ──► slot[i]
//!        └─ first error ──► token.cancel() ──► siblings give up
//!   join every task ──► Ok(slots in index order) | Err(first error)
//! ```
//!
//! A batch is all-or-nothing: partial bundle sets are never returned.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::bundle::Bundle;
use crate::error::ExtractError;

use super::image::{classify_index_image, ImageRef, IndexImage};

/// Resolves an index image into the bundle images it references.
#[async_trait]
pub trait IndexReader: Send + Sync + 'static {
    /// Bundle image references for `package`, or for every package when `None`.
    async fn bundle_images(
        &self,
        index: &ImageRef,
        package: Option<&str>,
    ) -> Result<Vec<String>, ExtractError>;
}

/// Pulls and decodes one bundle image.
///
/// Implementations should stop early and return [`ExtractError::Canceled`]
/// once `ctx` is cancelled.
#[async_trait]
pub trait BundleFetcher: Send + Sync + 'static {
    async fn fetch(&self, ctx: CancellationToken, image: &str) -> Result<Bundle, ExtractError>;
}

/// Concurrent extractor over pluggable index and bundle backends.
#[derive(Clone)]
pub struct Extractor {
    index: Arc<dyn IndexReader>,
    fetcher: Arc<dyn BundleFetcher>,
}

impl Extractor {
    pub fn new(index: Arc<dyn IndexReader>, fetcher: Arc<dyn BundleFetcher>) -> Self {
        Self { index, fetcher }
    }

    /// Extracts the bundles of one package.
    pub async fn extract_bundles(
        &self,
        index_image: &str,
        package: &str,
    ) -> Result<Vec<Bundle>, ExtractError> {
        let Some(index) = classify(index_image)? else {
            return Ok(Vec::new());
        };
        if package.is_empty() {
            tracing::error!(index_image, "refusing extraction with an empty package name");
            return Err(ExtractError::EmptyPackageName);
        }

        let images = self
            .index
            .bundle_images(&index, Some(package))
            .await
            .inspect_err(|e| tracing::error!(index_image, package, error = %e, "resolving bundle images failed"))?;

        self.fetch_all(images).await
    }

    /// Extracts the bundles of every package in the index.
    pub async fn extract_all_bundles(&self, index_image: &str) -> Result<Vec<Bundle>, ExtractError> {
        let Some(index) = classify(index_image)? else {
            return Ok(Vec::new());
        };

        let images = self
            .index
            .bundle_images(&index, None)
            .await
            .inspect_err(|e| tracing::error!(index_image, error = %e, "resolving bundle images failed"))?;

        self.fetch_all(images).await
    }

    async fn fetch_all(&self, images: Vec<String>) -> Result<Vec<Bundle>, ExtractError> {
        let token = CancellationToken::new();
        let mut slots: Vec<Option<Bundle>> = vec![None; images.len()];
        let mut set = JoinSet::new();

        for (i, image) in images.into_iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let token = token.clone();

            set.spawn(async move {
                let fetch = AssertUnwindSafe(fetcher.fetch(token.clone(), &image)).catch_unwind();
                let res = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ExtractError::Canceled),
                    res = fetch => res.unwrap_or_else(|payload| {
                        Err(ExtractError::TaskDied {
                            image: image.clone(),
                            info: crate::panic::message(&*payload),
                        })
                    }),
                };
                (i, res)
            });
        }

        let mut first: Option<ExtractError> = None;
        while let Some(joined) = set.join_next().await {
            let err = match joined {
                Ok((i, Ok(bundle))) => {
                    slots[i] = Some(bundle);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(_join) => ExtractError::Canceled,
            };
            if first.is_none() {
                token.cancel();
                first = Some(err);
            }
        }

        if let Some(err) = first {
            tracing::error!(error = %err, "bundle extraction failed");
            return Err(err);
        }
        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(ExtractError::Canceled)
    }
}

fn classify(index_image: &str) -> Result<Option<ImageRef>, ExtractError> {
    match classify_index_image(index_image) {
        Ok(IndexImage::Tagged(r)) => Ok(Some(r)),
        Ok(IndexImage::Tagless) => {
            tracing::info!(index_image, "skipping tagless image, nothing to extract");
            Ok(None)
        }
        Err(e) => {
            tracing::error!(index_image, error = %e, "invalid index image");
            Err(e)
        }
    }
}
