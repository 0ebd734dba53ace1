//! # Validation input.
//!
//! [`ValidationInput`] is built once per run and shared read-only (through an
//! `Arc`) by every concurrently running validator.

use serde::{Deserialize, Serialize};

use crate::error::BundleError;

use super::{latest_bundle, Bundle};

/// Addon metadata relevant to validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonMeta {
    /// Addon identifier.
    #[serde(default)]
    pub id: String,
    /// Name of the operator package the addon installs.
    pub operator_name: String,
    /// Catalog image the bundles are resolved from.
    #[serde(default)]
    pub index_image: Option<String>,
}

/// Everything a validator may look at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationInput {
    pub meta: AddonMeta,
    /// Bundles in index order.
    pub bundles: Vec<Bundle>,
}

impl ValidationInput {
    pub fn new(meta: AddonMeta, bundles: Vec<Bundle>) -> Self {
        Self { meta, bundles }
    }

    /// See [`latest_bundle`].
    pub fn latest_bundle(&self) -> Result<Option<&Bundle>, BundleError> {
        latest_bundle(&self.bundles)
    }
}
