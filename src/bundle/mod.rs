//! # Bundle model and validation input.

#[allow(clippy::module_inception)]
mod bundle;
mod input;

pub use bundle::{
    latest_bundle, Bundle, BundleAnnotations, ClusterServiceVersion, CsvSpec, InstallStrategy,
};
pub use input::{AddonMeta, ValidationInput};

#[cfg(test)]
pub(crate) use bundle::fixtures;
