//! # Operator bundles.
//!
//! A [`Bundle`] is one released version of an operator package: its
//! annotations and its ClusterServiceVersion (CSV). The model keeps only what
//! the engine and the reference validators read; field names follow the
//! Kubernetes manifests so bundles deserialize straight from them.

use serde::{Deserialize, Serialize};

use crate::error::BundleError;
use crate::rbac::CsvPermissions;

/// One operator package version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Bundle name as published in the index.
    pub name: String,
    /// Image the bundle was fetched from, if known.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub annotations: BundleAnnotations,
    pub csv: ClusterServiceVersion,
}

/// `metadata/annotations.yaml` of a bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleAnnotations {
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub default_channel: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    /// `metadata.name`, conventionally `<operator>.v<version>`.
    pub name: String,
    pub spec: CsvSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSpec {
    pub version: String,
    #[serde(default)]
    pub replaces: Option<String>,
    #[serde(default)]
    pub install: InstallStrategy,
}

/// Install strategy; `spec` embeds the policy-statement document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallStrategy {
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub spec: CsvPermissions,
}

impl Bundle {
    /// Parses the CSV version as semver. A leading `v` is accepted.
    pub fn version(&self) -> Result<semver::Version, BundleError> {
        let raw = self.csv.spec.version.as_str();
        semver::Version::parse(raw.strip_prefix('v').unwrap_or(raw)).map_err(|e| {
            BundleError::InvalidVersion {
                bundle: self.name.clone(),
                version: raw.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Package name from the bundle annotations.
    #[inline]
    pub fn package_name(&self) -> &str {
        &self.annotations.package_name
    }

    /// Policy statements embedded in the CSV.
    #[inline]
    pub fn permissions(&self) -> &CsvPermissions {
        &self.csv.spec.install.spec
    }

    /// `"<name>:<version>"`, used to identify the bundle in messages.
    pub fn name_version(&self) -> String {
        format!("{}:{}", self.name, self.csv.spec.version)
    }
}

/// Returns the bundle with the greatest semantic version.
///
/// `None` for an empty slice. Ties keep the earliest bundle. Any unparsable
/// version is an error: the latest bundle cannot be decided.
pub fn latest_bundle(bundles: &[Bundle]) -> Result<Option<&Bundle>, BundleError> {
    let mut latest: Option<(&Bundle, semver::Version)> = None;
    for bundle in bundles {
        let version = bundle.version()?;
        let newer = match &latest {
            Some((_, best)) => version > *best,
            None => true,
        };
        if newer {
            latest = Some((bundle, version));
        }
    }
    Ok(latest.map(|(bundle, _)| bundle))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal bundle for `operator` at `version`.
    pub fn bundle(operator: &str, version: &str) -> Bundle {
        Bundle {
            name: format!("{operator}-bundle"),
            image: None,
            annotations: BundleAnnotations {
                package_name: operator.to_string(),
                ..Default::default()
            },
            csv: ClusterServiceVersion {
                name: format!("{operator}.v{version}"),
                spec: CsvSpec {
                    version: version.to_string(),
                    ..Default::default()
                },
            },
        }
    }
}
