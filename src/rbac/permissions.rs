//! # Policy statements embedded in a ClusterServiceVersion.
//!
//! Mirrors the `clusterPermissions` / `permissions` blocks of a CSV install
//! strategy: each block binds a service account to a list of RBAC rules.

use serde::{Deserialize, Serialize};

use super::RuleFilter;

/// One RBAC policy statement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub resource_names: Vec<String>,
    #[serde(default, rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

/// Rules granted to one service account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub service_account_name: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Cluster-scoped and namespaced statement groups of a CSV.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPermissions {
    #[serde(default)]
    pub cluster_permissions: Vec<Permission>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl CsvPermissions {
    /// Returns every rule, in scope for `filter`, that passes all its attribute filters.
    ///
    /// Order follows [`RuleFilter::relevant_permissions`], then rule order.
    pub fn filter_rules<'a>(&'a self, filter: &RuleFilter) -> Vec<&'a PolicyRule> {
        filter
            .relevant_permissions(self)
            .flat_map(|perm| perm.rules.iter())
            .filter_map(|rule| filter.run(rule))
            .collect()
    }
}
