//! # Declarative rule filters.
//!
//! A [`RuleFilter`] selects the policy statements of a CSV that match a list of
//! [`AttributeFilter`]s. Every attribute filter names the rule attribute it
//! inspects, an [`Operator`] and its arguments; a rule matches when **all**
//! attribute filters pass (evaluation stops at the first miss).
//!
//! Operators, applied to the rule's attribute values `rule_args`:
//! ```text
//! IN              every arg is in rule_args        (rule_args ⊇ args)
//! NOT_IN          !IN
//! EQUAL           same length, equal once sorted   (order independent)
//! NOT_EQUAL       !EQUAL
//! EXISTS          rule_args is non-empty           (args ignored)
//! DOES_NOT_EXIST  rule_args is empty               (args ignored)
//! ANY             some arg is in rule_args
//! ```
//!
//! Every enumeration is closed. Unknown names are rejected when the filter is
//! parsed, so evaluation never fails.
//!
//! ## Example
//! ```rust
//! use bundlevisor::rbac::{Attribute, AttributeFilter, Operator, PermissionType, PolicyRule, RuleFilter};
//!
//! let wildcard_verbs = RuleFilter::new(
//!     PermissionType::ClusterScoped,
//!     vec![AttributeFilter::new(Attribute::Verbs, Operator::Any, ["*"])],
//! );
//!
//! let rule = PolicyRule { verbs: vec!["*".into()], ..Default::default() };
//! assert!(wildcard_verbs.run(&rule).is_some());
//!
//! let parsed = RuleFilter::from_json(
//!     r#"{"permissionType": "clusterScoped", "filters": [{"attribute": "verbs", "operator": "ANY", "args": ["*"]}]}"#,
//! ).unwrap();
//! assert_eq!(parsed, wildcard_verbs);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleFilterError;

use super::{CsvPermissions, Permission, PolicyRule};

/// Which statement groups a filter considers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionType {
    /// Cluster-scoped statements, then namespaced ones.
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "clusterScoped")]
    ClusterScoped,
    #[serde(rename = "namespaced")]
    Namespaced,
}

impl FromStr for PermissionType {
    type Err = RuleFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PermissionType::All),
            "clusterScoped" => Ok(PermissionType::ClusterScoped),
            "namespaced" => Ok(PermissionType::Namespaced),
            other => Err(RuleFilterError::PermissionType(other.to_string())),
        }
    }
}

/// Rule attribute inspected by an [`AttributeFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "apiGroups")]
    ApiGroups,
    #[serde(rename = "resources")]
    Resources,
    #[serde(rename = "resourceNames")]
    ResourceNames,
    #[serde(rename = "verbs")]
    Verbs,
    #[serde(rename = "nonResourceURLs")]
    NonResourceUrls,
}

impl Attribute {
    /// Values of this attribute on `rule`.
    pub fn select(self, rule: &PolicyRule) -> &[String] {
        match self {
            Attribute::ApiGroups => &rule.api_groups,
            Attribute::Resources => &rule.resources,
            Attribute::ResourceNames => &rule.resource_names,
            Attribute::Verbs => &rule.verbs,
            Attribute::NonResourceUrls => &rule.non_resource_urls,
        }
    }
}

impl FromStr for Attribute {
    type Err = RuleFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apiGroups" => Ok(Attribute::ApiGroups),
            "resources" => Ok(Attribute::Resources),
            "resourceNames" => Ok(Attribute::ResourceNames),
            "verbs" => Ok(Attribute::Verbs),
            "nonResourceURLs" => Ok(Attribute::NonResourceUrls),
            other => Err(RuleFilterError::Attribute(other.to_string())),
        }
    }
}

/// Comparison applied between a rule's attribute values and filter arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    In,
    NotIn,
    Equal,
    NotEqual,
    Exists,
    DoesNotExist,
    Any,
}

impl Operator {
    const NAMES: [(Operator, &'static str); 7] = [
        (Operator::In, "IN"),
        (Operator::NotIn, "NOT_IN"),
        (Operator::Equal, "EQUAL"),
        (Operator::NotEqual, "NOT_EQUAL"),
        (Operator::Exists, "EXISTS"),
        (Operator::DoesNotExist, "DOES_NOT_EXIST"),
        (Operator::Any, "ANY"),
    ];

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Equal => "EQUAL",
            Operator::NotEqual => "NOT_EQUAL",
            Operator::Exists => "EXISTS",
            Operator::DoesNotExist => "DOES_NOT_EXIST",
            Operator::Any => "ANY",
        }
    }

    /// Evaluates the operator. Total: every combination yields a boolean.
    pub fn eval(self, rule_args: &[String], args: &[String]) -> bool {
        match self {
            Operator::In => includes(rule_args, args),
            Operator::NotIn => !includes(rule_args, args),
            Operator::Equal => equal(rule_args, args),
            Operator::NotEqual => !equal(rule_args, args),
            Operator::Exists => !rule_args.is_empty(),
            Operator::DoesNotExist => rule_args.is_empty(),
            Operator::Any => intersects(rule_args, args),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = RuleFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(op, _)| *op)
            .ok_or_else(|| RuleFilterError::Operator(s.to_string()))
    }
}

/// Predicate over one attribute of a policy rule.
///
/// Stateless; one instance can be evaluated against any number of rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub attribute: Attribute,
    pub operator: Operator,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AttributeFilter {
    pub fn new<I, S>(attribute: Attribute, operator: Operator, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute,
            operator,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a filter from textual attribute and operator names.
    ///
    /// Unknown names are rejected here rather than at evaluation time.
    pub fn parse<I, S>(attribute: &str, operator: &str, args: I) -> Result<Self, RuleFilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(attribute.parse()?, operator.parse()?, args))
    }

    /// True if `rule` passes this filter.
    pub fn matches(&self, rule: &PolicyRule) -> bool {
        self.operator.eval(self.attribute.select(rule), &self.args)
    }
}

/// A permission scope plus a conjunction of attribute filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFilter {
    #[serde(default)]
    pub permission_type: PermissionType,
    #[serde(default)]
    pub filters: Vec<AttributeFilter>,
}

impl RuleFilter {
    pub fn new(permission_type: PermissionType, filters: Vec<AttributeFilter>) -> Self {
        Self {
            permission_type,
            filters,
        }
    }

    /// Decodes a declarative JSON filter, rejecting unknown names.
    pub fn from_json(document: &str) -> Result<Self, RuleFilterError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Statement groups in scope, cluster-scoped first for [`PermissionType::All`].
    pub fn relevant_permissions<'a>(
        &self,
        perms: &'a CsvPermissions,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        let none: &'a [Permission] = &[];
        let (cluster, namespaced) = match self.permission_type {
            PermissionType::All => (perms.cluster_permissions.as_slice(), perms.permissions.as_slice()),
            PermissionType::ClusterScoped => (perms.cluster_permissions.as_slice(), none),
            PermissionType::Namespaced => (none, perms.permissions.as_slice()),
        };
        cluster.iter().chain(namespaced.iter())
    }

    /// Returns `rule` if it passes every attribute filter, `None` otherwise.
    pub fn run<'r>(&self, rule: &'r PolicyRule) -> Option<&'r PolicyRule> {
        self.filters
            .iter()
            .all(|filter| filter.matches(rule))
            .then_some(rule)
    }
}

fn includes(items: &[String], required: &[String]) -> bool {
    let present: HashSet<&str> = items.iter().map(String::as_str).collect();
    required.iter().all(|item| present.contains(item.as_str()))
}

fn intersects(items: &[String], candidates: &[String]) -> bool {
    let present: HashSet<&str> = items.iter().map(String::as_str).collect();
    candidates.iter().any(|item| present.contains(item.as_str()))
}

fn equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
