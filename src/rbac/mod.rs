//! # RBAC policy statements and the rule-filter DSL.
//!
//! - [`CsvPermissions`], [`Permission`], [`PolicyRule`] - the statement model
//!   embedded in a bundle's ClusterServiceVersion;
//! - [`RuleFilter`], [`AttributeFilter`], [`Attribute`], [`Operator`],
//!   [`PermissionType`] - the predicate language validators use to query it.

mod filter;
mod permissions;

pub use filter::{Attribute, AttributeFilter, Operator, PermissionType, RuleFilter};
pub use permissions::{CsvPermissions, Permission, PolicyRule};
