//! Reference validators and the registry that assembles them.
//!
//! | code   | name            | checks                                              |
//! |--------|-----------------|-----------------------------------------------------|
//! | AM0003 | operator_name   | CSV name/replaces and package match the operator    |
//! | AM0007 | csv_permissions | no cluster-wide wildcard grants in the latest bundle |

mod csv_permissions;
mod operator_name;

pub use csv_permissions::{ClusterWildcards, ForbiddenRule, ForbiddenRules};
pub use operator_name::OperatorName;

use crate::registry::Registry;

/// Registry holding every reference validator.
pub fn registry() -> Registry {
    Registry::new()
        .register(OperatorName::new)
        .register(ClusterWildcards::new)
}
