//! AM0007: the latest bundle must not grant cluster-wide wildcards.
//!
//! The forbidden patterns are rule filters; callers can replace the default
//! set by inserting [`ForbiddenRules`] into the [`Dependencies`].

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundle::ValidationInput;
use crate::error::{RuleFilterError, ValidatorError};
use crate::rbac::{Attribute, AttributeFilter, Operator, PermissionType, PolicyRule, RuleFilter};
use crate::registry::Dependencies;
use crate::validator::{Code, Descriptor, Stage, ValidationResult, Validator, ValidatorRef};

const CODE: u32 = 7;
const NAME: &str = "csv_permissions";
const DESC: &str = "Ensure the latest bundle grants no wildcard verbs or resources cluster-wide.";

/// A labelled rule pattern that must not match any rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForbiddenRule {
    pub label: Cow<'static, str>,
    pub filter: RuleFilter,
}

impl ForbiddenRule {
    pub fn new(label: impl Into<Cow<'static, str>>, filter: RuleFilter) -> Self {
        Self {
            label: label.into(),
            filter,
        }
    }

    /// Builds a pattern from a JSON rule-filter document.
    pub fn from_json(
        label: impl Into<Cow<'static, str>>,
        document: &str,
    ) -> Result<Self, RuleFilterError> {
        Ok(Self::new(label, RuleFilter::from_json(document)?))
    }
}

/// Patterns checked by AM0007.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForbiddenRules(pub Vec<ForbiddenRule>);

impl Default for ForbiddenRules {
    /// Wildcard verbs and wildcard resources in cluster-scoped rules.
    fn default() -> Self {
        let wildcard = |attribute| {
            RuleFilter::new(
                PermissionType::ClusterScoped,
                vec![AttributeFilter::new(attribute, Operator::In, ["*"])],
            )
        };
        Self(vec![
            ForbiddenRule::new("wildcard verbs", wildcard(Attribute::Verbs)),
            ForbiddenRule::new("wildcard resources", wildcard(Attribute::Resources)),
        ])
    }
}

pub struct ClusterWildcards {
    desc: Descriptor,
    forbidden: Arc<ForbiddenRules>,
}

impl ClusterWildcards {
    pub fn new(deps: &Dependencies) -> Result<ValidatorRef, ValidatorError> {
        let code = Code::new(CODE).map_err(ValidatorError::fatal)?;
        let forbidden = deps
            .get::<ForbiddenRules>()
            .unwrap_or_else(|| Arc::new(ForbiddenRules::default()));

        Ok(Arc::new(Self {
            desc: Descriptor::new(code, NAME, DESC).with_stages([Stage::PreRelease]),
            forbidden,
        }))
    }
}

#[async_trait]
impl Validator for ClusterWildcards {
    fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    async fn validate(&self, _ctx: CancellationToken, input: &ValidationInput) -> ValidationResult {
        let latest = match input.latest_bundle() {
            Ok(Some(bundle)) => bundle,
            Ok(None) => return self.desc.success(),
            Err(e) => return self.desc.error(ValidatorError::fatal(e)),
        };
        let perms = latest.permissions();

        let mut offending: Vec<(&PolicyRule, Vec<&str>)> = Vec::new();
        for forbidden in &self.forbidden.0 {
            for rule in perms.filter_rules(&forbidden.filter) {
                match offending.iter_mut().find(|(seen, _)| std::ptr::eq(*seen, rule)) {
                    Some((_, labels)) => labels.push(&*forbidden.label),
                    None => offending.push((rule, vec![&*forbidden.label])),
                }
            }
        }

        let id = latest.name_version();
        self.desc.fail(offending.into_iter().map(|(rule, labels)| {
            format!("bundle '{id}' grants {} in rule {}", labels.join(" and "), describe(rule))
        }))
    }
}

fn describe(rule: &PolicyRule) -> String {
    format!(
        "apiGroups={:?} resources={:?} verbs={:?}",
        rule.api_groups, rule.resources, rule.verbs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{fixtures, AddonMeta, Bundle};
    use crate::rbac::Permission;

    fn rule(groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        PolicyRule {
            api_groups: owned(groups),
            resources: owned(resources),
            verbs: owned(verbs),
            ..PolicyRule::default()
        }
    }

    fn bundle(version: &str, cluster: Vec<PolicyRule>, namespaced: Vec<PolicyRule>) -> Bundle {
        let mut b = fixtures::bundle("reference-addon", version);
        b.csv.spec.install.spec.cluster_permissions = vec![Permission {
            service_account_name: "operator".into(),
            rules: cluster,
        }];
        b.csv.spec.install.spec.permissions = vec![Permission {
            service_account_name: "operator".into(),
            rules: namespaced,
        }];
        b
    }

    async fn run(deps: &Dependencies, bundles: Vec<Bundle>) -> ValidationResult {
        let v = ClusterWildcards::new(deps).unwrap();
        let input = ValidationInput::new(AddonMeta::default(), bundles);
        v.validate(CancellationToken::new(), &input).await
    }

    #[tokio::test]
    async fn one_message_per_offending_rule() {
        let latest = bundle(
            "1.2.0",
            vec![
                rule(&[""], &["pods"], &["get", "list"]),
                rule(&["apps"], &["*"], &["*"]),
                rule(&[""], &["secrets"], &["*"]),
            ],
            vec![rule(&[""], &["*"], &["*"])],
        );

        let res = run(&Dependencies::new(), vec![latest]).await;

        let messages = res.failure_messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("wildcard verbs and wildcard resources"));
        assert!(messages[0].contains(r#"apiGroups=["apps"]"#));
        assert!(messages[1].contains("grants wildcard verbs in rule"));
        assert!(messages[1].contains(r#"resources=["secrets"]"#));
    }

    #[tokio::test]
    async fn only_the_latest_bundle_is_inspected() {
        let old = bundle("1.0.0", vec![rule(&[""], &["*"], &["*"])], vec![]);
        let latest = bundle("1.2.0", vec![rule(&[""], &["pods"], &["get"])], vec![]);

        let res = run(&Dependencies::new(), vec![old, latest]).await;
        assert!(res.is_success());
    }

    #[tokio::test]
    async fn forbidden_patterns_come_from_dependencies() {
        let rules = ForbiddenRules(vec![ForbiddenRule::from_json(
            "secret access",
            r#"{"permissionType":"all","filters":[{"attribute":"resources","operator":"ANY","args":["secrets"]}]}"#,
        )
        .unwrap()]);
        let deps = Dependencies::new().with(rules);

        let latest = bundle("1.0.0", vec![], vec![rule(&[""], &["secrets"], &["get"])]);
        let res = run(&deps, vec![latest]).await;

        assert_eq!(res.failure_messages().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unparsable_versions_are_errors() {
        let mut broken = bundle("1.0.0", vec![], vec![]);
        broken.csv.spec.version = "one".into();

        let res = run(&Dependencies::new(), vec![broken]).await;
        assert!(res.is_error());
    }
}
