//! AM0003: bundle names agree with the addon's operator name.
//!
//! For every bundle:
//! - `csv.name` must be `<operatorName>.<semver>`;
//! - `csv.replaces`, when set, must be `<operatorName>.<semver>` too;
//! - the package annotation must equal the operator name.
//!
//! All violations across all bundles are joined into one failure message.
//! Versions follow Go module semver: a leading `v` is optional and the
//! `v1`/`v1.2` shorthands are accepted. A bundle whose name or version cannot
//! be read yields an `Error` result instead of a verdict.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundle::{Bundle, ValidationInput};
use crate::error::ValidatorError;
use crate::registry::Dependencies;
use crate::validator::{Code, Descriptor, ValidationResult, Validator, ValidatorRef};

const CODE: u32 = 3;
const NAME: &str = "operator_name";
const DESC: &str =
    "Validate the operatorName matches csv.name, csv.replaces and bundle package annotation.";

pub struct OperatorName {
    desc: Descriptor,
}

impl OperatorName {
    pub fn new(_deps: &Dependencies) -> Result<ValidatorRef, ValidatorError> {
        let code = Code::new(CODE).map_err(ValidatorError::fatal)?;
        Ok(Arc::new(Self {
            desc: Descriptor::new(code, NAME, DESC),
        }))
    }
}

#[async_trait]
impl Validator for OperatorName {
    fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    async fn validate(&self, _ctx: CancellationToken, input: &ValidationInput) -> ValidationResult {
        let operator = input.meta.operator_name.as_str();
        let mut violations = Vec::new();

        for bundle in &input.bundles {
            if let Err(e) = readable(bundle) {
                return self.desc.error(ValidatorError::fatal(format!(
                    "could not get bundle name and version: {e}"
                )));
            }
            let id = bundle.name_version();

            if let Some(msg) = check_name(&bundle.csv.name, operator) {
                violations.push(format!("bundle {id} failed validation on csv.name: {msg}."));
            }

            if let Some(replaces) = bundle.csv.spec.replaces.as_deref().filter(|r| !r.is_empty()) {
                if let Some(msg) = check_name(replaces, operator) {
                    violations.push(format!(
                        "bundle '{id}' failed validation on csv.replaces: {msg}"
                    ));
                }
            }

            if bundle.package_name() != operator {
                violations.push(format!(
                    "bundle '{id}' package annotation does not match operatorName '{operator}'"
                ));
            }
        }

        if violations.is_empty() {
            self.desc.success()
        } else {
            self.desc.fail([violations.join(", ")])
        }
    }
}

/// Checks `<operator>.<semver>`; returns the problem, if any.
fn check_name(field: &str, operator: &str) -> Option<String> {
    let Some((name, version)) = field.split_once('.') else {
        return Some(format!("could not split '{field}' in two parts"));
    };
    if name != operator {
        return Some(format!(
            "invalid operatorName for '{field}', should match '{operator}'"
        ));
    }
    if !is_valid_semver(version) {
        return Some(format!("invalid semver '{field}'"));
    }
    None
}

/// Name and version must be present and the version must parse.
fn readable(bundle: &Bundle) -> Result<(), String> {
    if bundle.csv.name.is_empty() {
        return Err(format!("bundle {:?} has an empty csv.name", bundle.name));
    }
    bundle.version().map(drop).map_err(|e| e.to_string())
}

/// Full semver, or the `MAJOR` / `MAJOR.MINOR` shorthand; `v` prefix optional.
fn is_valid_semver(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    if semver::Version::parse(version).is_ok() {
        return true;
    }
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() < 3 && parts.iter().all(|p| is_numeric_identifier(p))
}

fn is_numeric_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{fixtures, AddonMeta};
    use crate::validator::Status;

    fn input(operator: &str, bundles: Vec<Bundle>) -> ValidationInput {
        ValidationInput::new(
            AddonMeta {
                operator_name: operator.to_string(),
                ..AddonMeta::default()
            },
            bundles,
        )
    }

    async fn run(input: &ValidationInput) -> ValidationResult {
        let v = OperatorName::new(&Dependencies::new()).unwrap();
        v.validate(CancellationToken::new(), input).await
    }

    #[test]
    fn name_checks() {
        assert_eq!(check_name("reference-addon.v1.2.3", "reference-addon"), None);
        assert_eq!(check_name("reference-addon.1.2.3", "reference-addon"), None);
        assert!(check_name("reference-addon", "reference-addon")
            .unwrap()
            .contains("could not split"));
        assert!(check_name("other.v1.0.0", "reference-addon")
            .unwrap()
            .contains("should match 'reference-addon'"));
        assert!(check_name("reference-addon.latest", "reference-addon")
            .unwrap()
            .contains("invalid semver"));
    }

    #[test]
    fn major_and_minor_shorthands_are_valid() {
        assert_eq!(check_name("reference-addon.v1", "reference-addon"), None);
        assert_eq!(check_name("reference-addon.v1.2", "reference-addon"), None);
        assert_eq!(check_name("reference-addon.1.2", "reference-addon"), None);

        for bad in ["v1.2-rc.1", "v01.2", "v1.", "v", "v1.2.3.4"] {
            assert!(!is_valid_semver(bad), "{bad} accepted");
        }
        assert!(is_valid_semver("v1.2.3-rc.1+build.5"));
    }

    #[tokio::test]
    async fn unreadable_bundle_data_is_an_error() {
        let mut no_version = fixtures::bundle("reference-addon", "1.0.0");
        no_version.csv.spec.version = String::new();

        let res = run(&input("reference-addon", vec![no_version])).await;
        assert!(res.is_error());

        let mut no_name = fixtures::bundle("reference-addon", "1.0.0");
        no_name.csv.name = String::new();

        let res = run(&input("reference-addon", vec![no_name])).await;
        assert!(matches!(
            res.status(),
            Status::Error(ValidatorError::Fatal { error }) if error.contains("empty csv.name")
        ));
    }

    #[tokio::test]
    async fn matching_bundles_succeed() {
        let mut second = fixtures::bundle("reference-addon", "1.1.0");
        second.csv.spec.replaces = Some("reference-addon.v1.0.0".into());

        let res = run(&input(
            "reference-addon",
            vec![fixtures::bundle("reference-addon", "1.0.0"), second],
        ))
        .await;

        assert!(res.is_success());
    }

    #[tokio::test]
    async fn violations_are_joined_into_one_message() {
        let mut bundle = fixtures::bundle("reference-addon", "1.0.0");
        bundle.csv.spec.replaces = Some("reference-addon.next".into());
        bundle.annotations.package_name = "ref".into();

        let res = run(&input("reference-addon", vec![bundle])).await;

        let messages = res.failure_messages().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            "bundle 'reference-addon-bundle:1.0.0' failed validation on csv.replaces: \
             invalid semver 'reference-addon.next', \
             bundle 'reference-addon-bundle:1.0.0' package annotation does not match \
             operatorName 'reference-addon'"
        );
    }

    #[tokio::test]
    async fn no_bundles_is_success() {
        assert!(run(&input("reference-addon", vec![])).await.is_success());
    }
}
