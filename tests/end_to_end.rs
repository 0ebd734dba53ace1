use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use bundlevisor::rbac::{Permission, PolicyRule};
use bundlevisor::{
    filter, validators, AddonMeta, BackoffPolicy, Bundle, BundleAnnotations, BundleFetcher,
    ClusterServiceVersion, Code, Config, CsvSpec, Descriptor, ExtractError, Extractor, ImageRef,
    IndexReader, Registry, RetryPolicy, RunOutcome, Runner, ValidationInput, ValidationResult,
    Validator, ValidatorError,
};

const INDEX: &str = "quay.io/osd-addons/reference-addon-index:v1.2.0";

struct Catalog(HashMap<&'static str, Vec<&'static str>>);

#[async_trait]
impl IndexReader for Catalog {
    async fn bundle_images(
        &self,
        index: &ImageRef,
        package: Option<&str>,
    ) -> Result<Vec<String>, ExtractError> {
        assert_eq!(index.tag.as_deref(), Some("v1.2.0"));
        let images = match package {
            Some(pkg) => self.0.get(pkg).cloned().unwrap_or_default(),
            None => self.0.values().flatten().copied().collect(),
        };
        Ok(images.into_iter().map(String::from).collect())
    }
}

/// Serves `<operator>:<version>` images, slower for older versions.
struct ImageStore;

#[async_trait]
impl BundleFetcher for ImageStore {
    async fn fetch(&self, ctx: CancellationToken, image: &str) -> Result<Bundle, ExtractError> {
        let (operator, version) = image.split_once(':').ok_or_else(|| ExtractError::Fetch {
            image: image.into(),
            error: "no tag".into(),
        })?;
        let delay = if version.starts_with("1.0") { 30 } else { 5 };
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            _ = ctx.cancelled() => return Err(ExtractError::Canceled),
        }
        if version == "broken" {
            return Err(ExtractError::Fetch {
                image: image.into(),
                error: "manifest unknown".into(),
            });
        }
        Ok(bundle(operator, version))
    }
}

fn bundle(operator: &str, version: &str) -> Bundle {
    let wildcard = PolicyRule {
        api_groups: vec!["".into()],
        resources: vec!["*".into()],
        verbs: vec!["get".into()],
        ..PolicyRule::default()
    };
    let mut spec = CsvSpec {
        version: version.into(),
        ..CsvSpec::default()
    };
    spec.install.spec.cluster_permissions = vec![Permission {
        service_account_name: "operator".into(),
        rules: if version == "1.2.0" { vec![wildcard] } else { vec![] },
    }];
    Bundle {
        name: format!("{operator}-bundle"),
        image: Some(format!("{operator}:{version}")),
        annotations: BundleAnnotations {
            package_name: operator.into(),
            ..BundleAnnotations::default()
        },
        csv: ClusterServiceVersion {
            name: format!("{operator}.v{version}"),
            spec,
        },
    }
}

fn extractor(images: Vec<&'static str>) -> Extractor {
    let catalog = Catalog(HashMap::from([("reference-addon", images)]));
    Extractor::new(Arc::new(catalog), Arc::new(ImageStore))
}

struct Fixed {
    desc: Descriptor,
    result: fn(&Descriptor) -> ValidationResult,
}

#[async_trait]
impl Validator for Fixed {
    fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    async fn validate(&self, _ctx: CancellationToken, _input: &ValidationInput) -> ValidationResult {
        (self.result)(&self.desc)
    }
}

fn fixed(code: u32, result: fn(&Descriptor) -> ValidationResult) -> Registry {
    Registry::new().register(move |_| {
        let code = Code::new(code).map_err(ValidatorError::fatal)?;
        Ok(Arc::new(Fixed {
            desc: Descriptor::new(code, format!("fixed_{code}"), "fixed outcome"),
            result,
        }) as _)
    })
}

#[tokio::test]
async fn extraction_preserves_index_order() {
    let bundles = extractor(vec![
        "reference-addon:1.0.0",
        "reference-addon:1.1.0",
        "reference-addon:1.2.0",
    ])
    .extract_bundles(INDEX, "reference-addon")
    .await
    .unwrap();

    let versions: Vec<&str> = bundles.iter().map(|b| b.csv.spec.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0", "1.1.0", "1.2.0"]);
}

#[tokio::test]
async fn extraction_is_all_or_nothing() {
    let err = extractor(vec![
        "reference-addon:1.0.0",
        "reference-addon:broken",
        "reference-addon:1.2.0",
    ])
    .extract_all_bundles(INDEX)
    .await
    .unwrap_err();

    assert_eq!(err.as_label(), "extract_fetch");
}

#[tokio::test]
async fn tagless_index_validates_nothing_but_passes() {
    let bundles = extractor(vec!["reference-addon:1.0.0"])
        .extract_bundles("quay.io/osd-addons/reference-addon-index", "reference-addon")
        .await
        .unwrap();
    assert!(bundles.is_empty());
}

#[tokio::test]
async fn extract_validate_report() {
    let bundles = extractor(vec!["reference-addon:1.0.0", "reference-addon:1.2.0"])
        .extract_bundles(INDEX, "reference-addon")
        .await
        .unwrap();
    let input = Arc::new(ValidationInput::new(
        AddonMeta {
            id: "reference-addon".into(),
            operator_name: "reference-addon".into(),
            index_image: Some(INDEX.into()),
        },
        bundles,
    ));

    let registry = validators::registry()
        .merge(fixed(1, |d| d.error(ValidatorError::execution("registry down"))))
        .merge(fixed(2, |d| d.fail(["B is unhappy"])))
        .merge(fixed(9, |d| d.success()));

    let runner = Runner::builder(registry)
        .with_config(Config {
            max_concurrent: 2,
            retry: RetryPolicy {
                max_attempts: 2,
                backoff: BackoffPolicy::constant(Duration::from_millis(1)),
            },
            ..Config::default()
        })
        .with_retry()
        .build()
        .unwrap();

    let selection = filter::select("AM0009", "", "").unwrap();
    let results = runner
        .run(&CancellationToken::new(), input, selection.as_ref())
        .collect_sorted()
        .await;
    runner.clean_up().await.unwrap();

    let codes: Vec<String> = results.iter().map(|r| r.code().to_string()).collect();
    assert_eq!(codes, vec!["AM0001", "AM0002", "AM0003", "AM0007"]);

    assert!(results[0].is_error());
    assert!(results[1].is_failure());
    assert!(results[2].is_success());
    assert_eq!(results[3].failure_messages().map(|m| m.len()), Some(1));

    assert!(results.has_failure());
    assert_eq!(results.errors().len(), 1);
    assert_eq!(results.outcome(), RunOutcome::Errored);
    assert_eq!(results.outcome().exit_code(), 2);

    let rows = results.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].message, "execution failed: registry down");
    assert_eq!(rows[2].message, "None");

    let table = results.table().to_string();
    assert!(table.lines().next().unwrap().starts_with("STATUS"));
}
