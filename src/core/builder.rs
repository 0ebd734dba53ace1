use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::BuildError;
use crate::events::Bus;
use crate::middleware::{Middleware, Retry};
use crate::registry::{Dependencies, Registry};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::runner::{self, Runner};

/// Builder for a [`Runner`].
///
/// ```rust
/// use bundlevisor::{validators, Config, Dependencies, Runner};
///
/// let runner = Runner::builder(validators::registry())
///     .with_config(Config { max_concurrent: 4, ..Config::default() })
///     .with_dependencies(Dependencies::new())
///     .with_retry()
///     .build()
///     .expect("reference validators build");
///
/// assert_eq!(runner.descriptors().count(), 2);
/// ```
pub struct RunnerBuilder {
    registry: Registry,
    cfg: Config,
    deps: Dependencies,
    middleware: Vec<Arc<dyn Middleware>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RunnerBuilder {
    pub(super) fn new(registry: Registry) -> Self {
        Self {
            registry,
            cfg: Config::default(),
            deps: Dependencies::new(),
            middleware: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Shared clients and settings handed to every constructor.
    pub fn with_dependencies(mut self, deps: Dependencies) -> Self {
        self.deps = deps;
        self
    }

    /// Appends a decorator; earlier entries wrap closer to the validator.
    pub fn with_middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends [`Retry`] using the retry policy of the config set so far.
    pub fn with_retry(self) -> Self {
        let retry = Retry::new(self.cfg.retry);
        self.with_middleware(retry)
    }

    /// Event subscribers; they receive events through dedicated workers.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Instantiates the validators and wires the runtime.
    ///
    /// Needs a Tokio runtime when subscribers are configured (their workers
    /// are spawned here).
    pub fn build(self) -> Result<Runner, BuildError> {
        let validators = self.registry.build(&self.deps)?;
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let semaphore = self
            .cfg
            .concurrency_limit()
            .map(Semaphore::new)
            .map(Arc::new);

        let shutdown = CancellationToken::new();
        let listener = (!self.subscribers.is_empty()).then(|| {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            runner::spawn_listener(&bus, set, shutdown.clone())
        });

        tracing::debug!(
            validators = validators.len(),
            max_concurrent = self.cfg.max_concurrent,
            middleware = self.middleware.len(),
            "runner built"
        );

        Ok(Runner::new_internal(
            validators,
            self.middleware,
            semaphore,
            bus,
            shutdown,
            listener,
        ))
    }
}
