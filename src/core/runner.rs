//! # Runner: concurrent execution of the selected validators.
//!
//! One [`Runner::run`] call spawns one Tokio task (a *unit*) per selected
//! validator. A unit:
//! 1. waits for a concurrency permit when `max_concurrent > 0`, giving up
//!    with `Error(Canceled)` if the run token fires first;
//! 2. runs the decorated validator, catching panics;
//! 3. publishes exactly one verdict event (`ValidatorSucceeded`,
//!    `ValidatorFailed` or `ValidatorErrored`);
//! 4. sends exactly one result into a channel sized to the number of units,
//!    so sending never waits.
//!
//! Cancellation is caller-driven only: the runner never cancels the token it
//! is given and applies no timeout.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::{broadcast::error::RecvError, mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bundle::ValidationInput;
use crate::error::{CleanupError, ValidatorError};
use crate::events::{Bus, Event, EventKind};
use crate::filter::{self, Filter};
use crate::middleware::Middleware;
use crate::registry::Registry;
use crate::subscribers::SubscriberSet;
use crate::validator::{Descriptor, Status, ValidationResult, ValidatorRef};

use super::builder::RunnerBuilder;
use super::isolate::Isolated;
use super::stream::ResultStream;

/// Owns the instantiated validators and executes them.
pub struct Runner {
    validators: Vec<ValidatorRef>,
    middleware: Vec<Arc<dyn Middleware>>,
    semaphore: Option<Arc<Semaphore>>,
    bus: Bus,
    shutdown: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl Runner {
    /// Starts building a runner from a registry.
    pub fn builder(registry: Registry) -> RunnerBuilder {
        RunnerBuilder::new(registry)
    }

    pub(super) fn new_internal(
        validators: Vec<ValidatorRef>,
        middleware: Vec<Arc<dyn Middleware>>,
        semaphore: Option<Arc<Semaphore>>,
        bus: Bus,
        shutdown: CancellationToken,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            validators,
            middleware,
            semaphore,
            bus,
            shutdown,
            listener,
        }
    }

    /// Descriptors of every instantiated validator.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.validators.iter().map(|v| v.descriptor())
    }

    /// The runner's event bus; subscribe to observe runs directly.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs every validator accepted by `filter` (`None` accepts all).
    ///
    /// Must be called inside a Tokio runtime. `input` is shared read-only
    /// between all units.
    pub fn run(
        &self,
        token: &CancellationToken,
        input: Arc<ValidationInput>,
        filter: Option<&Filter>,
    ) -> ResultStream {
        let selected: Vec<ValidatorRef> = self
            .validators
            .iter()
            .filter(|v| {
                let keep = filter::accepts(filter, v.descriptor());
                if !keep {
                    self.bus.publish(
                        Event::new(EventKind::ValidatorSkipped)
                            .with_validator(v.descriptor().code().to_string()),
                    );
                }
                keep
            })
            .cloned()
            .collect();

        let (tx, rx) = mpsc::channel(selected.len().max(1));
        let stream = ResultStream::new(rx, selected.len());

        for v in selected {
            let unit = Unit {
                validator: self.decorate(v),
                token: token.clone(),
                input: Arc::clone(&input),
                semaphore: self.semaphore.clone(),
                bus: self.bus.clone(),
            };
            tokio::spawn(unit.run(tx.clone()));
        }

        stream
    }

    /// Calls `clean_up` on every validator and reports every failure.
    pub async fn clean_up(&self) -> Result<(), CleanupError> {
        let outcomes = join_all(self.validators.iter().map(|v| async move {
            (v.descriptor().code(), v.clean_up().await)
        }))
        .await;

        let mut failures: Vec<_> = outcomes
            .into_iter()
            .filter_map(|(code, res)| res.err().map(|e| (code, e)))
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        failures.sort_by_key(|(code, _)| *code);
        for (code, err) in &failures {
            self.bus.publish(
                Event::new(EventKind::CleanupFailed)
                    .with_validator(code.to_string())
                    .with_reason(err.to_string()),
            );
        }
        Err(CleanupError { failures })
    }

    /// Stops the subscriber listener after it has forwarded every pending event.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }
    }

    fn decorate(&self, v: ValidatorRef) -> ValidatorRef {
        let isolated: ValidatorRef = Arc::new(Isolated::new(v, self.bus.clone()));
        self.middleware
            .iter()
            .fold(isolated, |inner, m| m.wrap(inner, &self.bus))
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Unit {
    validator: ValidatorRef,
    token: CancellationToken,
    input: Arc<ValidationInput>,
    semaphore: Option<Arc<Semaphore>>,
    bus: Bus,
}

impl Unit {
    async fn run(self, tx: mpsc::Sender<ValidationResult>) {
        let desc = self.validator.descriptor();

        let result = match acquire(self.semaphore, &self.token).await {
            Err(cause) => desc.error(cause),
            Ok(_permit) => {
                let fut = self.validator.validate(self.token.clone(), &self.input);
                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => desc.error(ValidatorError::Panicked {
                        info: crate::panic::message(&*payload),
                    }),
                }
            }
        };

        self.bus.publish(verdict_event(&result));
        let _ = tx.send(result).await;
    }
}

async fn acquire(
    semaphore: Option<Arc<Semaphore>>,
    token: &CancellationToken,
) -> Result<Option<OwnedSemaphorePermit>, ValidatorError> {
    let Some(semaphore) = semaphore else {
        return Ok(None);
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ValidatorError::Canceled),
        permit = semaphore.acquire_owned() => permit.map(Some).map_err(|_closed| ValidatorError::Canceled),
    }
}

fn verdict_event(result: &ValidationResult) -> Event {
    let ev = match result.status() {
        Status::Success => Event::new(EventKind::ValidatorSucceeded),
        Status::Failure(messages) => {
            Event::new(EventKind::ValidatorFailed).with_reason(messages.join("; "))
        }
        Status::Error(e) => Event::new(EventKind::ValidatorErrored).with_reason(e.to_string()),
    };
    ev.with_validator(result.code().to_string())
}

/// Forwards bus events to the subscriber set until `shutdown` fires, then
/// drains what is already buffered and waits for the subscriber workers.
pub(super) fn spawn_listener(
    bus: &Bus,
    set: SubscriberSet,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::StreamExt;

    use crate::middleware::Retry;
    use crate::policies::{BackoffPolicy, RetryPolicy};
    use crate::subscribers::Subscribe;
    use crate::testing::{empty_input, failure, Scripted};
    use crate::validator::{Code, Stage};
    use crate::Config;

    fn registry(validators: Vec<Scripted>) -> Registry {
        validators.into_iter().fold(Registry::new(), |reg, v| {
            let v = v.into_ref();
            reg.register(move |_| Ok(Arc::clone(&v)))
        })
    }

    fn codes(list: &crate::ResultList) -> Vec<u32> {
        list.iter().map(|r| r.code().get()).collect()
    }

    #[tokio::test]
    async fn error_and_failure_are_isolated() {
        let runner = Runner::builder(registry(vec![
            Scripted::always(1, Status::Error(ValidatorError::execution("A broke"))),
            Scripted::always(2, failure("B says no")),
        ]))
        .build()
        .unwrap();

        let list = runner
            .run(&CancellationToken::new(), empty_input(), None)
            .collect_sorted()
            .await;

        assert_eq!(codes(&list), vec![1, 2]);
        assert!(list[0].is_error());
        assert_eq!(list[1].failure_messages(), Some(&["B says no".to_string()][..]));
        assert!(list.has_failure());
        assert_eq!(list.errors().len(), 1);
    }

    #[tokio::test]
    async fn filter_restricts_the_run() {
        let runner = Runner::builder(registry(vec![
            Scripted::always(1, Status::Success).with_stages(&[Stage::PreRelease]),
            Scripted::always(2, Status::Success).with_stages(&[Stage::PostRelease]),
            Scripted::always(3, Status::Success),
        ]))
        .build()
        .unwrap();
        let mut events = runner.bus().subscribe();

        let filter = Filter::stages([Stage::PostRelease]);
        let stream = runner.run(&CancellationToken::new(), empty_input(), Some(&filter));
        assert_eq!(stream.selected(), 2);

        let list = stream.collect_sorted().await;
        assert_eq!(codes(&list), vec![2, 3]);

        let skipped = events.recv().await.unwrap();
        assert_eq!(skipped.kind, EventKind::ValidatorSkipped);
        assert_eq!(skipped.validator.as_deref(), Some("AM0001"));
    }

    #[tokio::test]
    async fn empty_selection_ends_immediately() {
        let runner = Runner::builder(registry(vec![Scripted::always(1, Status::Success)]))
            .build()
            .unwrap();

        let filter = Filter::codes([Code::new(99).unwrap()]);
        let mut stream = runner.run(&CancellationToken::new(), empty_input(), Some(&filter));

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn panicking_validator_reports_error() {
        let runner = Runner::builder(registry(vec![
            Scripted::panicking(5),
            Scripted::always(6, Status::Success),
        ]))
        .build()
        .unwrap();

        let list = runner
            .run(&CancellationToken::new(), empty_input(), None)
            .collect_sorted()
            .await;

        assert!(matches!(
            list[0].error(),
            Some(ValidatorError::Panicked { .. })
        ));
        assert!(list[1].is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_limit_and_cancellation() {
        let runner = Runner::builder(registry(vec![
            Scripted::always(1, Status::Success).with_delay(Duration::from_secs(60)),
            Scripted::always(2, Status::Success).with_delay(Duration::from_secs(60)),
        ]))
        .with_config(Config {
            max_concurrent: 1,
            ..Config::default()
        })
        .build()
        .unwrap();

        let token = CancellationToken::new();
        let stream = runner.run(&token, empty_input(), None);

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        let list = stream.collect_sorted().await;
        assert_eq!(list.len(), 2);
        assert!(list
            .iter()
            .all(|r| r.error() == Some(&ValidatorError::Canceled)));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_middleware_is_applied() {
        let flaky = Arc::new(Scripted::new(
            4,
            vec![
                Status::Error(ValidatorError::execution("timeout")),
                Status::Success,
            ],
        ));
        let reg = {
            let flaky = Arc::clone(&flaky);
            Registry::new().register(move |_| Ok(flaky.clone() as ValidatorRef))
        };
        let runner = Runner::builder(reg)
            .with_middleware(Retry::new(RetryPolicy {
                max_attempts: 2,
                backoff: BackoffPolicy::constant(Duration::from_millis(10)),
            }))
            .build()
            .unwrap();

        let list = runner
            .run(&CancellationToken::new(), empty_input(), None)
            .collect_sorted()
            .await;

        assert!(list[0].is_success());
        assert_eq!(flaky.calls(), 2);
    }

    #[tokio::test]
    async fn clean_up_aggregates_failures_by_code() {
        let runner = Runner::builder(registry(vec![
            Scripted::always(8, Status::Success).failing_cleanup(ValidatorError::execution("rm -rf")),
            Scripted::always(1, Status::Success),
            Scripted::always(3, Status::Success).failing_cleanup(ValidatorError::fatal("busy")),
        ]))
        .build()
        .unwrap();

        let err = runner.clean_up().await.unwrap_err();
        let failed: Vec<u32> = err.failures.iter().map(|(c, _)| c.get()).collect();
        assert_eq!(failed, vec![3, 8]);
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
    }

    #[tokio::test]
    async fn subscribers_receive_lifecycle_events() {
        let recorder = Arc::new(Recorder::default());
        let runner = Runner::builder(registry(vec![Scripted::always(1, failure("nope"))]))
            .with_subscribers(vec![Arc::clone(&recorder) as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        runner
            .run(&CancellationToken::new(), empty_input(), None)
            .collect_sorted()
            .await;
        runner.shutdown().await;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![EventKind::ValidatorStarting, EventKind::ValidatorFailed]
        );
    }

    #[derive(Default)]
    struct AlwaysPanics(AtomicUsize);

    #[async_trait]
    impl Subscribe for AlwaysPanics {
        async fn on_event(&self, _ev: &Event) {
            self.0.fetch_add(1, AtomicOrdering::SeqCst);
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "always-panics"
        }
    }

    #[tokio::test]
    async fn panicking_subscriber_does_not_feed_itself() {
        let bomb = Arc::new(AlwaysPanics::default());
        let recorder = Arc::new(Recorder::default());
        let runner = Runner::builder(registry(vec![Scripted::always(1, Status::Success)]))
            .with_subscribers(vec![
                Arc::clone(&bomb) as Arc<dyn Subscribe>,
                Arc::clone(&recorder) as Arc<dyn Subscribe>,
            ])
            .build()
            .unwrap();

        runner
            .run(&CancellationToken::new(), empty_input(), None)
            .collect_sorted()
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        runner.shutdown().await;

        assert_eq!(bomb.0.load(AtomicOrdering::SeqCst), 2);
        let seen = recorder.0.lock().unwrap();
        let panics = seen
            .iter()
            .filter(|k| **k == EventKind::SubscriberPanicked)
            .count();
        assert!(panics <= 2, "{panics} panic reports for 2 events");
    }
}
