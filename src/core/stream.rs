//! # Stream of validation results produced by one run.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::validator::{ResultList, ValidationResult};

/// Results of one [`Runner::run`](crate::Runner::run), in completion order.
///
/// Yields exactly one item per selected validator, then ends. Dropping the
/// stream early does not cancel the run; cancel the run token for that.
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<ValidationResult>,
    selected: usize,
}

impl ResultStream {
    pub(super) fn new(rx: mpsc::Receiver<ValidationResult>, selected: usize) -> Self {
        Self { rx, selected }
    }

    /// Number of validators that passed the filter for this run.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Receives the next result, `None` once every validator has reported.
    pub async fn recv(&mut self) -> Option<ValidationResult> {
        self.rx.recv().await
    }

    /// Drains the stream into a list sorted by code.
    pub async fn collect_sorted(self) -> ResultList {
        let mut list: ResultList = self.collect().await;
        list.sort();
        list
    }
}

impl Stream for ResultStream {
    type Item = ValidationResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.selected))
    }
}
