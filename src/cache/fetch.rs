//! Concurrent Fetch
//!
//! Fan-out of a request batch with a shared deadline.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::channel::{self, RecvTimeoutError};

use crate::config::FetchConfig;
use crate::error::{GzkvError, Result};

use super::client::HttpClient;
use super::request::Request;
use super::response::Response;

/// Results of a batch: partial success is the normal case
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub responses: Vec<Response>,
    pub errors: Vec<GzkvError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A finished unit of work
struct Completion {
    index: usize,
    result: Result<Response>,
}

/// Perform every request concurrently and collect what finishes in time.
///
/// Spawns one thread per request with no upper bound: very large batches
/// spawn as many threads, so callers should chunk them.
///
/// The whole batch shares one deadline of `per_request_timeout * N`. A
/// result already queued is always taken before the deadline is checked.
/// Once the deadline passes, results already queued are still collected and
/// every request left outstanding is reported as `RequestTimeout`; its
/// thread keeps running and its result is discarded. Each request ends up
/// in exactly one of `responses` or `errors`.
pub fn fetch_all(
    requests: Vec<Request>,
    client: Arc<dyn HttpClient>,
    config: &FetchConfig,
) -> FetchOutcome {
    let total = requests.len();
    let mut outcome = FetchOutcome::default();
    if total == 0 {
        return outcome;
    }

    // Sized to the batch so workers never block on send
    let (tx, rx) = channel::bounded::<Completion>(total);

    // URL of every request not yet accounted for
    let mut pending: Vec<Option<String>> = Vec::with_capacity(total);
    let mut dispatched = 0usize;

    for (index, request) in requests.into_iter().enumerate() {
        let url = request.url.clone();
        pending.push(Some(url.clone()));

        let tx = tx.clone();
        let client = Arc::clone(&client);
        let spawned = thread::Builder::new()
            .name(format!("gzkv-fetch-{}", index))
            .spawn(move || {
                let result = client.execute(&request);
                // The collector may have stopped listening after a timeout
                let _ = tx.send(Completion { index, result });
            });

        match spawned {
            Ok(_) => dispatched += 1,
            Err(e) => {
                pending[index] = None;
                outcome.errors.push(GzkvError::RequestFailed {
                    url,
                    reason: format!("could not spawn worker: {}", e),
                });
            }
        }
    }
    drop(tx);

    let budget = config.budget(total);
    let deadline = Instant::now().checked_add(budget);
    tracing::debug!("Dispatched {} requests, budget {:?}", dispatched, budget);

    let mut received = 0usize;
    while received < dispatched {
        let next = match deadline {
            Some(deadline) => rx.recv_deadline(deadline),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match next {
            Ok(completion) => {
                received += 1;
                record(&mut outcome, &mut pending, completion);
            }
            Err(RecvTimeoutError::Timeout) => {
                // Results that raced the deadline still count
                while let Ok(completion) = rx.try_recv() {
                    record(&mut outcome, &mut pending, completion);
                }
                for url in pending.iter_mut().filter_map(Option::take) {
                    tracing::warn!("Request to '{}' timed out after {:?}", url, budget);
                    outcome.errors.push(GzkvError::RequestTimeout { url, after: budget });
                }
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Every sender is gone: the rest panicked before reporting
                for url in pending.iter_mut().filter_map(Option::take) {
                    outcome.errors.push(GzkvError::RequestFailed {
                        url,
                        reason: "worker exited without a result".to_string(),
                    });
                }
                break;
            }
        }
    }

    tracing::debug!(
        "Fetched {} responses, {} errors",
        outcome.responses.len(),
        outcome.errors.len()
    );
    outcome
}

/// File a completion under its request, unless it was already accounted for
fn record(outcome: &mut FetchOutcome, pending: &mut [Option<String>], completion: Completion) {
    let Completion { index, result } = completion;
    if pending[index].take().is_none() {
        return;
    }
    match result {
        Ok(response) => outcome.responses.push(response),
        Err(e) => {
            tracing::warn!("{}", e);
            outcome.errors.push(e);
        }
    }
}
