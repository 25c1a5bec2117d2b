//! Persisting and reading back cached responses

use std::path::Path;
use std::sync::Arc;

use crate::archive;
use crate::config::DumpOptions;
use crate::error::{GzkvError, Result};
use crate::store::Store;

use super::client::HttpClient;
use super::fetch::fetch_all;
use super::filter::filter_responses;
use super::request::{Fingerprint, Request};
use super::response::{Response, ResponseRecord};

/// Summary of a `dump_responses` run
#[derive(Debug, Default)]
pub struct DumpReport {
    /// Records written to the bucket
    pub stored: usize,
    /// Responses dropped by the filter
    pub rejected: usize,
    /// Per-request failures (timeouts, transport errors)
    pub errors: Vec<GzkvError>,
}

/// Fetch `requests` and cache the responses in `bucket` of the archive at
/// `output_path`.
///
/// The archive is opened non-strictly, so a missing archive is created.
/// Per-request failures end up in the report; any failure to encode or
/// store a record aborts the whole batch and leaves the archive as it was.
pub fn dump_responses(
    requests: Vec<Request>,
    output_path: impl AsRef<Path>,
    bucket: &str,
    client: Arc<dyn HttpClient>,
    options: &DumpOptions,
) -> Result<DumpReport> {
    let output_path = output_path.as_ref();
    let session = archive::open(output_path, &options.store, false)?;

    let outcome = fetch_all(requests, client, &options.fetch);
    let fetched = outcome.responses.len();

    let responses = match &options.filter {
        Some(filter) => filter_responses(outcome.responses, |r| filter(r)),
        None => outcome.responses,
    };
    let rejected = fetched - responses.len();

    let records = encode_records(responses)?;

    session.update(|tx| {
        let mut cache = tx.create_bucket_if_not_exists(bucket)?;
        for (key, value) in &records {
            cache.put(key, value).map_err(|e| {
                GzkvError::Storage(format!(
                    "couldn't save response into bucket '{}': {}",
                    bucket, e
                ))
            })?;
        }
        Ok(())
    })?;

    let header = options.header.as_ref().or(session.header());
    session.write_to_archive(output_path, options.permissions, header)?;
    session.close()?;

    tracing::info!(
        "Cached {} responses in '{}' ({} rejected, {} failed)",
        records.len(),
        bucket,
        rejected,
        outcome.errors.len()
    );

    Ok(DumpReport {
        stored: records.len(),
        rejected,
        errors: outcome.errors,
    })
}

fn encode_records(responses: Vec<Response>) -> Result<Vec<(Fingerprint, Vec<u8>)>> {
    responses
        .into_iter()
        .map(|response| {
            let key = response.request.fingerprint()?;
            let value = ResponseRecord::from_response(response)?.encode()?;
            Ok((key, value))
        })
        .collect()
}

/// Decode every cached response in `bucket`, in key order
pub fn get_responses_from_db(store: &Store, bucket: &str) -> Result<Vec<Response>> {
    store.view(|tx| {
        let cached = tx
            .bucket(bucket)
            .ok_or_else(|| GzkvError::NoSuchPartition(bucket.to_string()))?;

        let mut responses = Vec::with_capacity(cached.len());
        cached.for_each(|_, value| {
            responses.push(ResponseRecord::decode(value)?.into_response());
            Ok(())
        })?;
        Ok(responses)
    })
}

/// Cached response for `request`, if any
pub fn get_response(store: &Store, bucket: &str, request: &Request) -> Result<Option<Response>> {
    let key = request.fingerprint()?;
    store.view(|tx| {
        let cached = tx
            .bucket(bucket)
            .ok_or_else(|| GzkvError::NoSuchPartition(bucket.to_string()))?;

        cached
            .get(key)
            .map(|value| ResponseRecord::decode(value).map(ResponseRecord::into_response))
            .transpose()
    })
}
