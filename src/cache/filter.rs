//! Response filtering

use super::response::Response;

/// Keep the responses accepted by `keep`, in order
pub fn filter_responses<F>(responses: Vec<Response>, keep: F) -> Vec<Response>
where
    F: Fn(&Response) -> bool,
{
    responses.into_iter().filter(|r| keep(r)).collect()
}

/// Accepts 2xx responses
pub fn status_ok(response: &Response) -> bool {
    response.is_success()
}
