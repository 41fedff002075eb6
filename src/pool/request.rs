use rand::Rng;
use url::Url;

/// Prefixed to the request path to make the target answer with an error.
pub const FAILURE_MARKER: &str = "-artificial-random-failure-";

/// `workerId:sequence`, sent as the query so server logs can be matched up.
#[must_use]
pub fn hit_id(worker_id: usize, sequence: u64) -> String {
    format!("{}:{}", worker_id, sequence)
}

/// Target URL for one request, optionally with the failure marker applied.
#[must_use]
pub fn build_request_url(base: &Url, hit_id: &str, inject_failure: bool) -> Url {
    let mut url = base.clone();
    if inject_failure {
        let path = format!("{}{}", FAILURE_MARKER, base.path());
        url.set_path(&path);
    }
    url.set_query(Some(hit_id));
    url
}

/// `true` with probability `failure_tenths / 10`.
pub fn should_inject_failure<R: Rng + ?Sized>(rng: &mut R, failure_tenths: u8) -> bool {
    failure_tenths > 0 && rng.gen_range(0u8..10) < failure_tenths
}
