//! Construction of the HTTP client used to poll the tick feed.
//!
//! There is deliberately no retry middleware here: a fetch that fails is
//! simply left for the next scheduled check.

use crate::config::BaseHttpClientConfig;

/// Creates a pooled HTTP client from the base configuration.
///
/// The returned client carries a hard per-request deadline
/// (`request_timeout`), so no fetch can outlive its check cycle.
pub fn create_http_client(config: &BaseHttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(config.idle_timeout)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
}
