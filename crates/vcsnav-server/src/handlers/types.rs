use std::time::Duration;

use vcsnav_core::VcsSettings;

/// Timeout for the server-to-upstream hop. Generous, but bounded so a stuck
/// provider cannot hold connections indefinitely.
const UPSTREAM_TIMEOUT_SECS: u64 = 100;

/// Shared application state: the immutable provider configuration and the
/// upstream HTTP client. Adapter instances are built per request.
pub struct AppState {
    pub providers: Vec<VcsSettings>,
    pub upstream: reqwest::Client,
}

impl AppState {
    pub fn new(providers: Vec<VcsSettings>) -> Self {
        let upstream = reqwest::Client::builder()
            .user_agent(concat!("vcsnav/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()
            .expect("failed to build upstream HTTP client");

        Self { providers, upstream }
    }
}
