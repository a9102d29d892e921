use std::time::Duration;

use reqwest::Client;

pub(crate) const DEFAULT_UA: &str = concat!("clipwatch/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the Helix client and the webhook.
///
/// No timeout is applied unless one is given, so a hung request blocks the run.
pub fn create_client(request_timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(DEFAULT_UA);

    if let Some(timeout) = request_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
