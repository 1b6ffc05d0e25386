use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::PushError;

/// POSTs `payload` as a JSON body to `url`.
///
/// The remote's response is returned whatever its status code; deciding
/// whether a non-2xx status is an error belongs to the caller. Pass a
/// [`Client`] to reuse connection pools (and in tests); `None` builds a
/// throwaway one.
pub async fn push_json_to_remote<T: Serialize>(
    url: &str,
    payload: &T,
    client: Option<&Client>,
) -> Result<reqwest::Response, PushError> {
    let own_client;
    let client = match client {
        Some(client) => client,
        None => {
            own_client = Client::new();
            &own_client
        }
    };

    let response = client.post(url).json(payload).send().await?;
    debug!(url, status = %response.status(), "pushed JSON to remote");

    Ok(response)
}
