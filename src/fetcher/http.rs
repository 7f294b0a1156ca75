use super::{FetchError, FetchResponse, Fetcher, drain};
use async_trait::async_trait;
use reqwest::Client;

/// Plain GET on a shared client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, keep_body: bool) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();

        let (bytes_read, body) = drain(response, keep_body).await?;
        log::trace!("GET {} -> {} ({} bytes)", url, status, bytes_read);

        Ok(FetchResponse {
            status,
            content_length,
            bytes_read,
            body,
        })
    }
}
