//! Blocking HTTP transport for tile imagery.
//!
//! Clients only perform the request and hand back a [`TileResponse`].
//! Deciding whether that response is a usable tile happens once, in
//! [`HttpClient::get_image`], so every client (and every test double) goes
//! through the same checks.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use super::types::ProviderError;

/// Default request timeout for tile downloads.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `User-Agent` sent with every tile request.
pub const USER_AGENT: &str = concat!("flighteyes/", env!("CARGO_PKG_VERSION"));

/// Raw answer from a tile server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TileResponse {
    /// A 200 response carrying `body` as `image/jpeg`.
    pub fn jpeg(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some("image/jpeg".to_string()),
            body,
        }
    }

    /// Returns the body if it is a non-empty image from a 2xx response.
    ///
    /// A missing content type is accepted; some tile mirrors omit it.
    pub fn into_image(self, url: &str) -> Result<Vec<u8>, ProviderError> {
        if !(200..300).contains(&self.status) {
            return Err(ProviderError::HttpError(format!(
                "HTTP {} from {}",
                self.status, url
            )));
        }

        if let Some(content_type) = &self.content_type {
            if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
                return Err(ProviderError::InvalidResponse(format!(
                    "{} served '{}' instead of an image",
                    url, content_type
                )));
            }
        }

        if self.body.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty body from {}",
                url
            )));
        }

        Ok(self.body)
    }
}

/// Performs tile requests.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request. Transport failures are errors; HTTP error
    /// statuses are returned as responses.
    fn fetch(&self, url: &str) -> Result<TileResponse, ProviderError>;

    /// Fetches `url` and validates the response as a tile image.
    fn get_image(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.fetch(url)?.into_image(url)
    }
}

/// reqwest-backed client with a request timeout and the crate's user agent.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client whose requests give up after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::HttpError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn fetch(&self, url: &str) -> Result<TileResponse, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::HttpError(format!("{} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .map_err(|e| ProviderError::HttpError(format!("reading {} failed: {}", url, e)))?
            .to_vec();

        Ok(TileResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers every request with the same response and logs the URLs.
    pub struct CannedClient {
        answer: Result<TileResponse, ProviderError>,
        urls: Mutex<Vec<String>>,
    }

    impl CannedClient {
        pub fn answering(answer: Result<TileResponse, ProviderError>) -> Self {
            Self {
                answer,
                urls: Mutex::new(Vec::new()),
            }
        }

        pub fn jpeg(body: &[u8]) -> Self {
            Self::answering(Ok(TileResponse::jpeg(body.to_vec())))
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl HttpClient for CannedClient {
        fn fetch(&self, url: &str) -> Result<TileResponse, ProviderError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.answer.clone()
        }
    }

    const URL: &str = "http://tiles.test/a0231.jpeg";

    fn response(status: u16, content_type: Option<&str>, body: &[u8]) -> TileResponse {
        TileResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_jpeg_tile_accepted() {
        let bytes = response(200, Some("image/jpeg"), &[0xFF, 0xD8])
            .into_image(URL)
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8]);
    }

    #[test]
    fn test_missing_content_type_accepted() {
        assert!(response(200, None, b"img").into_image(URL).is_ok());
    }

    #[test]
    fn test_content_type_case_insensitive() {
        assert!(response(200, Some("Image/PNG"), b"img").into_image(URL).is_ok());
    }

    #[test]
    fn test_error_status_names_url() {
        match response(404, Some("text/html"), b"<html>").into_image(URL) {
            Err(ProviderError::HttpError(msg)) => {
                assert!(msg.contains("404"), "{msg}");
                assert!(msg.contains(URL), "{msg}");
            }
            other => panic!("expected HttpError, got {:?}", other),
        }
    }

    #[test]
    fn test_html_body_rejected() {
        let result = response(200, Some("text/html; charset=utf-8"), b"<html>").into_image(URL);
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_body_rejected() {
        let result = response(204, Some("image/jpeg"), b"").into_image(URL);
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_get_image_validates_fetched_response() {
        let client = CannedClient::answering(Ok(response(503, None, b"busy")));
        assert!(matches!(
            client.get_image(URL),
            Err(ProviderError::HttpError(_))
        ));
        assert_eq!(client.urls(), vec![URL.to_string()]);
    }

    #[test]
    fn test_transport_error_passes_through() {
        let client = CannedClient::answering(Err(ProviderError::HttpError("timed out".into())));
        assert_eq!(
            client.get_image(URL),
            Err(ProviderError::HttpError("timed out".into()))
        );
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new(5).is_ok());
    }
}
