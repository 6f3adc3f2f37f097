use crate::error::Result;
use reqwest::header::{ACCEPT, LINK};
use std::time::Duration;
use tracing::trace;

const USER_AGENT: &str = concat!("ghpulse/", env!("CARGO_PKG_VERSION"));
const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw outcome of one GET request. Status handling is left to the caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub link: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            link: None,
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn has_next(&self) -> bool {
        self.link.as_deref().is_some_and(super::link::has_next)
    }
}

pub trait Transport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<ApiResponse>;
}

/// Blocking reqwest transport speaking the v3 REST media type.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, token })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<ApiResponse> {
        trace!(url, ?query, "GET");
        let mut request = self.client.get(url).query(query).header(ACCEPT, ACCEPT_V3);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;

        Ok(ApiResponse { status, link, body })
    }
}
